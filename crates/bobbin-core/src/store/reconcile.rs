//! Series/model reference reconciliation.
//!
//! A series lists its models by id; models point back at their series. Both
//! sides are written independently by the CRUD handlers, so after a create,
//! update or delete the two can disagree. Two sweeps restore consistency:
//!
//! - attach: any stored model whose parent series exists and is of the same
//!   category gets added to that series' list if missing;
//! - prune: every series' list is re-validated against the category table
//!   its `modelType` selects, dropping ids that no longer exist.
//!
//! The sweeps only edit reference lists. They never delete model or series
//! rows.

use serde::Serialize;
use tracing::{debug, warn};

use crate::category::Category;
use crate::error::Result;
use crate::store::CatalogStore;

/// Outcome of a reconciliation run.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Series examined by the prune sweep.
    pub series_scanned: usize,
    /// Model ids newly added to a series list.
    pub models_attached: usize,
    /// Dangling ids removed from series lists.
    pub refs_pruned: usize,
    /// Series skipped because their category is unknown.
    pub series_skipped: usize,
}

/// Run the attach sweep: link every stored model into its parent series.
pub fn attach_new_models(store: &CatalogStore) -> Result<usize> {
    let mut attached = 0;

    for category in Category::ALL {
        for (model_id, series_id) in store.model_refs(category)? {
            let Some(stored) = store.get_series(&series_id)? else {
                // Parent is gone; nothing to attach to. The model row stays.
                continue;
            };
            if stored.series.model_type != category {
                warn!(
                    "Model {} is a {} but series {} expects {}; not attaching",
                    model_id, category, series_id, stored.series.model_type
                );
                continue;
            }
            if !stored.series.models.iter().any(|m| m == &model_id) {
                let mut models = stored.series.models.clone();
                models.push(model_id.clone());
                store.save_series_models(&series_id, &models)?;
                attached += 1;
                debug!("Attached model {} to series {}", model_id, series_id);
            }
        }
    }

    Ok(attached)
}

/// Run the prune sweep: drop series references to models that no longer
/// exist in the category table the series' `modelType` selects.
pub fn prune_dangling(store: &CatalogStore) -> Result<ReconcileReport> {
    let mut report = ReconcileReport::default();

    for (series_id, model_type, models) in store.series_refs()? {
        report.series_scanned += 1;

        let category = match Category::from_wire(&model_type) {
            Ok(category) => category,
            Err(_) => {
                warn!(
                    "Series {} has unknown model type {:?}; skipping",
                    series_id, model_type
                );
                report.series_skipped += 1;
                continue;
            }
        };

        let mut valid = Vec::with_capacity(models.len());
        for model_id in &models {
            if store.model_exists(category, model_id)? {
                valid.push(model_id.clone());
            }
        }

        if valid.len() != models.len() {
            report.refs_pruned += models.len() - valid.len();
            store.save_series_models(&series_id, &valid)?;
            debug!(
                "Pruned {} dangling reference(s) from series {}",
                models.len() - valid.len(),
                series_id
            );
        }
    }

    Ok(report)
}

/// Run both sweeps, attach first so freshly created models survive the
/// prune, and return the combined report.
pub fn reconcile(store: &CatalogStore) -> Result<ReconcileReport> {
    let attached = attach_new_models(store)?;
    let mut report = prune_dangling(store)?;
    report.models_attached = attached;
    debug!(
        "Reconcile: {} series, {} attached, {} pruned, {} skipped",
        report.series_scanned, report.models_attached, report.refs_pruned, report.series_skipped
    );
    Ok(report)
}
