//! High-level catalog API.
//!
//! `CatalogApi` is the entry point the HTTP layer (or any embedder) talks
//! to. It owns the store and the upload directory and runs the
//! reconciliation sweeps at the same points the legacy controllers did:
//! attach + prune after creates and deletes, attach after updates.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::category::Category;
use crate::config::StorageConfig;
use crate::error::{BobbinError, Result};
use crate::models::{ModelDocument, Series, StoredModel, StoredSeries};
use crate::store::{reconcile, CatalogStore, ReconcileReport};
use crate::uploads::UploadStore;

/// Main API for catalog operations.
pub struct CatalogApi {
    data_root: PathBuf,
    store: CatalogStore,
    uploads: UploadStore,
}

impl CatalogApi {
    /// Open (or create) a catalog rooted at `data_root`.
    pub fn new(data_root: impl AsRef<Path>) -> Result<Self> {
        let data_root = data_root.as_ref().to_path_buf();
        let store = CatalogStore::new(data_root.join(StorageConfig::DB_FILE_NAME))?;
        let uploads = UploadStore::new(&data_root)?;

        info!("Catalog opened at {}", data_root.display());
        Ok(Self {
            data_root,
            store,
            uploads,
        })
    }

    /// Root directory for catalog data.
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    // ------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------

    /// Create a model, then run both sweeps so the new id lands in its
    /// series and any dangling references are cleared.
    pub async fn create_model(
        &self,
        category: Category,
        document: ModelDocument,
    ) -> Result<StoredModel> {
        let stored = self.store.insert_model(category, document)?;
        reconcile::attach_new_models(&self.store)?;
        reconcile::prune_dangling(&self.store)?;
        Ok(stored)
    }

    /// List all models in a category.
    pub async fn list_models(&self, category: Category) -> Result<Vec<StoredModel>> {
        self.store.list_models(category)
    }

    /// Get one model.
    pub async fn get_model(&self, category: Category, id: &str) -> Result<Option<StoredModel>> {
        self.store.get_model(category, id)
    }

    /// Apply a partial update to a model, then run the attach sweep (a
    /// changed `series` field may need linking).
    pub async fn update_model(
        &self,
        category: Category,
        id: &str,
        patch: &Map<String, Value>,
    ) -> Result<StoredModel> {
        let stored = self
            .store
            .get_model(category, id)?
            .ok_or_else(|| BobbinError::ModelNotFound {
                model_id: id.to_string(),
            })?;
        let merged = stored.document.merged(patch)?;
        let updated = self.store.update_model(category, id, merged)?;
        reconcile::attach_new_models(&self.store)?;
        Ok(updated)
    }

    /// Store an uploaded image and point the model's `image` field at it.
    pub async fn set_model_image(
        &self,
        category: Category,
        id: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredModel> {
        let rel_path = self.uploads.save("image", original_name, bytes)?;
        let mut patch = Map::new();
        patch.insert("image".to_string(), Value::String(rel_path));
        self.update_model(category, id, &patch).await
    }

    /// Delete a model, then run both sweeps so series lists drop the id.
    pub async fn delete_model(&self, category: Category, id: &str) -> Result<()> {
        if !self.store.delete_model(category, id)? {
            return Err(BobbinError::ModelNotFound {
                model_id: id.to_string(),
            });
        }
        reconcile::attach_new_models(&self.store)?;
        reconcile::prune_dangling(&self.store)?;
        Ok(())
    }

    /// Store an uploaded file without touching any document. Used by the
    /// create path, where the image arrives before the model exists.
    pub fn save_upload(&self, field: &str, original_name: &str, bytes: &[u8]) -> Result<String> {
        self.uploads.save(field, original_name, bytes)
    }

    // ------------------------------------------------------------------
    // Series
    // ------------------------------------------------------------------

    /// Create a series. The sweep immediately validates any model ids the
    /// client supplied in `models`.
    pub async fn create_series(&self, series: Series) -> Result<StoredSeries> {
        let stored = self.store.insert_series(series)?;
        self.reconcile().await?;
        self.store
            .get_series(&stored.id)?
            .ok_or(BobbinError::SeriesNotFound { series_id: stored.id })
    }

    /// List all series.
    pub async fn list_series(&self) -> Result<Vec<StoredSeries>> {
        self.store.list_series()
    }

    /// Get one series.
    pub async fn get_series(&self, id: &str) -> Result<Option<StoredSeries>> {
        self.store.get_series(id)
    }

    /// Apply a partial update to a series, then reconcile.
    pub async fn update_series(
        &self,
        id: &str,
        patch: &Map<String, Value>,
    ) -> Result<StoredSeries> {
        let stored = self
            .store
            .get_series(id)?
            .ok_or_else(|| BobbinError::SeriesNotFound {
                series_id: id.to_string(),
            })?;

        let mut value = serde_json::to_value(&stored.series)?;
        let object = value
            .as_object_mut()
            .ok_or_else(|| BobbinError::Other("series did not serialize to an object".into()))?;
        for (key, patch_value) in patch {
            object.insert(key.clone(), patch_value.clone());
        }
        let merged: Series = serde_json::from_value(value)?;
        merged.validate()?;

        self.store.update_series(id, merged)?;
        self.reconcile().await?;
        self.store
            .get_series(id)?
            .ok_or_else(|| BobbinError::SeriesNotFound {
                series_id: id.to_string(),
            })
    }

    /// Delete a series. Its models are kept; they simply become unlinked.
    pub async fn delete_series(&self, id: &str) -> Result<()> {
        if !self.store.delete_series(id)? {
            return Err(BobbinError::SeriesNotFound {
                series_id: id.to_string(),
            });
        }
        self.reconcile().await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Run the full attach + prune sweep on demand.
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        reconcile::reconcile(&self.store)
    }
}
