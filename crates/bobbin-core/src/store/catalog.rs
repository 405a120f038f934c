//! SQLite catalog store.
//!
//! One table per product category plus a `series` table. Documents are kept
//! as JSON in the row, with the columns the store itself needs (id, parent
//! series, model name) broken out for indexing.

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::category::Category;
use crate::error::{BobbinError, Result};
use crate::models::{ModelDocument, Series, StoredModel, StoredSeries};

/// Thread-safe catalog store over a single SQLite database.
pub struct CatalogStore {
    db_path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl CatalogStore {
    /// Create or open a catalog database at the given path.
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| BobbinError::io_with_path(e, parent))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::configure_connection(&conn)?;
        Self::ensure_schema(&conn)?;

        Ok(Self {
            db_path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA busy_timeout=30000;
            PRAGMA synchronous=NORMAL;
            ",
        )?;
        Ok(())
    }

    fn ensure_schema(conn: &Connection) -> Result<()> {
        for category in Category::ALL {
            let table = category.table_name();
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id TEXT PRIMARY KEY,
                        series_id TEXT NOT NULL,
                        model TEXT NOT NULL,
                        document_json TEXT NOT NULL,
                        created_at TEXT NOT NULL,
                        updated_at TEXT NOT NULL
                    )"
                ),
                [],
            )?;
            conn.execute(
                &format!("CREATE INDEX IF NOT EXISTS idx_{table}_series ON {table}(series_id)"),
                [],
            )?;
        }

        conn.execute(
            "CREATE TABLE IF NOT EXISTS series (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                model_type TEXT NOT NULL,
                models_json TEXT NOT NULL,
                image TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Get the database path.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| BobbinError::Database {
            message: "Failed to acquire connection lock".to_string(),
            source: None,
        })
    }

    // ------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------

    /// Persist a new model document in the category's table.
    pub fn insert_model(&self, category: Category, document: ModelDocument) -> Result<StoredModel> {
        document.validate()?;

        let stored = StoredModel {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now_rfc3339(),
            updated_at: now_rfc3339(),
            document,
        };
        let document_json = serde_json::to_string(&stored.document)?;

        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, series_id, model, document_json, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                category.table_name()
            ),
            params![
                stored.id,
                stored.document.series,
                stored.document.model,
                document_json,
                stored.created_at,
                stored.updated_at,
            ],
        )?;

        debug!("Inserted {} model {}", category, stored.id);
        Ok(stored)
    }

    /// Get a model by id.
    pub fn get_model(&self, category: Category, id: &str) -> Result<Option<StoredModel>> {
        let conn = self.lock()?;
        let result = conn
            .query_row(
                &format!(
                    "SELECT id, document_json, created_at, updated_at FROM {} WHERE id = ?1",
                    category.table_name()
                ),
                params![id],
                Self::row_to_model,
            )
            .optional()?;
        Ok(result)
    }

    /// List all models in a category, oldest first.
    pub fn list_models(&self, category: Category) -> Result<Vec<StoredModel>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, document_json, created_at, updated_at FROM {}
             ORDER BY created_at, id",
            category.table_name()
        ))?;
        let rows = stmt.query_map([], Self::row_to_model)?;

        let mut models = Vec::new();
        for row in rows {
            models.push(row?);
        }
        Ok(models)
    }

    /// Replace a model's document. Errors if the model does not exist.
    pub fn update_model(
        &self,
        category: Category,
        id: &str,
        document: ModelDocument,
    ) -> Result<StoredModel> {
        document.validate()?;
        let updated_at = now_rfc3339();
        let document_json = serde_json::to_string(&document)?;

        let conn = self.lock()?;
        let changed = conn.execute(
            &format!(
                "UPDATE {} SET series_id = ?2, model = ?3, document_json = ?4, updated_at = ?5
                 WHERE id = ?1",
                category.table_name()
            ),
            params![id, document.series, document.model, document_json, updated_at],
        )?;
        if changed == 0 {
            return Err(BobbinError::ModelNotFound {
                model_id: id.to_string(),
            });
        }
        drop(conn);

        // Re-read for the authoritative created_at.
        self.get_model(category, id)?.ok_or(BobbinError::ModelNotFound {
            model_id: id.to_string(),
        })
    }

    /// Delete a model. Returns whether a row was removed.
    pub fn delete_model(&self, category: Category, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", category.table_name()),
            params![id],
        )?;
        if deleted > 0 {
            debug!("Deleted {} model {}", category, id);
        }
        Ok(deleted > 0)
    }

    /// Existence probe used by the reconciliation sweep.
    pub fn model_exists(&self, category: Category, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let exists: Option<bool> = conn
            .query_row(
                &format!(
                    "SELECT 1 FROM {} WHERE id = ?1 LIMIT 1",
                    category.table_name()
                ),
                params![id],
                |_| Ok(true),
            )
            .optional()?;
        Ok(exists.unwrap_or(false))
    }

    /// All (model id, parent series id) pairs in a category.
    pub fn model_refs(&self, category: Category) -> Result<Vec<(String, String)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, series_id FROM {} ORDER BY created_at, id",
            category.table_name()
        ))?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut refs = Vec::new();
        for row in rows {
            refs.push(row?);
        }
        Ok(refs)
    }

    fn row_to_model(row: &Row) -> rusqlite::Result<StoredModel> {
        let document_json: String = row.get(1)?;
        let document: ModelDocument = serde_json::from_str(&document_json).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(StoredModel {
            id: row.get(0)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
            document,
        })
    }

    // ------------------------------------------------------------------
    // Series
    // ------------------------------------------------------------------

    /// Persist a new series.
    pub fn insert_series(&self, series: Series) -> Result<StoredSeries> {
        series.validate()?;

        let stored = StoredSeries {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now_rfc3339(),
            updated_at: now_rfc3339(),
            series,
        };
        let models_json = serde_json::to_string(&stored.series.models)?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO series (id, name, model_type, models_json, image, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                stored.id,
                stored.series.name,
                stored.series.model_type.as_str(),
                models_json,
                stored.series.image,
                stored.created_at,
                stored.updated_at,
            ],
        )?;

        debug!("Inserted series {} ({})", stored.id, stored.series.name);
        Ok(stored)
    }

    /// Get a series by id.
    pub fn get_series(&self, id: &str) -> Result<Option<StoredSeries>> {
        let conn = self.lock()?;
        let result = conn
            .query_row(
                "SELECT id, name, model_type, models_json, image, created_at, updated_at
                 FROM series WHERE id = ?1",
                params![id],
                Self::row_to_series,
            )
            .optional()?;
        Ok(result)
    }

    /// List all series, oldest first.
    pub fn list_series(&self) -> Result<Vec<StoredSeries>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, model_type, models_json, image, created_at, updated_at
             FROM series ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map([], Self::row_to_series)?;

        let mut all = Vec::new();
        for row in rows {
            all.push(row?);
        }
        Ok(all)
    }

    /// Replace a series document. Errors if the series does not exist.
    pub fn update_series(&self, id: &str, series: Series) -> Result<StoredSeries> {
        series.validate()?;
        let updated_at = now_rfc3339();
        let models_json = serde_json::to_string(&series.models)?;

        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE series SET name = ?2, model_type = ?3, models_json = ?4, image = ?5,
                 updated_at = ?6
             WHERE id = ?1",
            params![
                id,
                series.name,
                series.model_type.as_str(),
                models_json,
                series.image,
                updated_at
            ],
        )?;
        if changed == 0 {
            return Err(BobbinError::SeriesNotFound {
                series_id: id.to_string(),
            });
        }
        drop(conn);

        self.get_series(id)?.ok_or(BobbinError::SeriesNotFound {
            series_id: id.to_string(),
        })
    }

    /// Rewrite only a series' model reference list.
    pub fn save_series_models(&self, id: &str, models: &[String]) -> Result<()> {
        let models_json = serde_json::to_string(models)?;
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE series SET models_json = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, models_json, now_rfc3339()],
        )?;
        if changed == 0 {
            return Err(BobbinError::SeriesNotFound {
                series_id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Delete a series. Its models are left in place; only the reference
    /// list disappears with the row.
    pub fn delete_series(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM series WHERE id = ?1", params![id])?;
        if deleted > 0 {
            debug!("Deleted series {}", id);
        }
        Ok(deleted > 0)
    }

    /// Raw (series id, model_type string, model id list) rows.
    ///
    /// The reconciliation sweep reads the discriminator unparsed so it can
    /// warn and skip rows whose category the registry does not know, instead
    /// of failing the whole sweep.
    pub fn series_refs(&self) -> Result<Vec<(String, String, Vec<String>)>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, model_type, models_json FROM series ORDER BY created_at, id")?;
        let rows = stmt.query_map([], |row| {
            let models_json: String = row.get(2)?;
            let models: Vec<String> = serde_json::from_str(&models_json).unwrap_or_default();
            Ok((row.get(0)?, row.get(1)?, models))
        })?;

        let mut refs = Vec::new();
        for row in rows {
            refs.push(row?);
        }
        Ok(refs)
    }

    fn row_to_series(row: &Row) -> rusqlite::Result<StoredSeries> {
        let model_type_str: String = row.get(2)?;
        let model_type = Category::from_wire(&model_type_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;
        let models_json: String = row.get(3)?;
        let models: Vec<String> = serde_json::from_str(&models_json).unwrap_or_default();

        Ok(StoredSeries {
            id: row.get(0)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            series: Series {
                name: row.get(1)?,
                model_type,
                models,
                image: row.get(4)?,
            },
        })
    }
}
