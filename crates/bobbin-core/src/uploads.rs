//! Image upload storage.
//!
//! Uploaded product images land in an `uploads/` directory under the data
//! root, named `<field>-<millis><ext>` the way the legacy backend stored
//! them, and documents record the relative path.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::StorageConfig;
use crate::error::{BobbinError, Result};

/// Stores uploaded image files on disk.
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    /// Create an upload store rooted at `data_root`, creating the uploads
    /// directory if needed.
    pub fn new(data_root: impl AsRef<Path>) -> Result<Self> {
        let dir = data_root.as_ref().join(StorageConfig::UPLOADS_DIR_NAME);
        std::fs::create_dir_all(&dir).map_err(|e| BobbinError::io_with_path(e, &dir))?;
        Ok(Self { dir })
    }

    /// Directory uploads are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save an uploaded file and return the relative path to record in the
    /// document (`uploads/<field>-<millis><ext>`).
    pub fn save(&self, field: &str, original_name: &str, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(BobbinError::Validation {
                field: field.to_string(),
                message: "uploaded file is empty".into(),
            });
        }
        if bytes.len() > StorageConfig::MAX_IMAGE_BYTES {
            return Err(BobbinError::Validation {
                field: field.to_string(),
                message: format!(
                    "uploaded file exceeds {} bytes",
                    StorageConfig::MAX_IMAGE_BYTES
                ),
            });
        }

        let ext = Path::new(original_name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        // Millisecond timestamps collide under load; bump until free.
        let mut millis = chrono::Utc::now().timestamp_millis();
        let path = loop {
            let candidate = self.dir.join(format!("{field}-{millis}{ext}"));
            if !candidate.exists() {
                break candidate;
            }
            millis += 1;
        };

        std::fs::write(&path, bytes).map_err(|e| BobbinError::io_with_path(e, &path))?;
        debug!("Saved upload {} ({} bytes)", path.display(), bytes.len());

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(format!("{}/{}", StorageConfig::UPLOADS_DIR_NAME, file_name))
    }
}
