//! Centralized configuration constants for the Bobbin catalog.

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "Bobbin Catalog";
}

/// Storage layout under the data root.
pub struct StorageConfig;

impl StorageConfig {
    pub const DB_FILE_NAME: &'static str = "catalog.sqlite";
    pub const UPLOADS_DIR_NAME: &'static str = "uploads";
    /// Reject uploaded images above this size.
    pub const MAX_IMAGE_BYTES: usize = 20_000_000;
}

/// HTTP server defaults.
pub struct ServerConfig;

impl ServerConfig {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const DEFAULT_PORT: u16 = 4000;
}
