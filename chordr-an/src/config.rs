//! Service configuration
//!
//! The data folder is resolved through the shared chordr-common priority
//! chain (CLI > env > TOML > default); the remaining knobs come from the
//! TOML file with compiled defaults.

use std::path::PathBuf;

use chordr_common::config::{load_toml_config, resolve_data_folder};

/// Environment variable overriding the data folder
pub const DATA_FOLDER_ENV: &str = "CHORDR_DATA_FOLDER";

/// Allowed upload extensions, lowercase
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "m4a", "ogg", "aac"];

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Root data folder; uploads/, output/ and the job ledger live here
    pub data_folder: PathBuf,
    /// HTTP bind address
    pub bind_address: String,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
    /// Maximum number of concurrently running analysis jobs
    pub worker_concurrency: usize,
}

impl ServiceConfig {
    /// Resolve configuration from CLI argument, environment and TOML.
    pub fn resolve(cli_data_folder: Option<&str>) -> Self {
        let data_folder = resolve_data_folder(cli_data_folder, DATA_FOLDER_ENV);
        let toml = load_toml_config().unwrap_or_default();

        Self {
            data_folder,
            bind_address: toml
                .bind_address
                .unwrap_or_else(|| "127.0.0.1:5001".to_string()),
            max_upload_bytes: toml.max_upload_mb.unwrap_or(50) * 1024 * 1024,
            worker_concurrency: toml.worker_concurrency.unwrap_or(2),
        }
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_folder.join("uploads")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.data_folder.join("output")
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_folder.join("jobs.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_live_under_data_folder() {
        let config = ServiceConfig {
            data_folder: PathBuf::from("/srv/chordr"),
            bind_address: "127.0.0.1:5001".to_string(),
            max_upload_bytes: 50 * 1024 * 1024,
            worker_concurrency: 2,
        };
        assert_eq!(config.uploads_dir(), PathBuf::from("/srv/chordr/uploads"));
        assert_eq!(config.output_dir(), PathBuf::from("/srv/chordr/output"));
        assert_eq!(config.ledger_path(), PathBuf::from("/srv/chordr/jobs.json"));
    }

    #[test]
    fn cli_data_folder_is_used() {
        let config = ServiceConfig::resolve(Some("/tmp/chordr-an-test"));
        assert_eq!(config.data_folder, PathBuf::from("/tmp/chordr-an-test"));
    }
}
