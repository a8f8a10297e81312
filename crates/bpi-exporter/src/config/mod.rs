//! Exporter config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind as IoErrorKind;

use bpi_core::error::{ExporterError, Result};

pub use schema::{ExporterConfig, ListenSection, MetricSection, SchedulerSection, UpstreamSection};

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "bpi-exporter.yaml";

/// Environment variable overriding the config path.
pub const CONFIG_PATH_ENV: &str = "BPI_EXPORTER_CONFIG";

pub fn load_from_file(path: &str) -> Result<ExporterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ExporterError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ExporterConfig> {
    let cfg: ExporterConfig = serde_yaml::from_str(s)
        .map_err(|e| ExporterError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve and load the config.
///
/// An explicit path (CLI argument or `BPI_EXPORTER_CONFIG`) must exist. The
/// default path falls back to built-in defaults when absent.
pub fn load(explicit: Option<String>) -> Result<ExporterConfig> {
    let explicit = explicit.or_else(|| std::env::var(CONFIG_PATH_ENV).ok());
    if let Some(path) = explicit {
        return load_from_file(&path);
    }

    match fs::read_to_string(DEFAULT_CONFIG_PATH) {
        Ok(s) => load_from_str(&s),
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            tracing::info!(path = DEFAULT_CONFIG_PATH, "config file not found, using defaults");
            let cfg = ExporterConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
        Err(e) => Err(ExporterError::Config(format!(
            "read config {DEFAULT_CONFIG_PATH} failed: {e}"
        ))),
    }
}
