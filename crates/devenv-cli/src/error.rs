//! Error types for the CLI

use std::path::PathBuf;

/// CLI Result type
pub type Result<T> = std::result::Result<T, Error>;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid descriptor {path}: {source}")]
    Descriptor {
        path: PathBuf,
        source: devenv_common::Error,
    },

    #[error("provisioning failed: {0}")]
    Provisioning(#[from] devenv_workload::InfrastructureError),

    #[error("{0}")]
    Telemetry(#[from] devenv_common::telemetry::TelemetryError),
}
