//! Common types for devenv: object metadata, errors, YAML parsing and logging

#![deny(missing_docs)]

pub mod error;
pub mod kube_utils;
pub mod telemetry;
pub mod yaml;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Label carrying the workspace id on every generated resource
pub const LABEL_WORKSPACE_ID: &str = "che.workspace_id";

/// Standard Kubernetes managed-by label key
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Managed-by value for resources generated by devenv provisioners
pub const LABEL_MANAGED_BY_DEVENV: &str = "devenv";
