//! Provisioner configuration

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable holding the trust-store directory
pub const CERTS_PATH_ENV: &str = "CHE_GIT_CERTS_PATH";

/// Configuration for VCS certificate provisioning.
///
/// The feature is disabled unless `certs_path` is set to a non-empty path.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VcsCertificateConfig {
    /// Directory holding one certificate file per trusted git host
    #[serde(default)]
    pub certs_path: Option<PathBuf>,
}

impl VcsCertificateConfig {
    /// Configuration with a trust-store directory
    pub fn with_certs_path(path: impl Into<PathBuf>) -> Self {
        Self {
            certs_path: Some(path.into()),
        }
    }

    /// The configured trust-store directory, if set and non-empty
    pub fn certs_path(&self) -> Option<&Path> {
        self.certs_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}
