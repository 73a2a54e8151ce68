//! CLI commands

use std::path::PathBuf;

use clap::Args;
use devenv_workload::config::CERTS_PATH_ENV;
use devenv_workload::VcsCertificateConfig;

pub mod git_config;
pub mod provision;

/// Trust-store location shared by commands that read certificates
#[derive(Args, Debug, Clone, Default)]
pub struct CertsArgs {
    /// Directory of trusted git host certificates (one file per host)
    #[arg(long, env = CERTS_PATH_ENV)]
    pub certs_path: Option<PathBuf>,
}

impl CertsArgs {
    /// Provisioner configuration for these arguments
    pub fn to_config(&self) -> VcsCertificateConfig {
        VcsCertificateConfig {
            certs_path: self.certs_path.clone(),
        }
    }
}
