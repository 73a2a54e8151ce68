//! Trusted certificate discovery for workspace git access
//!
//! - [`trust_store`] lists certificate files from a local directory
//! - [`cache`] memoizes their contents per provisioner instance
//! - [`git_config`] turns certificate file names into per-host git stanzas

pub mod cache;
pub mod git_config;
pub mod trust_store;

pub use cache::{CertificateCache, Certificates};
pub use git_config::{host_config_stanza, render_host_configs};
pub use trust_store::TrustStore;
