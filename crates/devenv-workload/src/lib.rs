//! Workspace workload descriptor and configuration provisioners
//!
//! A [`KubernetesEnvironment`] is the in-memory, pre-submission description of
//! a workspace's pods and config maps. [`ConfigurationProvisioner`]s each
//! enrich it with one cross-cutting concern before it is applied to a cluster.
//!
//! # Usage
//!
//! ```rust,ignore
//! let chain = ProvisionerChain::new()
//!     .with(VcsSslCertificateProvisioner::new(&config));
//! chain.provision(&mut env, &RuntimeIdentity::new("workspace123"))?;
//! ```

pub mod certs;
pub mod config;
pub mod environment;
pub mod error;
pub mod k8s;
pub mod provision;

pub use config::VcsCertificateConfig;
pub use environment::{KubernetesEnvironment, Manifest, RuntimeIdentity};
pub use error::InfrastructureError;
pub use provision::vcs_certs::VcsSslCertificateProvisioner;
pub use provision::{ConfigurationProvisioner, ProvisionerChain};
