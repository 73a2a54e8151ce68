//! Configuration provisioners
//!
//! A provisioner enriches a [`KubernetesEnvironment`] with one cross-cutting
//! concern before the environment is submitted. Provisioners run in sequence
//! against the same descriptor and must each:
//!
//! - check before insert, by name, instead of assuming they own the
//!   descriptor's pods, config maps, volumes or mounts
//! - be safe to run zero, one or many times against the same descriptor
//! - leave unrelated pods, containers and config maps alone

pub mod vcs_certs;

use std::fmt;

use tracing::{debug, error};

use crate::environment::{KubernetesEnvironment, RuntimeIdentity};
use crate::error::InfrastructureError;

/// An idempotent mutator of a workload descriptor
pub trait ConfigurationProvisioner: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    /// Apply this provisioner's concern to `env` for the given workspace
    fn provision(
        &self,
        env: &mut KubernetesEnvironment,
        identity: &RuntimeIdentity,
    ) -> Result<(), InfrastructureError>;
}

/// Ordered sequence of provisioners applied to one descriptor.
///
/// Stops at the first failure; the caller must then discard the descriptor.
#[derive(Default)]
pub struct ProvisionerChain {
    provisioners: Vec<Box<dyn ConfigurationProvisioner>>,
}

impl ProvisionerChain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provisioner (builder style)
    pub fn with(mut self, provisioner: impl ConfigurationProvisioner + 'static) -> Self {
        self.push(Box::new(provisioner));
        self
    }

    /// Append a boxed provisioner
    pub fn push(&mut self, provisioner: Box<dyn ConfigurationProvisioner>) {
        self.provisioners.push(provisioner);
    }

    /// Number of provisioners
    pub fn len(&self) -> usize {
        self.provisioners.len()
    }

    /// Whether the chain has no provisioners
    pub fn is_empty(&self) -> bool {
        self.provisioners.is_empty()
    }

    /// Provisioner names, in run order
    pub fn names(&self) -> Vec<&str> {
        self.provisioners.iter().map(|p| p.name()).collect()
    }
}

impl fmt::Debug for ProvisionerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisionerChain")
            .field("provisioners", &self.names())
            .finish()
    }
}

impl ConfigurationProvisioner for ProvisionerChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn provision(
        &self,
        env: &mut KubernetesEnvironment,
        identity: &RuntimeIdentity,
    ) -> Result<(), InfrastructureError> {
        for provisioner in &self.provisioners {
            debug!(
                provisioner = provisioner.name(),
                workspace_id = %identity.workspace_id,
                "running provisioner"
            );
            provisioner.provision(env, identity).inspect_err(|e| {
                error!(
                    provisioner = provisioner.name(),
                    workspace_id = %identity.workspace_id,
                    error = %e,
                    "provisioning failed"
                );
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::k8s::{Pod, PodSpec};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Adds a label to every pod, recording how often it ran
    struct LabelProvisioner {
        calls: Arc<AtomicUsize>,
    }

    impl ConfigurationProvisioner for LabelProvisioner {
        fn name(&self) -> &str {
            "label"
        }

        fn provision(
            &self,
            env: &mut KubernetesEnvironment,
            identity: &RuntimeIdentity,
        ) -> Result<(), InfrastructureError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for pod in env.pods_mut().values_mut() {
                pod.metadata
                    .labels
                    .insert("workspace".to_string(), identity.workspace_id.clone());
            }
            Ok(())
        }
    }

    struct FailingProvisioner;

    impl ConfigurationProvisioner for FailingProvisioner {
        fn name(&self) -> &str {
            "failing"
        }

        fn provision(
            &self,
            _env: &mut KubernetesEnvironment,
            _identity: &RuntimeIdentity,
        ) -> Result<(), InfrastructureError> {
            Err(InfrastructureError::provisioner("failing", "boom"))
        }
    }

    fn env_with_pod() -> KubernetesEnvironment {
        let mut env = KubernetesEnvironment::new();
        env.add_pod(Pod::new("dev", PodSpec::default()));
        env
    }

    #[test]
    fn test_empty_chain_is_noop() {
        let mut env = env_with_pod();
        let before = env.clone();
        ProvisionerChain::new()
            .provision(&mut env, &RuntimeIdentity::new("ws"))
            .expect("empty chain should succeed");
        assert_eq!(env, before);
    }

    #[test]
    fn test_runs_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = ProvisionerChain::new()
            .with(LabelProvisioner {
                calls: Arc::clone(&calls),
            })
            .with(LabelProvisioner {
                calls: Arc::clone(&calls),
            });
        assert_eq!(chain.names(), vec!["label", "label"]);

        let mut env = env_with_pod();
        chain
            .provision(&mut env, &RuntimeIdentity::new("ws1"))
            .expect("should succeed");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            env.pods()["dev"].metadata.labels.get("workspace"),
            Some(&"ws1".to_string())
        );
    }

    #[test]
    fn test_stops_at_first_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = ProvisionerChain::new()
            .with(FailingProvisioner)
            .with(LabelProvisioner {
                calls: Arc::clone(&calls),
            });

        let mut env = env_with_pod();
        let err = chain
            .provision(&mut env, &RuntimeIdentity::new("ws"))
            .expect_err("should fail");

        assert!(matches!(err, InfrastructureError::Provisioner { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_debug_lists_names() {
        let chain = ProvisionerChain::new().with(FailingProvisioner);
        assert_eq!(
            format!("{:?}", chain),
            "ProvisionerChain { provisioners: [\"failing\"] }"
        );
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());
    }
}
