//! Provisioning error types

/// Errors raised while provisioning a workload descriptor.
///
/// Any of these aborts the current provisioning run; the descriptor must not
/// be submitted to the cluster.
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    #[error("invalid resource name '{name}': {reason}")]
    InvalidResourceName { name: String, reason: String },

    #[error(
        "container '{container}' in pod '{pod}' already mounts volume '{volume}' at '{mount_path}'"
    )]
    MountPathConflict {
        pod: String,
        container: String,
        volume: String,
        mount_path: String,
    },

    #[error("provisioner '{provisioner}' failed: {message}")]
    Provisioner {
        provisioner: String,
        message: String,
    },
}

impl InfrastructureError {
    /// Create a generic failure attributed to a named provisioner
    pub fn provisioner(provisioner: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provisioner {
            provisioner: provisioner.into(),
            message: message.into(),
        }
    }
}
