//! Self-signed VCS certificate provisioning
//!
//! Mounts the certificates of trusted git hosts into every container of a
//! workspace. The certificates are published in one ConfigMap per workspace,
//! which every pod mounts as a volume at [`CERT_MOUNT_PATH`], read-only, in
//! all init and regular containers.

use std::path::Path;

use devenv_common::kube_utils::{validate_dns_subdomain, ObjectMeta};
use tracing::{debug, info};

use super::ConfigurationProvisioner;
use crate::certs::{render_host_configs, CertificateCache, TrustStore};
use crate::config::VcsCertificateConfig;
use crate::environment::{KubernetesEnvironment, RuntimeIdentity};
use crate::error::InfrastructureError;
use crate::k8s::{ConfigMap, Container, Volume, VolumeMount};

/// Suffix appended to the workspace id to name the certificate ConfigMap
pub const CHE_GIT_SELF_SIGNED_CERT_CONFIG_MAP_SUFFIX: &str = "-che-git-self-signed-cert";

/// Name of the certificate volume and of its mounts
pub const CHE_GIT_SELF_SIGNED_VOLUME: &str = "che-git-self-signed-cert";

/// Directory certificates are mounted at in every container
pub const CERT_MOUNT_PATH: &str = "/etc/che/git/cert/";

/// Mounts configured self-signed git host certificates into workspace containers.
///
/// A no-op unless a trust-store path is configured and holds at least one
/// readable certificate. Certificates are cached once a load finds any.
#[derive(Debug)]
pub struct VcsSslCertificateProvisioner {
    cache: CertificateCache,
}

impl VcsSslCertificateProvisioner {
    /// Create a provisioner from configuration
    pub fn new(config: &VcsCertificateConfig) -> Self {
        let trust_store = TrustStore::new(config.certs_path().map(Path::to_path_buf));
        Self {
            cache: CertificateCache::new(trust_store),
        }
    }

    /// Whether a trust-store path is configured
    pub fn is_configured(&self) -> bool {
        self.cache.is_configured()
    }

    /// Name of the certificate ConfigMap for a workspace
    pub fn config_map_name(workspace_id: &str) -> String {
        format!("{}{}", workspace_id, CHE_GIT_SELF_SIGNED_CERT_CONFIG_MAP_SUFFIX)
    }

    /// Git config stanzas for every mounted certificate.
    ///
    /// Stanzas follow trust-store traversal order and cover only files that
    /// made it into the certificate cache, so git is never pointed at a path
    /// that isn't mounted. Empty when the provisioner is unconfigured or the
    /// trust store holds no readable certificates.
    pub fn host_configs(&self) -> String {
        let certs = self.cache.load();
        let files = self.cache.trust_store().read_files();
        let hosts = files
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .filter(|name| certs.contains_key(*name));
        render_host_configs(hosts, CERT_MOUNT_PATH)
    }
}

impl ConfigurationProvisioner for VcsSslCertificateProvisioner {
    fn name(&self) -> &str {
        "vcs-ssl-certificate"
    }

    fn provision(
        &self,
        env: &mut KubernetesEnvironment,
        identity: &RuntimeIdentity,
    ) -> Result<(), InfrastructureError> {
        if !self.is_configured() {
            return Ok(());
        }

        let certs = self.cache.load();
        if certs.is_empty() {
            debug!(
                workspace_id = %identity.workspace_id,
                "no VCS certificates found, skipping"
            );
            return Ok(());
        }

        let cm_name = Self::config_map_name(&identity.workspace_id);
        validate_dns_subdomain(&cm_name).map_err(|reason| {
            InfrastructureError::InvalidResourceName {
                name: cm_name.clone(),
                reason,
            }
        })?;

        // Nothing is mutated until every pod is known to accept the mount
        check_mount_path_conflicts(env)?;

        let mut metadata = ObjectMeta::for_workspace(&cm_name, &identity.workspace_id);
        if let Some(namespace) = &identity.infrastructure_namespace {
            metadata = metadata.with_namespace(namespace);
        }
        env.add_config_map(ConfigMap::new(metadata).with_data((*certs).clone()));

        let mut volumes_added = 0;
        let mut mounts_added = 0;
        for pod in env.pods_mut().values_mut() {
            if pod.spec.volume(CHE_GIT_SELF_SIGNED_VOLUME).is_none() {
                pod.spec
                    .volumes
                    .push(Volume::from_config_map(CHE_GIT_SELF_SIGNED_VOLUME, &cm_name));
                volumes_added += 1;
            }

            for container in pod.spec.all_containers_mut() {
                if container.volume_mount(CHE_GIT_SELF_SIGNED_VOLUME).is_none() {
                    container.volume_mounts.push(VolumeMount::readonly(
                        CHE_GIT_SELF_SIGNED_VOLUME,
                        CERT_MOUNT_PATH,
                    ));
                    mounts_added += 1;
                }
            }
        }

        info!(
            workspace_id = %identity.workspace_id,
            config_map = %cm_name,
            certificates = certs.len(),
            volumes_added,
            mounts_added,
            "provisioned VCS certificates"
        );
        Ok(())
    }
}

/// Fail if any container mounts a different volume at the certificate path
fn check_mount_path_conflicts(env: &KubernetesEnvironment) -> Result<(), InfrastructureError> {
    for (pod_name, pod) in env.pods() {
        for container in pod.spec.all_containers() {
            if let Some(existing) = conflicting_mount(container) {
                return Err(InfrastructureError::MountPathConflict {
                    pod: pod_name.clone(),
                    container: container.name.clone(),
                    volume: existing.name.clone(),
                    mount_path: existing.mount_path.clone(),
                });
            }
        }
    }
    Ok(())
}

fn conflicting_mount(container: &Container) -> Option<&VolumeMount> {
    if container.volume_mount(CHE_GIT_SELF_SIGNED_VOLUME).is_some() {
        return None;
    }
    container
        .volume_mounts
        .iter()
        .find(|m| m.mount_path.trim_end_matches('/') == CERT_MOUNT_PATH.trim_end_matches('/'))
}
