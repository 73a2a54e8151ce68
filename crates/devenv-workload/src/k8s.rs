//! Kubernetes resource types for workspace descriptors
//!
//! Only the fields provisioners read or write are typed. Everything else a
//! recipe carries (resources, probes, ports, other volume sources) is kept in
//! the flattened `extra` maps so a descriptor round-trips without losing data.

use std::collections::BTreeMap;

use devenv_common::kube_utils::ObjectMeta;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields not modelled by a typed struct, preserved verbatim
pub type ExtraFields = BTreeMap<String, Value>;

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_pod_kind() -> String {
    Pod::KIND.to_string()
}

fn default_config_map_kind() -> String {
    ConfigMap::KIND.to_string()
}

// =============================================================================
// ConfigMap
// =============================================================================

/// Kubernetes ConfigMap
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMap {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "default_config_map_kind")]
    pub kind: String,
    /// Metadata
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// String data
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    /// Unmodelled fields (binaryData, immutable)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl ConfigMap {
    /// Resource kind
    pub const KIND: &'static str = "ConfigMap";

    /// Create an empty ConfigMap with the given metadata
    pub fn new(metadata: ObjectMeta) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_config_map_kind(),
            metadata,
            data: BTreeMap::new(),
            extra: ExtraFields::new(),
        }
    }

    /// Replace the data payload
    pub fn with_data(mut self, data: BTreeMap<String, String>) -> Self {
        self.data = data;
        self
    }
}

// =============================================================================
// Pod
// =============================================================================

/// Kubernetes Pod
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Kind
    #[serde(default = "default_pod_kind")]
    pub kind: String,
    /// Metadata
    #[serde(default)]
    pub metadata: ObjectMeta,
    /// Pod spec
    #[serde(default)]
    pub spec: PodSpec,
    /// Unmodelled fields (status)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Pod {
    /// Resource kind
    pub const KIND: &'static str = "Pod";

    /// Create a pod with the given name and spec
    pub fn new(name: impl Into<String>, spec: PodSpec) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_pod_kind(),
            metadata: ObjectMeta::named(name),
            spec,
            extra: ExtraFields::new(),
        }
    }
}

/// Pod spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// Init containers (run before main containers)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub init_containers: Vec<Container>,
    /// Containers
    #[serde(default)]
    pub containers: Vec<Container>,
    /// Volumes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Unmodelled fields (securityContext, affinity, tolerations, ...)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl PodSpec {
    /// Look up a volume by name
    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.name == name)
    }

    /// Iterate init containers followed by regular containers
    pub fn all_containers(&self) -> impl Iterator<Item = &Container> {
        self.init_containers.iter().chain(self.containers.iter())
    }

    /// Mutable variant of [`PodSpec::all_containers`]
    pub fn all_containers_mut(&mut self) -> impl Iterator<Item = &mut Container> {
        self.init_containers
            .iter_mut()
            .chain(self.containers.iter_mut())
    }
}

// =============================================================================
// Container
// =============================================================================

/// Container spec
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name
    #[serde(default)]
    pub name: String,
    /// Image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Volume mounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    /// Unmodelled fields (command, env, resources, probes, ...)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Container {
    /// Create a container with a name and image
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: Some(image.into()),
            ..Default::default()
        }
    }

    /// Look up a mount by volume name
    pub fn volume_mount(&self, name: &str) -> Option<&VolumeMount> {
        self.volume_mounts.iter().find(|m| m.name == name)
    }
}

// =============================================================================
// Volumes
// =============================================================================

/// Pod volume
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Volume name
    pub name: String,
    /// ConfigMap source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ConfigMapVolumeSource>,
    /// Other volume sources (secret, emptyDir, persistentVolumeClaim, ...)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl Volume {
    /// Create a Volume backed by a ConfigMap.
    pub fn from_config_map(name: impl Into<String>, cm_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_map: Some(ConfigMapVolumeSource {
                name: cm_name.into(),
                extra: ExtraFields::new(),
            }),
            extra: ExtraFields::new(),
        }
    }
}

/// ConfigMap volume source
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapVolumeSource {
    /// ConfigMap name
    pub name: String,
    /// Unmodelled fields (items, defaultMode, optional)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

/// Volume mount
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Volume name
    pub name: String,
    /// Mount path
    pub mount_path: String,
    /// Sub path within the volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
    /// Read only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    /// Unmodelled fields (mountPropagation, subPathExpr, ...)
    #[serde(flatten)]
    pub extra: ExtraFields,
}

impl VolumeMount {
    /// Create a read-only mount of a whole volume
    pub fn readonly(name: impl Into<String>, mount_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mount_path: mount_path.into(),
            sub_path: None,
            read_only: Some(true),
            extra: ExtraFields::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pod_preserves_unmodelled_fields() {
        let manifest = json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": "dev",
                "generateName": "dev-",
                "uid": "3f1c",
                "ownerReferences": [{ "kind": "DevWorkspace", "name": "ws", "uid": "a1" }]
            },
            "spec": {
                "restartPolicy": "Never",
                "containers": [{
                    "name": "tooling",
                    "image": "quay.io/devenv/tooling:latest",
                    "env": [{ "name": "HOME", "value": "/home/user" }],
                    "volumeMounts": [{
                        "name": "projects",
                        "mountPath": "/projects",
                        "mountPropagation": "HostToContainer",
                        "subPathExpr": "$(POD_NAME)"
                    }]
                }],
                "volumes": [{ "name": "projects", "emptyDir": {} }]
            },
            "status": { "phase": "Pending" }
        });

        let pod: Pod = serde_json::from_value(manifest.clone()).expect("should deserialize");
        assert_eq!(pod.spec.containers[0].volume_mounts[0].mount_path, "/projects");
        assert!(pod.spec.containers[0].extra.contains_key("env"));
        assert!(pod.spec.volumes[0].extra.contains_key("emptyDir"));
        assert_eq!(pod.spec.extra.get("restartPolicy"), Some(&json!("Never")));
        assert!(pod.spec.containers[0].volume_mounts[0]
            .extra
            .contains_key("mountPropagation"));
        assert!(pod.metadata.extra.contains_key("ownerReferences"));
        assert!(pod.extra.contains_key("status"));

        let back = serde_json::to_value(&pod).expect("should serialize");
        assert_eq!(back, manifest);
    }

    #[test]
    fn test_defaults_for_minimal_pod() {
        let pod: Pod = serde_json::from_value(json!({ "metadata": { "name": "bare" } }))
            .expect("should deserialize");
        assert_eq!(pod.api_version, "v1");
        assert_eq!(pod.kind, "Pod");
        assert!(pod.spec.containers.is_empty());
        assert!(pod.spec.volumes.is_empty());
    }

    #[test]
    fn test_config_map_volume_serialization() {
        let volume = Volume::from_config_map("certs", "ws-certs");
        assert_eq!(
            serde_json::to_value(&volume).expect("should serialize"),
            json!({ "name": "certs", "configMap": { "name": "ws-certs" } })
        );
    }

    #[test]
    fn test_readonly_mount_serialization() {
        let mount = VolumeMount::readonly("certs", "/etc/certs/");
        assert_eq!(
            serde_json::to_value(&mount).expect("should serialize"),
            json!({ "name": "certs", "mountPath": "/etc/certs/", "readOnly": true })
        );
    }

    #[test]
    fn test_all_containers_visits_init_first() {
        let spec = PodSpec {
            init_containers: vec![Container::new("init", "busybox")],
            containers: vec![Container::new("a", "img"), Container::new("b", "img")],
            ..Default::default()
        };
        let names: Vec<_> = spec.all_containers().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["init", "a", "b"]);
    }

    #[test]
    fn test_lookup_by_name() {
        let mut container = Container::new("main", "img");
        container
            .volume_mounts
            .push(VolumeMount::readonly("certs", "/etc/certs"));
        assert!(container.volume_mount("certs").is_some());
        assert!(container.volume_mount("other").is_none());

        let spec = PodSpec {
            volumes: vec![Volume::from_config_map("certs", "cm")],
            ..Default::default()
        };
        assert!(spec.volume("certs").is_some());
        assert!(spec.volume("missing").is_none());
    }
}
