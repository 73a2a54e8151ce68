//! Workspace workload descriptor and runtime identity

use std::collections::BTreeMap;

use devenv_common::yaml::{from_value, parse_yaml_multi};
use devenv_common::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::k8s::{ConfigMap, Pod};

/// Identity of the workspace runtime being provisioned
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeIdentity {
    /// Stable workspace id; generated resource names derive from it
    pub workspace_id: String,
    /// Namespace the workspace runs in, if already known
    pub infrastructure_namespace: Option<String>,
}

impl RuntimeIdentity {
    /// Create an identity with just a workspace id
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            infrastructure_namespace: None,
        }
    }

    /// Set the infrastructure namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.infrastructure_namespace = Some(namespace.into());
        self
    }
}

/// A single object of a descriptor, in the form it is written out
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Manifest {
    /// ConfigMap object
    ConfigMap(ConfigMap),
    /// Pod object
    Pod(Pod),
}

/// In-memory description of a workspace's pods and config maps.
///
/// Owned by the provisioning pipeline for the duration of one run.
/// Provisioners mutate it in place; both collections are keyed by object name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KubernetesEnvironment {
    pods: BTreeMap<String, Pod>,
    config_maps: BTreeMap<String, ConfigMap>,
}

impl KubernetesEnvironment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Pods keyed by name
    pub fn pods(&self) -> &BTreeMap<String, Pod> {
        &self.pods
    }

    /// Mutable pods keyed by name
    pub fn pods_mut(&mut self) -> &mut BTreeMap<String, Pod> {
        &mut self.pods
    }

    /// ConfigMaps keyed by name
    pub fn config_maps(&self) -> &BTreeMap<String, ConfigMap> {
        &self.config_maps
    }

    /// Insert a pod under its metadata name, replacing any pod with the same name
    pub fn add_pod(&mut self, pod: Pod) {
        self.pods.insert(pod.metadata.name.clone(), pod);
    }

    /// Insert a config map under its metadata name, replacing any with the same name
    pub fn add_config_map(&mut self, config_map: ConfigMap) {
        self.config_maps
            .insert(config_map.metadata.name.clone(), config_map);
    }

    /// Build an environment from a multi-document YAML (or JSON) manifest stream.
    ///
    /// Accepts `Pod` and `ConfigMap` documents. Every object must be named and
    /// names must be unique per kind.
    pub fn from_manifests(input: &str) -> Result<Self> {
        let mut env = Self::new();

        for (idx, doc) in parse_yaml_multi(input)?.into_iter().enumerate() {
            let position = format!("document {}", idx + 1);
            let kind = doc
                .get("kind")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::validation(&position, "missing kind"))?
                .to_string();

            match kind.as_str() {
                Pod::KIND => {
                    let pod: Pod = from_value(doc, Pod::KIND)?;
                    let name = required_name(&pod.metadata.name, Pod::KIND, &position)?;
                    if env.pods.contains_key(&name) {
                        return Err(Error::validation(
                            format!("Pod/{}", name),
                            "duplicate pod name",
                        ));
                    }
                    debug!(pod = %name, "loaded pod");
                    env.add_pod(pod);
                }
                ConfigMap::KIND => {
                    let cm: ConfigMap = from_value(doc, ConfigMap::KIND)?;
                    let name = required_name(&cm.metadata.name, ConfigMap::KIND, &position)?;
                    if env.config_maps.contains_key(&name) {
                        return Err(Error::validation(
                            format!("ConfigMap/{}", name),
                            "duplicate config map name",
                        ));
                    }
                    debug!(config_map = %name, "loaded config map");
                    env.add_config_map(cm);
                }
                other => {
                    return Err(Error::validation(
                        position,
                        format!("unsupported kind '{}', expected Pod or ConfigMap", other),
                    ));
                }
            }
        }

        Ok(env)
    }

    /// All objects of the environment: config maps first, then pods, each by name
    pub fn to_manifests(&self) -> Vec<Manifest> {
        self.config_maps
            .values()
            .cloned()
            .map(Manifest::ConfigMap)
            .chain(self.pods.values().cloned().map(Manifest::Pod))
            .collect()
    }
}

fn required_name(name: &str, kind: &str, position: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::validation(
            format!("{} in {}", kind, position),
            "missing metadata.name",
        ));
    }
    Ok(name.to_string())
}
