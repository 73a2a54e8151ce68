//! Kubernetes metadata helpers shared by all generated resources

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum length of a DNS-1123 subdomain (ConfigMap, Secret, Pod names)
pub const DNS_SUBDOMAIN_MAX_LEN: usize = 253;

// =============================================================================
// ObjectMeta - Kubernetes metadata for descriptor objects
// =============================================================================

/// Kubernetes ObjectMeta subset used by descriptor objects.
///
/// Objects read from a workspace recipe may lack a namespace; the namespace is
/// assigned when the descriptor is applied, so it stays optional here.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    #[serde(default)]
    pub name: String,
    /// Resource namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Unmodelled fields (generateName, uid, ownerReferences, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ObjectMeta {
    /// Create metadata with only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create metadata for a resource generated for a workspace.
    ///
    /// Adds the workspace-id and managed-by labels so generated objects can be
    /// found and garbage collected with the workspace.
    pub fn for_workspace(name: impl Into<String>, workspace_id: impl Into<String>) -> Self {
        Self::named(name)
            .with_label(crate::LABEL_WORKSPACE_ID, workspace_id)
            .with_label(crate::LABEL_MANAGED_BY, crate::LABEL_MANAGED_BY_DEVENV)
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Name validation
// =============================================================================

/// Validate a name against the Kubernetes DNS-1123 subdomain rules.
///
/// Subdomains: lowercase alphanumerics, `-` and `.`, starting and ending with
/// an alphanumeric, at most 253 characters. Returns the reason on failure.
pub fn validate_dns_subdomain(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if name.len() > DNS_SUBDOMAIN_MAX_LEN {
        return Err(format!(
            "name is {} characters, maximum is {}",
            name.len(),
            DNS_SUBDOMAIN_MAX_LEN
        ));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-' || *c == '.'))
    {
        return Err(format!("invalid character '{}'", c));
    }

    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let starts = name.chars().next().is_some_and(alnum);
    let ends = name.chars().last().is_some_and(alnum);
    if !starts || !ends {
        return Err("name must start and end with an alphanumeric character".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_workspace_sets_labels() {
        let meta = ObjectMeta::for_workspace("ws1-certs", "ws1");
        assert_eq!(meta.name, "ws1-certs");
        assert_eq!(meta.namespace, None);
        assert_eq!(
            meta.labels.get(crate::LABEL_WORKSPACE_ID),
            Some(&"ws1".to_string())
        );
        assert_eq!(
            meta.labels.get(crate::LABEL_MANAGED_BY),
            Some(&crate::LABEL_MANAGED_BY_DEVENV.to_string())
        );
    }

    #[test]
    fn test_namespace_omitted_when_unset() {
        let json = serde_json::to_value(ObjectMeta::named("dev")).expect("serialize");
        assert_eq!(json, serde_json::json!({ "name": "dev" }));

        let json = serde_json::to_value(ObjectMeta::named("dev").with_namespace("team-a"))
            .expect("serialize");
        assert_eq!(json["namespace"], "team-a");
    }

    #[test]
    fn test_unmodelled_fields_round_trip() {
        let manifest = serde_json::json!({
            "name": "dev",
            "generateName": "dev-",
            "resourceVersion": "42",
            "annotations": { "che.eclipse.org/editor": "theia" }
        });
        let meta: ObjectMeta = serde_json::from_value(manifest.clone()).expect("deserialize");
        assert_eq!(meta.extra.get("generateName"), Some(&serde_json::json!("dev-")));
        assert_eq!(serde_json::to_value(&meta).expect("serialize"), manifest);
    }

    #[test]
    fn test_valid_subdomains() {
        for name in [
            "workspace123-che-git-self-signed-cert",
            "a",
            "my.config-map",
            "0abc",
        ] {
            assert!(validate_dns_subdomain(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_subdomains() {
        assert!(validate_dns_subdomain("").is_err());
        assert!(validate_dns_subdomain("Workspace").is_err());
        assert!(validate_dns_subdomain("-leading").is_err());
        assert!(validate_dns_subdomain("trailing.").is_err());
        assert!(validate_dns_subdomain("under_score").is_err());
        assert!(validate_dns_subdomain(&"a".repeat(254)).is_err());
        assert!(validate_dns_subdomain(&"a".repeat(253)).is_ok());
    }

    #[test]
    fn test_invalid_character_is_reported() {
        let reason = validate_dns_subdomain("ws/1").expect_err("slash is invalid");
        assert!(reason.contains('/'));
    }
}
