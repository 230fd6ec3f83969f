//! Policy documents: a serialized bundle of roles and bindings.
//!
//! A document is the on-disk form that an in-memory policy store is built
//! from. YAML and JSON are both accepted; YAML is the default.
//!
//! ```yaml
//! clusterRoles:
//!   - name: healthz-reader
//!     rules:
//!       - verbs: ["get"]
//!         nonResourceURLs: ["/healthz"]
//! roles:
//!   - name: pod-reader
//!     namespace: ns1
//!     rules:
//!       - verbs: ["get", "list"]
//!         apiGroups: [""]
//!         resources: ["pods"]
//! roleBindings:
//!   - name: dev-pod-reader
//!     namespace: ns1
//!     roleRef: pod-reader
//!     subjects:
//!       - kind: Group
//!         name: dev
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::role::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use crate::rule::PolicyRule;

/// Roles and bindings loaded together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDocument {
    /// Cluster-scoped roles.
    #[serde(default)]
    pub cluster_roles: Vec<ClusterRole>,
    /// Cluster-scoped bindings.
    #[serde(default)]
    pub cluster_role_bindings: Vec<ClusterRoleBinding>,
    /// Namespaced roles.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Namespaced bindings.
    #[serde(default)]
    pub role_bindings: Vec<RoleBinding>,
}

impl PolicyDocument {
    /// Parse a YAML document.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read and parse a document, choosing the format from the extension.
    ///
    /// `.json` files are parsed as JSON, everything else as YAML. The
    /// document is validated before it is returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let doc = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };

        doc.validate()?;
        log::debug!(
            "Loaded policy document {}: {} cluster roles, {} cluster role bindings, {} roles, {} role bindings",
            path.display(),
            doc.cluster_roles.len(),
            doc.cluster_role_bindings.len(),
            doc.roles.len(),
            doc.role_bindings.len()
        );
        Ok(doc)
    }

    /// Check structural well-formedness.
    ///
    /// Dangling role references are not rejected here: the store reports
    /// them at lookup time, where they surface as evaluation errors.
    pub fn validate(&self) -> Result<()> {
        for role in &self.cluster_roles {
            require_name("cluster role", &role.name)?;
            validate_rules(&format!("cluster role '{}'", role.name), &role.rules)?;
        }

        for binding in &self.cluster_role_bindings {
            require_name("cluster role binding", &binding.name)?;
            if binding.role_ref.is_empty() {
                return Err(Error::validation(format!(
                    "cluster role binding '{}' has an empty roleRef",
                    binding.name
                )));
            }
        }

        for role in &self.roles {
            require_name("role", &role.name)?;
            require_namespace("role", &role.name, &role.namespace)?;
            validate_rules(
                &format!("role '{}/{}'", role.namespace, role.name),
                &role.rules,
            )?;
        }

        for binding in &self.role_bindings {
            require_name("role binding", &binding.name)?;
            require_namespace("role binding", &binding.name, &binding.namespace)?;
            if binding.role_ref.is_empty() {
                return Err(Error::validation(format!(
                    "role binding '{}/{}' has an empty roleRef",
                    binding.namespace, binding.name
                )));
            }
        }

        Ok(())
    }
}

fn require_name(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation(format!("{kind} name must not be empty")));
    }
    Ok(())
}

fn require_namespace(kind: &str, name: &str, namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(Error::validation(format!(
            "{kind} '{name}' must have a namespace"
        )));
    }
    Ok(())
}

fn validate_rules(owner: &str, rules: &[PolicyRule]) -> Result<()> {
    for (idx, rule) in rules.iter().enumerate() {
        if rule.verbs.is_empty() {
            return Err(Error::validation(format!(
                "{owner} rule {idx} has no verbs"
            )));
        }
        if rule.resources.is_empty() && rule.non_resource_urls.is_empty() {
            return Err(Error::validation(format!(
                "{owner} rule {idx} grants neither resources nor nonResourceURLs"
            )));
        }
    }
    Ok(())
}
