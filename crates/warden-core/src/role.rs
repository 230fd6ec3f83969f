//! Roles and the bindings that attach them to subjects.

use serde::{Deserialize, Serialize};

use crate::rule::PolicyRule;
use crate::subject::Subject;

// --- Roles ---

/// Cluster-wide named collection of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRole {
    /// Role name, unique across the cluster.
    pub name: String,
    /// Rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// Named collection of rules scoped to one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name, unique within its namespace.
    pub name: String,
    /// Owning namespace.
    pub namespace: String,
    /// Rules in evaluation order.
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

// --- Binding subjects ---

/// What a [`BindingSubject`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    /// A single user, matched by name.
    User,
    /// A group, matched against the requester's group memberships.
    Group,
    /// Any other kind, such as `ServiceAccount`. Never matches a subject.
    #[serde(other)]
    Other,
}

/// One entry in a binding's subject list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSubject {
    /// Entry kind.
    pub kind: SubjectKind,
    /// User or group name.
    pub name: String,
}

impl BindingSubject {
    /// A user entry.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            kind: SubjectKind::User,
            name: name.into(),
        }
    }

    /// A group entry.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            kind: SubjectKind::Group,
            name: name.into(),
        }
    }

    /// Whether this entry names `subject`, directly or through a group.
    pub fn matches(&self, subject: &Subject) -> bool {
        match self.kind {
            SubjectKind::User => self.name == subject.user,
            SubjectKind::Group => subject.in_group(&self.name),
            SubjectKind::Other => false,
        }
    }
}

// --- Bindings ---

/// Grants a [`ClusterRole`] to subjects across the whole cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRoleBinding {
    /// Binding name.
    pub name: String,
    /// Name of the referenced cluster role.
    pub role_ref: String,
    /// Who the binding applies to.
    #[serde(default)]
    pub subjects: Vec<BindingSubject>,
}

/// Grants a [`Role`] to subjects within one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    /// Binding name.
    pub name: String,
    /// Namespace of the binding and of the referenced role.
    pub namespace: String,
    /// Name of the referenced role in `namespace`.
    pub role_ref: String,
    /// Who the binding applies to.
    #[serde(default)]
    pub subjects: Vec<BindingSubject>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_entry_matches_by_name() {
        let entry = BindingSubject::user("alice");
        assert!(entry.matches(&Subject::new("alice")));
        assert!(!entry.matches(&Subject::new("bob")));
    }

    #[test]
    fn test_user_entry_ignores_groups() {
        let entry = BindingSubject::user("alice");
        let subject = Subject::new("bob").with_groups(["alice"]);
        assert!(!entry.matches(&subject));
    }

    #[test]
    fn test_group_entry_matches_membership() {
        let entry = BindingSubject::group("admins");
        let subject = Subject::new("nobody").with_groups(["dev", "admins"]);
        assert!(entry.matches(&subject));
        assert!(!entry.matches(&Subject::new("admins")));
    }

    #[test]
    fn test_unknown_kind_parses_and_never_matches() {
        let entries: Vec<BindingSubject> = serde_yaml::from_str(
            "- kind: ServiceAccount\n  name: default\n- kind: Group\n  name: dev\n",
        )
        .unwrap();
        assert_eq!(entries[0].kind, SubjectKind::Other);
        assert_eq!(entries[1], BindingSubject::group("dev"));

        let subject = Subject::new("default").with_groups(["default", "dev"]);
        assert!(!entries[0].matches(&subject));
        assert!(entries[1].matches(&subject));
    }

    #[test]
    fn test_binding_deserialize() {
        let yaml = r#"
name: read-pods
namespace: ns1
roleRef: pod-reader
subjects:
  - kind: Group
    name: dev
  - kind: User
    name: alice
"#;
        let binding: RoleBinding = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(binding.role_ref, "pod-reader");
        assert_eq!(binding.subjects.len(), 2);
        assert_eq!(binding.subjects[0], BindingSubject::group("dev"));
        assert_eq!(binding.subjects[1], BindingSubject::user("alice"));
    }
}
