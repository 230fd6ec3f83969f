//! Binding resolution.
//!
//! Turns "which bindings exist in this scope" into "which roles apply to
//! this subject". Resolution runs binding, then subject, then role: a role
//! is only looked up once its binding is known to name the subject, and
//! only when the caller actually pulls that item from the iterator. An
//! evaluator that stops at the first matching rule therefore never fetches
//! roles it does not need.

use std::fmt;
use std::sync::Arc;

use warden_core::{
    BindingSubject, ClusterRole, ClusterRoleBinding, PolicyRule, Role, RoleBinding, Subject,
};

use crate::error::Result;
use crate::store::PolicyStore;

/// Where a role's rules apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Cluster-wide.
    Cluster,
    /// A single namespace.
    Namespace(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cluster => write!(f, "cluster"),
            Self::Namespace(ns) => write!(f, "namespace {ns}"),
        }
    }
}

/// A role reached through a binding that names the subject.
#[derive(Debug, Clone)]
pub enum ResolvedRole {
    /// Cluster role granted by a cluster role binding.
    Cluster {
        /// The applicable binding
        binding: Arc<ClusterRoleBinding>,
        /// The role it references
        role: Arc<ClusterRole>,
    },
    /// Namespaced role granted by a role binding.
    Namespaced {
        /// The applicable binding
        binding: Arc<RoleBinding>,
        /// The role it references
        role: Arc<Role>,
    },
}

impl ResolvedRole {
    /// The role's rules, in order.
    pub fn rules(&self) -> &[PolicyRule] {
        match self {
            Self::Cluster { role, .. } => &role.rules,
            Self::Namespaced { role, .. } => &role.rules,
        }
    }

    /// Scope the rules apply in.
    pub fn scope(&self) -> Scope {
        match self {
            Self::Cluster { .. } => Scope::Cluster,
            Self::Namespaced { role, .. } => Scope::Namespace(role.namespace.clone()),
        }
    }

    /// Name of the binding that made the role applicable.
    pub fn binding_name(&self) -> &str {
        match self {
            Self::Cluster { binding, .. } => &binding.name,
            Self::Namespaced { binding, .. } => &binding.name,
        }
    }

    /// Name of the role.
    pub fn role_name(&self) -> &str {
        match self {
            Self::Cluster { role, .. } => &role.name,
            Self::Namespaced { role, .. } => &role.name,
        }
    }
}

/// Whether any entry in a binding's subject list names `subject`.
pub fn binding_applies(subjects: &[BindingSubject], subject: &Subject) -> bool {
    subjects.iter().any(|entry| entry.matches(subject))
}

/// Resolves the roles that apply to a subject, one scope at a time.
#[derive(Debug)]
pub struct BindingResolver<'a, S: PolicyStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PolicyStore + ?Sized> BindingResolver<'a, S> {
    /// Create a resolver reading from `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Cluster roles bound to `subject`.
    ///
    /// Listing bindings fails immediately. Each yielded item performs its
    /// own role lookup and fails if the referenced cluster role is missing.
    pub fn cluster_roles<'s>(
        &self,
        subject: &'s Subject,
    ) -> Result<impl Iterator<Item = Result<ResolvedRole>> + use<'a, 's, S>> {
        let store = self.store;
        let bindings = store.list_cluster_role_bindings()?;

        Ok(bindings
            .into_iter()
            .filter(move |binding| binding_applies(&binding.subjects, subject))
            .map(move |binding| -> Result<ResolvedRole> {
                log::trace!(
                    "Cluster role binding '{}' applies to user '{}'",
                    binding.name,
                    subject.user
                );
                let role = store.get_cluster_role(&binding.role_ref)?;
                Ok(ResolvedRole::Cluster { binding, role })
            }))
    }

    /// Roles in `namespace` bound to `subject`.
    ///
    /// Only role bindings from `namespace` are considered, and their
    /// references are resolved against roles in the same namespace.
    pub fn namespace_roles<'s>(
        &self,
        subject: &'s Subject,
        namespace: &'s str,
    ) -> Result<impl Iterator<Item = Result<ResolvedRole>> + use<'a, 's, S>> {
        let store = self.store;
        let bindings = store.list_role_bindings(namespace)?;

        Ok(bindings
            .into_iter()
            .filter(move |binding| binding_applies(&binding.subjects, subject))
            .map(move |binding| -> Result<ResolvedRole> {
                log::trace!(
                    "Role binding '{namespace}/{}' applies to user '{}'",
                    binding.name,
                    subject.user
                );
                let role = store.get_role(namespace, &binding.role_ref)?;
                Ok(ResolvedRole::Namespaced { binding, role })
            }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryPolicyStore, StoreError};
    use crate::Error;
    use warden_core::PolicyDocument;

    fn store() -> MemoryPolicyStore {
        let doc = PolicyDocument::from_yaml_str(
            r#"
clusterRoles:
  - name: view
    rules:
      - verbs: ["get"]
        apiGroups: ["*"]
        resources: ["*"]
clusterRoleBindings:
  - name: alice-view
    roleRef: view
    subjects:
      - kind: User
        name: alice
  - name: admins-view
    roleRef: view
    subjects:
      - kind: Group
        name: admins
  - name: broken
    roleRef: missing
    subjects:
      - kind: Group
        name: broken
roles:
  - name: pod-reader
    namespace: ns1
    rules:
      - verbs: ["get"]
        apiGroups: [""]
        resources: ["pods"]
roleBindings:
  - name: dev-pod-reader
    namespace: ns1
    roleRef: pod-reader
    subjects:
      - kind: Group
        name: dev
"#,
        )
        .unwrap();
        MemoryPolicyStore::from_document(doc)
    }

    #[test]
    fn test_binding_applies_user_or_group() {
        let subjects = vec![BindingSubject::user("alice"), BindingSubject::group("dev")];
        assert!(binding_applies(&subjects, &Subject::new("alice")));
        assert!(binding_applies(
            &subjects,
            &Subject::new("bob").with_groups(["dev"])
        ));
        assert!(!binding_applies(&subjects, &Subject::new("bob")));
        assert!(!binding_applies(&[], &Subject::new("alice")));
    }

    #[test]
    fn test_cluster_roles_by_user() {
        let store = store();
        let resolver = BindingResolver::new(&store);
        let subject = Subject::new("alice");
        let roles: Vec<_> = resolver
            .cluster_roles(&subject)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].binding_name(), "alice-view");
        assert_eq!(roles[0].role_name(), "view");
        assert_eq!(roles[0].scope(), Scope::Cluster);
    }

    #[test]
    fn test_cluster_roles_by_group() {
        let store = store();
        let resolver = BindingResolver::new(&store);
        let subject = Subject::new("carol").with_groups(["admins"]);
        let roles: Vec<_> = resolver
            .cluster_roles(&subject)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].binding_name(), "admins-view");
    }

    #[test]
    fn test_unrelated_subject_resolves_nothing() {
        let store = store();
        let resolver = BindingResolver::new(&store);
        let subject = Subject::new("mallory");
        assert_eq!(resolver.cluster_roles(&subject).unwrap().count(), 0);
        assert_eq!(resolver.namespace_roles(&subject, "ns1").unwrap().count(), 0);
    }

    #[test]
    fn test_dangling_reference_is_an_error() {
        let store = store();
        let resolver = BindingResolver::new(&store);
        let subject = Subject::new("eve").with_groups(["broken"]);
        let mut roles = resolver.cluster_roles(&subject).unwrap();
        let err = roles.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            Error::Store(StoreError::ClusterRoleNotFound { ref name }) if name == "missing"
        ));
    }

    #[test]
    fn test_dangling_reference_not_fetched_for_other_subjects() {
        let store = store();
        let resolver = BindingResolver::new(&store);
        let subject = Subject::new("alice");
        assert!(
            resolver
                .cluster_roles(&subject)
                .unwrap()
                .all(|role| role.is_ok())
        );
    }

    #[test]
    fn test_namespace_roles() {
        let store = store();
        let resolver = BindingResolver::new(&store);
        let subject = Subject::new("alice").with_groups(["dev"]);

        let roles: Vec<_> = resolver
            .namespace_roles(&subject, "ns1")
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].role_name(), "pod-reader");
        assert_eq!(roles[0].scope(), Scope::Namespace("ns1".to_string()));
        assert_eq!(roles[0].rules().len(), 1);

        assert_eq!(resolver.namespace_roles(&subject, "ns2").unwrap().count(), 0);
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(Scope::Cluster.to_string(), "cluster");
        assert_eq!(
            Scope::Namespace("ns1".to_string()).to_string(),
            "namespace ns1"
        );
    }
}
