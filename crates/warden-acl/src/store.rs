//! Policy store abstraction and an in-memory implementation.
//!
//! The engine only ever reads policy objects through [`PolicyStore`]. How
//! the objects get there (a file, a watch on an API server, a database) is
//! the store's business. Reads are expected to be cheap cache lookups;
//! nothing in the engine blocks on network I/O.
//!
//! [`MemoryPolicyStore`] keeps an immutable [`PolicySnapshot`] behind an
//! `Arc` and swaps it wholesale on refresh, so concurrent readers always
//! see either the old or the new policy set, never a mix.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use thiserror::Error;
use warden_core::{ClusterRole, ClusterRoleBinding, PolicyDocument, Role, RoleBinding};

/// Failures reported by a [`PolicyStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// A binding references a cluster role that does not exist.
    #[error("clusterrole \"{name}\" not found")]
    ClusterRoleNotFound {
        /// Referenced name
        name: String,
    },

    /// A binding references a role that does not exist in its namespace.
    #[error("role \"{namespace}/{name}\" not found")]
    RoleNotFound {
        /// Namespace searched
        namespace: String,
        /// Referenced name
        name: String,
    },

    /// The store could not serve the request at all.
    #[error("policy store unavailable: {message}")]
    Unavailable {
        /// What went wrong
        message: String,
    },
}

impl StoreError {
    /// Creates a new unavailable error.
    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        StoreError::Unavailable {
            message: message.into(),
        }
    }
}

/// Read interface over roles and bindings.
///
/// Implementations must be safe for concurrent use; the evaluator calls
/// them from many requests at once without any locking of its own.
pub trait PolicyStore: Send + Sync {
    /// All cluster role bindings.
    fn list_cluster_role_bindings(&self) -> Result<Vec<Arc<ClusterRoleBinding>>, StoreError>;

    /// The cluster role called `name`.
    fn get_cluster_role(&self, name: &str) -> Result<Arc<ClusterRole>, StoreError>;

    /// All role bindings in `namespace`.
    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<Arc<RoleBinding>>, StoreError>;

    /// The role called `name` in `namespace`.
    fn get_role(&self, namespace: &str, name: &str) -> Result<Arc<Role>, StoreError>;
}

// ============================================================================
// PolicySnapshot
// ============================================================================

/// Immutable, indexed view of a [`PolicyDocument`].
#[derive(Debug, Default)]
pub struct PolicySnapshot {
    cluster_roles: HashMap<String, Arc<ClusterRole>>,
    cluster_role_bindings: Vec<Arc<ClusterRoleBinding>>,
    roles: HashMap<(String, String), Arc<Role>>,
    role_bindings: HashMap<String, Vec<Arc<RoleBinding>>>,
}

impl PolicySnapshot {
    /// Index a document.
    ///
    /// When two objects share a key the later one wins.
    pub fn from_document(doc: PolicyDocument) -> Self {
        let mut snapshot = Self::default();

        for role in doc.cluster_roles {
            let name = role.name.clone();
            if snapshot
                .cluster_roles
                .insert(name.clone(), Arc::new(role))
                .is_some()
            {
                log::warn!("Duplicate cluster role '{name}'; keeping the last definition");
            }
        }

        snapshot.cluster_role_bindings = doc
            .cluster_role_bindings
            .into_iter()
            .map(Arc::new)
            .collect();

        for role in doc.roles {
            let key = (role.namespace.clone(), role.name.clone());
            if let Some(previous) = snapshot.roles.insert(key, Arc::new(role)) {
                log::warn!(
                    "Duplicate role '{}/{}'; keeping the last definition",
                    previous.namespace,
                    previous.name
                );
            }
        }

        for binding in doc.role_bindings {
            snapshot
                .role_bindings
                .entry(binding.namespace.clone())
                .or_default()
                .push(Arc::new(binding));
        }

        snapshot
    }

    /// Number of cluster roles.
    pub fn cluster_role_count(&self) -> usize {
        self.cluster_roles.len()
    }

    /// Number of namespaced roles across all namespaces.
    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    /// Number of bindings of either scope.
    pub fn binding_count(&self) -> usize {
        self.cluster_role_bindings.len() + self.role_bindings.values().map(Vec::len).sum::<usize>()
    }
}

impl PolicyStore for PolicySnapshot {
    fn list_cluster_role_bindings(&self) -> Result<Vec<Arc<ClusterRoleBinding>>, StoreError> {
        Ok(self.cluster_role_bindings.clone())
    }

    fn get_cluster_role(&self, name: &str) -> Result<Arc<ClusterRole>, StoreError> {
        self.cluster_roles
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::ClusterRoleNotFound {
                name: name.to_string(),
            })
    }

    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<Arc<RoleBinding>>, StoreError> {
        Ok(self
            .role_bindings
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    fn get_role(&self, namespace: &str, name: &str) -> Result<Arc<Role>, StoreError> {
        self.roles
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::RoleNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }
}

// ============================================================================
// MemoryPolicyStore
// ============================================================================

/// Refreshable in-memory store.
///
/// Each read takes the current snapshot and works on it without holding
/// the lock, so a refresh never waits for in-flight evaluations.
#[derive(Debug, Default)]
pub struct MemoryPolicyStore {
    current: RwLock<Arc<PolicySnapshot>>,
}

impl MemoryPolicyStore {
    /// Create a store serving `snapshot`.
    pub fn new(snapshot: PolicySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Create a store from a document.
    pub fn from_document(doc: PolicyDocument) -> Self {
        Self::new(PolicySnapshot::from_document(doc))
    }

    /// Create a store from a policy file.
    pub fn load(path: impl AsRef<Path>) -> warden_core::Result<Self> {
        Ok(Self::from_document(PolicyDocument::load(path)?))
    }

    /// The snapshot currently being served.
    pub fn snapshot(&self) -> Result<Arc<PolicySnapshot>, StoreError> {
        self.current
            .read()
            .map(|guard| Arc::clone(&*guard))
            .map_err(|_| StoreError::unavailable("policy snapshot lock poisoned"))
    }

    /// Atomically replace the served policy set.
    pub fn replace(&self, doc: PolicyDocument) {
        let snapshot = Arc::new(PolicySnapshot::from_document(doc));
        log::info!(
            "Policy snapshot replaced: {} cluster roles, {} roles, {} bindings",
            snapshot.cluster_role_count(),
            snapshot.role_count(),
            snapshot.binding_count()
        );
        // A poisoned lock still holds a valid Arc; overwrite it.
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot;
    }

    /// Re-read a policy file and replace the served policy set.
    ///
    /// On failure the previous snapshot stays in place.
    pub fn reload(&self, path: impl AsRef<Path>) -> warden_core::Result<()> {
        let doc = PolicyDocument::load(path)?;
        self.replace(doc);
        Ok(())
    }
}

impl PolicyStore for MemoryPolicyStore {
    fn list_cluster_role_bindings(&self) -> Result<Vec<Arc<ClusterRoleBinding>>, StoreError> {
        self.snapshot()?.list_cluster_role_bindings()
    }

    fn get_cluster_role(&self, name: &str) -> Result<Arc<ClusterRole>, StoreError> {
        self.snapshot()?.get_cluster_role(name)
    }

    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<Arc<RoleBinding>>, StoreError> {
        self.snapshot()?.list_role_bindings(namespace)
    }

    fn get_role(&self, namespace: &str, name: &str) -> Result<Arc<Role>, StoreError> {
        self.snapshot()?.get_role(namespace, name)
    }
}

// ============================================================================
// Tests
// ============================================================================
