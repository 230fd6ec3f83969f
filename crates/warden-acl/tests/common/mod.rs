//! Shared fixtures for warden-acl integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use warden_acl::{PolicySnapshot, PolicyStore, StoreError};
use warden_core::{ClusterRole, ClusterRoleBinding, PolicyDocument, Role, RoleBinding};

/// Store wrapper that records every call and can be told to fail.
pub struct RecordingStore {
    inner: PolicySnapshot,
    calls: Mutex<Vec<String>>,
    fail_listing: bool,
}

impl RecordingStore {
    /// Wrap a document.
    pub fn new(yaml: &str) -> Self {
        let doc = PolicyDocument::from_yaml_str(yaml).unwrap();
        Self {
            inner: PolicySnapshot::from_document(doc),
            calls: Mutex::new(Vec::new()),
            fail_listing: false,
        }
    }

    /// A store whose list operations always fail.
    pub fn unavailable() -> Self {
        Self {
            inner: PolicySnapshot::default(),
            calls: Mutex::new(Vec::new()),
            fail_listing: true,
        }
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.fail_listing {
            return Err(StoreError::unavailable("informer cache not synced"));
        }
        Ok(())
    }
}

impl PolicyStore for RecordingStore {
    fn list_cluster_role_bindings(&self) -> Result<Vec<Arc<ClusterRoleBinding>>, StoreError> {
        self.record("list_cluster_role_bindings".to_string());
        self.check_available()?;
        self.inner.list_cluster_role_bindings()
    }

    fn get_cluster_role(&self, name: &str) -> Result<Arc<ClusterRole>, StoreError> {
        self.record(format!("get_cluster_role {name}"));
        self.inner.get_cluster_role(name)
    }

    fn list_role_bindings(&self, namespace: &str) -> Result<Vec<Arc<RoleBinding>>, StoreError> {
        self.record(format!("list_role_bindings {namespace}"));
        self.check_available()?;
        self.inner.list_role_bindings(namespace)
    }

    fn get_role(&self, namespace: &str, name: &str) -> Result<Arc<Role>, StoreError> {
        self.record(format!("get_role {namespace}/{name}"));
        self.inner.get_role(namespace, name)
    }
}

/// The `ns1` pod-reader setup used by several tests.
pub const POD_READER_POLICY: &str = r#"
clusterRoles:
  - name: unrelated
    rules:
      - verbs: ["*"]
        apiGroups: ["*"]
        resources: ["*"]
clusterRoleBindings:
  - name: root-only
    roleRef: unrelated
    subjects:
      - kind: User
        name: root
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
"#;
