//! # warden-acl
//!
//! Authorization decision engine for Warden.
//!
//! This crate implements RBAC evaluation:
//! - Rule matching against resource and non-resource requests ([`policy`])
//! - Read-only policy store abstraction and an in-memory store ([`store`])
//! - Binding resolution for users and groups ([`resolver`])
//! - Cluster-then-namespace permission evaluation ([`enforcement`])
//!
//! ```rust
//! use std::sync::Arc;
//! use warden_acl::{MemoryPolicyStore, PermissionEvaluator};
//! use warden_core::{Action, PolicyDocument, ResourceAttributes, Subject};
//!
//! let doc = PolicyDocument::from_yaml_str(r#"
//! roles:
//!   - name: pod-reader
//!     namespace: ns1
//!     rules:
//!       - verbs: ["get"]
//!         apiGroups: [""]
//!         resources: ["pods"]
//! roleBindings:
//!   - name: dev-pod-reader
//!     namespace: ns1
//!     roleRef: pod-reader
//!     subjects:
//!       - kind: Group
//!         name: dev
//! "#).unwrap();
//!
//! let evaluator = PermissionEvaluator::new(Arc::new(MemoryPolicyStore::from_document(doc)));
//! let alice = Subject::new("alice").with_groups(["dev"]);
//!
//! let get = Action::resource(ResourceAttributes::new("get", "pods").namespace("ns1"));
//! assert!(evaluator.evaluate(&alice, &get).unwrap());
//!
//! let delete = Action::resource(ResourceAttributes::new("delete", "pods").namespace("ns1"));
//! assert!(!evaluator.evaluate(&alice, &delete).unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod enforcement;
pub mod error;
pub mod policy;
pub mod resolver;
pub mod store;

pub use enforcement::{Decision, Grant, PermissionEvaluator};
pub use error::{Error, Result};
pub use policy::{
    path_matches, resource_matches, rule_matches_non_resource, rule_matches_request,
    rule_matches_resources,
};
pub use resolver::{BindingResolver, ResolvedRole, Scope, binding_applies};
pub use store::{MemoryPolicyStore, PolicySnapshot, PolicyStore, StoreError};
