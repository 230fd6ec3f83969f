//! Warden Core: shared types and errors for the RBAC decision engine.
//!
//! This crate has no internal Warden dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`subject`]: The requesting identity
//! - [`action`]: Resource and non-resource actions
//! - [`rule`]: Policy rules and wildcard markers
//! - [`role`]: Roles, cluster roles and their bindings
//! - [`document`]: Serialized policy bundles
//! - [`error`]: Error types and Result alias

#![doc = include_str!("../README.md")]

pub mod action;
pub mod document;
pub mod error;
pub mod role;
pub mod rule;
pub mod subject;

// Re-export key types at crate root for convenience
pub use action::{Action, NonResourceAttributes, ResourceAttributes};
pub use document::PolicyDocument;
pub use error::{Error, Result};
pub use role::{BindingSubject, ClusterRole, ClusterRoleBinding, Role, RoleBinding, SubjectKind};
pub use rule::{API_GROUP_ALL, NON_RESOURCE_ALL, PolicyRule, RESOURCE_ALL, VERB_ALL};
pub use subject::Subject;
