//! Warden RBAC authorization umbrella crate.
//!
//! This crate re-exports all Warden components for convenience.
//! Use feature flags to enable specific functionality.

#![doc = include_str!("../README.md")]

pub use warden_core as core;

#[cfg(feature = "acl")]
pub use warden_acl as acl;

#[cfg(feature = "auth")]
pub use warden_auth as auth;

#[cfg(feature = "cli")]
pub use warden_cli as cli;
