//! Authorization gate for Warden.
//!
//! Provides:
//! - [`GateLayer`] / [`GateService`]: Tower middleware that asks a
//!   [`warden_acl::PermissionEvaluator`] about every protected request
//! - [`SubjectExtractor`]: trait for finding out who is calling (implement per
//!   authenticator)
//! - [`HeaderSubject`] / [`ExtensionSubject`]: the two stock extractors
//! - [`RequestInfoResolver`]: turns method + path into a [`warden_core::Action`]
//! - [`GateConfig`]: configuration for the gate
//! - [`clean_path`]: the path normalisation the gate matches and resolves with
//! - [`GateError`]: gate-specific error types

mod error;
mod middleware;
mod request_info;
mod subject;

pub use error::GateError;
pub use middleware::{GateLayer, GateService};
pub use request_info::RequestInfoResolver;
pub use subject::{
    ExtensionSubject, HeaderSubject, REMOTE_GROUP_HEADER, REMOTE_USER_HEADER, subject_from_parts,
};

use axum::body::Body;
use http::Request;
use serde::{Deserialize, Serialize};
use warden_core::Subject;

/// Configuration for the gate middleware.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Whether the gate is enabled. When false, all requests pass through.
    pub enabled: bool,
    /// Path prefix the gate protects.
    pub path: String,
    /// Path prefixes that are always forwarded.
    pub excepted_paths: Vec<String>,
    /// First path segments that mark a resource request.
    pub api_prefixes: Vec<String>,
    /// The API prefix that is followed by an API group.
    pub grouped_api_prefix: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/".to_string(),
            excepted_paths: Vec::new(),
            api_prefixes: vec!["api".to_string(), "apis".to_string()],
            grouped_api_prefix: "apis".to_string(),
        }
    }
}

impl GateConfig {
    /// Add an excepted path prefix.
    pub fn except(mut self, path: impl Into<String>) -> Self {
        self.excepted_paths.push(path.into());
        self
    }

    /// Whether a request for `path` must be authorized.
    ///
    /// Both the request path and the configured prefixes are compared in
    /// their [`clean_path`] form, so `//` and `..` segments cannot move a
    /// request out from under the gate or into an excepted prefix.
    pub fn protects(&self, path: &str) -> bool {
        let path = clean_path(path);
        if !self.enabled || !path.starts_with(clean_path(&self.path).as_str()) {
            return false;
        }
        !self
            .excepted_paths
            .iter()
            .any(|excepted| path.starts_with(clean_path(excepted).as_str()))
    }

    /// A request-info resolver using this config's API prefixes.
    pub fn request_info_resolver(&self) -> RequestInfoResolver {
        RequestInfoResolver::new(self.api_prefixes.clone(), self.grouped_api_prefix.clone())
    }
}

/// Lexically normalise a URL path.
///
/// Repeated slashes collapse, `.` segments drop and `..` removes the segment
/// before it, never climbing above the root. The result always starts with
/// `/`, and keeps a trailing `/` when the input had one.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut cleaned = format!("/{}", segments.join("/"));
    if path.ends_with('/') && cleaned != "/" {
        cleaned.push('/');
    }
    cleaned
}

/// Trait for identifying the caller of a request.
///
/// Implement this for each authenticator in front of the gate. The middleware
/// calls `extract()` on every protected request; an error ends the request
/// with a 500.
pub trait SubjectExtractor: Send + Sync + 'static {
    /// Find the subject making `req`.
    fn extract(&self, req: &Request<Body>) -> Result<Subject, GateError>;
}
