//! Deriving an [`Action`] from an HTTP request.
//!
//! Paths under a configured API prefix follow the Kubernetes layout:
//!
//! ```text
//! /api/{version}/{resource}[/{name}[/{subresource}]]
//! /api/{version}/namespaces/{namespace}/{resource}[/{name}[/{subresource}]]
//! /apis/{group}/{version}/...same as above...
//! ```
//!
//! Everything else is a non-resource request whose verb is the lower-cased
//! HTTP method.

use http::Method;
use warden_core::{Action, NonResourceAttributes, ResourceAttributes};

use crate::error::GateError;

/// Namespace subresources that do not introduce a nested resource.
const NAMESPACE_SUBRESOURCES: &[&str] = &["status", "finalize"];

/// Maps method + path + query to an [`Action`].
#[derive(Debug, Clone)]
pub struct RequestInfoResolver {
    api_prefixes: Vec<String>,
    grouped_api_prefix: String,
}

impl Default for RequestInfoResolver {
    fn default() -> Self {
        Self::new(vec!["api".to_string(), "apis".to_string()], "apis")
    }
}

impl RequestInfoResolver {
    /// Create a resolver.
    ///
    /// `api_prefixes` are the first path segments that mark a resource
    /// request; `grouped_api_prefix` is the one followed by an API group.
    pub fn new(api_prefixes: Vec<String>, grouped_api_prefix: impl Into<String>) -> Self {
        Self {
            api_prefixes,
            grouped_api_prefix: grouped_api_prefix.into(),
        }
    }

    /// Resolve a request.
    ///
    /// Fails only when a resource request uses a method with no verb
    /// mapping.
    pub fn resolve(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
    ) -> Result<Action, GateError> {
        let non_resource = || {
            Action::NonResource(NonResourceAttributes::new(
                method.as_str().to_ascii_lowercase(),
                path,
            ))
        };

        let parts = split_path(path);
        if parts.len() < 3 || !self.api_prefixes.iter().any(|p| p == parts[0]) {
            return Ok(non_resource());
        }

        let mut rest = &parts[1..];
        let mut api_group = "";
        if parts[0] == self.grouped_api_prefix {
            if rest.len() < 3 {
                return Ok(non_resource());
            }
            api_group = rest[0];
            rest = &rest[1..];
        }
        // Skip the version.
        rest = &rest[1..];

        let mut verb = verb_for_method(method)
            .ok_or_else(|| GateError::MissingContext(format!("unsupported method {method}")))?;

        let mut namespace = "";
        if rest[0] == "namespaces" && rest.len() > 1 {
            namespace = rest[1];
            if rest.len() > 2 && !NAMESPACE_SUBRESOURCES.contains(&rest[2]) {
                rest = &rest[2..];
            }
        }

        let resource = rest[0];
        let name = rest.get(1).copied().unwrap_or("");
        let subresource = rest.get(2).copied().unwrap_or("");

        if name.is_empty() {
            verb = match verb {
                "get" if is_watch(query) => "watch",
                "get" => "list",
                "delete" => "deletecollection",
                other => other,
            };
        }

        Ok(Action::Resource(
            ResourceAttributes::new(verb, resource)
                .api_group(api_group)
                .name(name)
                .subresource(subresource)
                .namespace(namespace),
        ))
    }
}

fn split_path(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').collect()
}

fn verb_for_method(method: &Method) -> Option<&'static str> {
    match *method {
        Method::GET | Method::HEAD => Some("get"),
        Method::POST => Some("create"),
        Method::PUT => Some("update"),
        Method::PATCH => Some("patch"),
        Method::DELETE => Some("delete"),
        _ => None,
    }
}

fn is_watch(query: Option<&str>) -> bool {
    query
        .into_iter()
        .flat_map(|q| q.split('&'))
        .any(|pair| matches!(pair, "watch=true" | "watch=1"))
}
