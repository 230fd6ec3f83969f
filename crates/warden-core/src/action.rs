//! Requested actions.
//!
//! An [`Action`] is either a structured operation on an API resource or a
//! raw URL path plus verb. The two shapes are mutually exclusive; which one
//! applies is encoded in the enum variant rather than a flag.

use serde::{Deserialize, Serialize};

/// A structured operation on an API resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAttributes {
    /// API group (`""` for the core group).
    #[serde(default)]
    pub api_group: String,
    /// Resource type, e.g. `pods`.
    pub resource: String,
    /// Subresource, e.g. `log` or `status`. Empty when absent.
    #[serde(default)]
    pub subresource: String,
    /// Name of the object. Empty for collection requests.
    #[serde(default)]
    pub name: String,
    /// Namespace. Empty for cluster-scoped requests.
    #[serde(default)]
    pub namespace: String,
    /// Verb, e.g. `get`, `list`, `delete`.
    pub verb: String,
}

impl ResourceAttributes {
    /// Create attributes for `verb` on `resource` in the core API group.
    pub fn new(verb: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            resource: resource.into(),
            ..Default::default()
        }
    }

    /// Set the API group.
    pub fn api_group(mut self, group: impl Into<String>) -> Self {
        self.api_group = group.into();
        self
    }

    /// Set the subresource.
    pub fn subresource(mut self, subresource: impl Into<String>) -> Self {
        self.subresource = subresource.into();
        self
    }

    /// Set the object name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// `resource`, or `resource/subresource` when a subresource is present.
    pub fn combined_resource(&self) -> String {
        if self.subresource.is_empty() {
            self.resource.clone()
        } else {
            format!("{}/{}", self.resource, self.subresource)
        }
    }
}

/// A raw URL path request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonResourceAttributes {
    /// Request path, e.g. `/healthz`.
    pub path: String,
    /// Verb, e.g. `get`.
    pub verb: String,
}

impl NonResourceAttributes {
    /// Create attributes for `verb` on `path`.
    pub fn new(verb: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            verb: verb.into(),
            path: path.into(),
        }
    }
}

/// The operation being authorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Action {
    /// Structured resource operation.
    Resource(ResourceAttributes),
    /// Raw path + verb.
    NonResource(NonResourceAttributes),
}

impl Action {
    /// Shorthand for a resource action.
    pub fn resource(attrs: ResourceAttributes) -> Self {
        Action::Resource(attrs)
    }

    /// Shorthand for a non-resource action.
    pub fn non_resource(verb: impl Into<String>, path: impl Into<String>) -> Self {
        Action::NonResource(NonResourceAttributes::new(verb, path))
    }

    /// Whether this is a structured resource request.
    pub fn is_resource_request(&self) -> bool {
        matches!(self, Action::Resource(_))
    }

    /// The requested verb.
    pub fn verb(&self) -> &str {
        match self {
            Action::Resource(attrs) => &attrs.verb,
            Action::NonResource(attrs) => &attrs.verb,
        }
    }

    /// The namespace of a namespaced resource request.
    ///
    /// `None` for non-resource requests and for cluster-scoped resources.
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Action::Resource(attrs) if !attrs.namespace.is_empty() => Some(&attrs.namespace),
            _ => None,
        }
    }
}

impl From<ResourceAttributes> for Action {
    fn from(attrs: ResourceAttributes) -> Self {
        Action::Resource(attrs)
    }
}

impl From<NonResourceAttributes> for Action {
    fn from(attrs: NonResourceAttributes) -> Self {
        Action::NonResource(attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_resource() {
        let attrs = ResourceAttributes::new("get", "pods");
        assert_eq!(attrs.combined_resource(), "pods");

        let attrs = attrs.subresource("log");
        assert_eq!(attrs.combined_resource(), "pods/log");
    }

    #[test]
    fn test_namespace_only_for_namespaced_resources() {
        let cluster = Action::resource(ResourceAttributes::new("list", "nodes"));
        assert_eq!(cluster.namespace(), None);

        let namespaced = Action::resource(ResourceAttributes::new("get", "pods").namespace("ns1"));
        assert_eq!(namespaced.namespace(), Some("ns1"));

        let raw = Action::non_resource("get", "/healthz");
        assert_eq!(raw.namespace(), None);
    }

    #[test]
    fn test_verb_and_shape() {
        let action: Action = ResourceAttributes::new("delete", "pods").into();
        assert!(action.is_resource_request());
        assert_eq!(action.verb(), "delete");

        let action: Action = NonResourceAttributes::new("get", "/metrics").into();
        assert!(!action.is_resource_request());
        assert_eq!(action.verb(), "get");
    }
}
