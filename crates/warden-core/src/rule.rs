//! Policy rules and wildcard markers.

use serde::{Deserialize, Serialize};

/// Matches every verb when present in [`PolicyRule::verbs`].
pub const VERB_ALL: &str = "*";

/// Matches every API group when present in [`PolicyRule::api_groups`].
pub const API_GROUP_ALL: &str = "*";

/// Matches every resource and subresource when present in [`PolicyRule::resources`].
pub const RESOURCE_ALL: &str = "*";

/// Matches every path when present in [`PolicyRule::non_resource_urls`].
pub const NON_RESOURCE_ALL: &str = "*";

/// A single grant inside a role.
///
/// Rules only ever grant; there is no negation. A rule with an empty
/// `resource_names` list is unrestricted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    /// Allowed verbs, or [`VERB_ALL`].
    #[serde(default)]
    pub verbs: Vec<String>,
    /// Allowed API groups, or [`API_GROUP_ALL`].
    #[serde(default)]
    pub api_groups: Vec<String>,
    /// Resource specifiers: `*`, `pods`, `pods/log`, `pods/*` or `*/scale`.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Allow-list of object names. Empty means any name.
    #[serde(default)]
    pub resource_names: Vec<String>,
    /// Non-resource path patterns: exact, `*`, or a trailing `*` prefix.
    #[serde(default, rename = "nonResourceURLs")]
    pub non_resource_urls: Vec<String>,
}

impl PolicyRule {
    /// Create an empty rule that grants nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the allowed verbs.
    pub fn verbs<I, S>(mut self, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.verbs = verbs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the allowed API groups.
    pub fn api_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Set the resource specifiers.
    pub fn resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    /// Set the resource-name allow-list.
    pub fn resource_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the non-resource path patterns.
    pub fn non_resource_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_resource_urls = urls.into_iter().map(Into::into).collect();
        self
    }
}
