//! The requesting identity.

use serde::{Deserialize, Serialize};

/// Authenticated identity making a request: a user name plus the groups
/// the user belongs to.
///
/// Immutable for the lifetime of a request. Upstream authenticators place
/// one of these in the request extensions for the gate to pick up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// User name.
    pub user: String,
    /// Group memberships. Order is irrelevant.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Subject {
    /// Create a subject with no group memberships.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            groups: Vec::new(),
        }
    }

    /// Replace the group memberships.
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the subject is a member of `group`.
    ///
    /// This is the only group-membership check in the crate family; both
    /// cluster and namespace scopes go through it.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}
