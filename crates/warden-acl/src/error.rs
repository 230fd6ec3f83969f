//! Error types for warden-acl

use thiserror::Error;

use crate::store::StoreError;

/// Result type alias for warden-acl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in warden-acl.
///
/// None of these mean "not permitted": a request that no rule grants is a
/// normal outcome and is reported through the evaluation result instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from warden-core
    #[error("Core error: {0}")]
    Core(#[from] warden_core::Error),

    /// The policy store failed to list bindings or resolve a role.
    #[error("Policy store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    /// Whether the error is a dangling role reference.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Store(StoreError::ClusterRoleNotFound { .. } | StoreError::RoleNotFound { .. })
        )
    }
}
