//! Error types for warden-cli

use thiserror::Error;

/// Result type alias for warden-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in warden-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from warden-core (policy files, configuration)
    #[error("Core error: {0}")]
    Core(#[from] warden_core::Error),

    /// The evaluator could not reach a decision
    #[error("Evaluation error: {0}")]
    Acl(#[from] warden_acl::Error),

    /// The HTTP server failed to bind or run
    #[error("Server error on {addr}: {source}")]
    Server {
        /// Address being served
        addr: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No policy file was given and none is configured
    #[error("No policy file: pass --policy or set policy_file in the config")]
    NoPolicy,
}

impl Error {
    /// Process exit code for this error.
    ///
    /// `check` reserves 1 for "denied", so every error exits 2.
    pub fn exit_code(&self) -> u8 {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_core_error() {
        let err: Error = warden_core::Error::validation("rule has no verbs").into();
        assert!(matches!(err, Error::Core(_)));
        assert!(err.to_string().contains("rule has no verbs"));
    }

    #[test]
    fn test_server_error_display() {
        let err = Error::Server {
            addr: "127.0.0.1:1".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        assert_eq!(err.to_string(), "Server error on 127.0.0.1:1: in use");
        assert_eq!(err.exit_code(), 2);
    }
}
