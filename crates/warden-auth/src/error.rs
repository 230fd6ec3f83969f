//! Gate-specific error types.

use http::StatusCode;
use warden_core::Action;

/// Errors that can occur while gating a request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GateError {
    /// No authenticated subject or no usable action could be derived from
    /// the request.
    #[error("missing request context: {0}")]
    MissingContext(String),

    /// The evaluator could not reach a decision.
    #[error("authorization evaluation failed: {0}")]
    Evaluation(#[from] warden_acl::Error),

    /// No rule grants the request.
    #[error("{}", forbidden_message(.api_group, .resource, .name))]
    Forbidden {
        /// API group of the request (empty for core or non-resource)
        api_group: String,
        /// Resource of the request (empty for non-resource)
        resource: String,
        /// Object name (empty for collections)
        name: String,
    },
}

impl GateError {
    /// The forbidden error for `action`.
    pub fn forbidden(action: &Action) -> Self {
        match action {
            Action::Resource(attrs) => GateError::Forbidden {
                api_group: attrs.api_group.clone(),
                resource: attrs.resource.clone(),
                name: attrs.name.clone(),
            },
            Action::NonResource(_) => GateError::Forbidden {
                api_group: String::new(),
                resource: String::new(),
                name: String::new(),
            },
        }
    }

    /// Whether this error is the caller's fault (vs. a server fault).
    pub fn is_client_error(&self) -> bool {
        matches!(self, GateError::Forbidden { .. })
    }

    /// HTTP status the gate answers with.
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::FORBIDDEN
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Kubernetes-style forbidden message: `<resource>.<group> "<name>" is forbidden: ...`.
///
/// The name is quoted with escapes, so quotes and control characters in it
/// cannot break the message or the header carrying it.
fn forbidden_message(api_group: &str, resource: &str, name: &str) -> String {
    const REASON: &str = "permission undefined";

    if api_group.is_empty() && resource.is_empty() {
        return format!("forbidden: {REASON}");
    }

    let qualified = if api_group.is_empty() {
        resource.to_string()
    } else {
        format!("{resource}.{api_group}")
    };

    if name.is_empty() {
        format!("{qualified} is forbidden: {REASON}")
    } else {
        format!("{qualified} {name:?} is forbidden: {REASON}")
    }
}
