//! Subject extractors and extraction helpers.

use axum::body::Body;
use http::{HeaderMap, Request};
use warden_core::Subject;

use crate::{GateError, SubjectExtractor};

/// Header carrying the authenticated user name.
pub const REMOTE_USER_HEADER: &str = "x-remote-user";
/// Header carrying group memberships. May repeat and may hold a
/// comma-separated list.
pub const REMOTE_GROUP_HEADER: &str = "x-remote-group";

/// Reads the [`Subject`] an upstream authenticator stored in the request
/// extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionSubject;

impl SubjectExtractor for ExtensionSubject {
    fn extract(&self, req: &Request<Body>) -> Result<Subject, GateError> {
        req.extensions()
            .get::<Subject>()
            .cloned()
            .ok_or_else(|| GateError::MissingContext("no authenticated subject".to_string()))
    }
}

/// Reads the subject from authenticating-proxy headers
/// (`X-Remote-User`, `X-Remote-Group`).
///
/// A [`Subject`] already present in the extensions wins over the headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSubject;

impl SubjectExtractor for HeaderSubject {
    fn extract(&self, req: &Request<Body>) -> Result<Subject, GateError> {
        if let Some(subject) = req.extensions().get::<Subject>() {
            return Ok(subject.clone());
        }
        subject_from_headers(req.headers())
    }
}

fn subject_from_headers(headers: &HeaderMap) -> Result<Subject, GateError> {
    let user = headers
        .get(REMOTE_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            GateError::MissingContext(format!("missing or empty {REMOTE_USER_HEADER} header"))
        })?;

    let groups = headers
        .get_all(REMOTE_GROUP_HEADER)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|g| !g.is_empty());

    Ok(Subject::new(user).with_groups(groups))
}

/// Extract the [`Subject`] from HTTP request `Parts`, if present.
///
/// The gate stores the subject it authorized, so handlers behind it can
/// call this.
pub fn subject_from_parts(parts: &http::request::Parts) -> Option<&Subject> {
    parts.extensions.get::<Subject>()
}
