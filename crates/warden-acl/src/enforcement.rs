//! Permission evaluation.
//!
//! Evaluation is a short-circuiting OR over two ordered rule sources:
//!
//! 1. rules of cluster roles bound to the subject;
//! 2. for namespaced resource requests only, rules of roles bound to the
//!    subject in that namespace.
//!
//! The first matching rule grants the request. Nothing ever denies: if no
//! rule matches, the outcome is [`Decision::NoGrant`]. Store failures abort
//! evaluation and are returned as errors, never folded into "not permitted".

use std::fmt;
use std::sync::Arc;

use warden_core::{Action, Subject};

use crate::error::Result;
use crate::policy::rule_matches_request;
use crate::resolver::{BindingResolver, ResolvedRole, Scope};
use crate::store::PolicyStore;

/// The rule that granted a request and how the subject reached it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Scope the granting role applies in.
    pub scope: Scope,
    /// Binding that attached the role to the subject.
    pub binding: String,
    /// The granting role.
    pub role: String,
    /// Position of the matching rule within the role.
    pub rule_index: usize,
}

impl fmt::Display for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} binding '{}' -> role '{}' rule #{}",
            self.scope, self.binding, self.role, self.rule_index
        )
    }
}

/// Outcome of a successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// A rule grants the request.
    Allowed(Grant),
    /// No rule in any applicable scope grants the request.
    NoGrant,
}

impl Decision {
    /// Whether the request is permitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed(_))
    }

    /// The granting rule, if any.
    pub fn grant(&self) -> Option<&Grant> {
        match self {
            Decision::Allowed(grant) => Some(grant),
            Decision::NoGrant => None,
        }
    }
}

/// Decides whether a subject may perform an action.
///
/// Holds no mutable state; clones share the store and can be used from any
/// number of tasks concurrently.
pub struct PermissionEvaluator<S: PolicyStore + ?Sized> {
    store: Arc<S>,
}

impl<S: PolicyStore + ?Sized> PermissionEvaluator<S> {
    /// Create an evaluator reading from `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Whether `subject` may perform `action`.
    ///
    /// `Ok(false)` means no grant was found; `Err` means the answer could
    /// not be determined.
    pub fn evaluate(&self, subject: &Subject, action: &Action) -> Result<bool> {
        self.decide(subject, action).map(|decision| decision.is_allowed())
    }

    /// Like [`evaluate`](Self::evaluate), but reports which rule granted
    /// the request.
    pub fn decide(&self, subject: &Subject, action: &Action) -> Result<Decision> {
        let resolver = BindingResolver::new(self.store.as_ref());

        if let Some(grant) = first_grant(resolver.cluster_roles(subject)?, action)? {
            log::debug!("Allowed user '{}' {}: {grant}", subject.user, describe(action));
            return Ok(Decision::Allowed(grant));
        }

        if let Some(namespace) = action.namespace() {
            let roles = resolver.namespace_roles(subject, namespace)?;
            if let Some(grant) = first_grant(roles, action)? {
                log::debug!("Allowed user '{}' {}: {grant}", subject.user, describe(action));
                return Ok(Decision::Allowed(grant));
            }
        }

        log::debug!("No grant for user '{}' {}", subject.user, describe(action));
        Ok(Decision::NoGrant)
    }
}

impl<S: PolicyStore + ?Sized> Clone for PermissionEvaluator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: PolicyStore + ?Sized> fmt::Debug for PermissionEvaluator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionEvaluator").finish_non_exhaustive()
    }
}

/// First rule, across the given roles in order, that grants `action`.
fn first_grant<I>(roles: I, action: &Action) -> Result<Option<Grant>>
where
    I: Iterator<Item = Result<ResolvedRole>>,
{
    for resolved in roles {
        let resolved = resolved?;
        let matched = resolved
            .rules()
            .iter()
            .position(|rule| rule_matches_request(rule, action));

        if let Some(rule_index) = matched {
            return Ok(Some(Grant {
                scope: resolved.scope(),
                binding: resolved.binding_name().to_string(),
                role: resolved.role_name().to_string(),
                rule_index,
            }));
        }
    }
    Ok(None)
}

fn describe(action: &Action) -> String {
    match action {
        Action::Resource(attrs) => {
            let mut out = format!("{} {}", attrs.verb, attrs.combined_resource());
            if !attrs.api_group.is_empty() {
                out.push_str(&format!(".{}", attrs.api_group));
            }
            if !attrs.name.is_empty() {
                out.push_str(&format!(" '{}'", attrs.name));
            }
            if !attrs.namespace.is_empty() {
                out.push_str(&format!(" in namespace '{}'", attrs.namespace));
            }
            out
        }
        Action::NonResource(attrs) => format!("{} {}", attrs.verb, attrs.path),
    }
}
