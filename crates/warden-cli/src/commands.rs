//! `check` and `validate` subcommands.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use warden_acl::{Decision, MemoryPolicyStore, PermissionEvaluator};
use warden_core::PolicyDocument;

use crate::cli::CheckArgs;
use crate::config::WardenConfig;
use crate::error::{Error, Result};

/// Pick the policy file: the flag wins over the config.
pub fn policy_path(flag: Option<&Path>, config: &WardenConfig) -> Result<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.policy_file.clone())
        .ok_or(Error::NoPolicy)
}

/// Evaluate the request described by `args` against `policy`.
pub fn run_check(policy: &Path, args: &CheckArgs) -> Result<Decision> {
    let store = MemoryPolicyStore::load(policy)?;
    let evaluator = PermissionEvaluator::new(Arc::new(store));
    Ok(evaluator.decide(&args.subject(), &args.action())?)
}

/// One-line rendering of a check result.
pub fn render_decision(decision: &Decision, explain: bool) -> String {
    match (decision, explain) {
        (Decision::Allowed(grant), true) => format!("allowed ({grant})"),
        (Decision::Allowed(_), false) => "allowed".to_string(),
        (Decision::NoGrant, true) => "denied (no rule grants the request)".to_string(),
        (Decision::NoGrant, false) => "denied".to_string(),
    }
}

/// Summary of a validated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Number of cluster roles.
    pub cluster_roles: usize,
    /// Number of cluster role bindings.
    pub cluster_role_bindings: usize,
    /// Number of namespaced roles.
    pub roles: usize,
    /// Number of namespaced role bindings.
    pub role_bindings: usize,
    /// Bindings whose role does not exist, as `binding -> role` lines.
    pub dangling: Vec<String>,
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ok: {} cluster roles, {} cluster role bindings, {} roles, {} role bindings",
            self.cluster_roles, self.cluster_role_bindings, self.roles, self.role_bindings
        )
    }
}

/// Load and validate a policy document.
///
/// Structural problems are errors. Bindings to missing roles are reported
/// but allowed, since they only fail when evaluation reaches them.
pub fn run_validate(policy: &Path) -> Result<ValidationReport> {
    let doc = PolicyDocument::load(policy)?;

    let cluster_roles: HashSet<&str> = doc.cluster_roles.iter().map(|r| r.name.as_str()).collect();
    let roles: HashSet<(&str, &str)> = doc
        .roles
        .iter()
        .map(|r| (r.namespace.as_str(), r.name.as_str()))
        .collect();

    let mut dangling: Vec<String> = doc
        .cluster_role_bindings
        .iter()
        .filter(|b| !cluster_roles.contains(b.role_ref.as_str()))
        .map(|b| format!("clusterrolebinding '{}' -> clusterrole '{}'", b.name, b.role_ref))
        .collect();
    dangling.extend(
        doc.role_bindings
            .iter()
            .filter(|b| !roles.contains(&(b.namespace.as_str(), b.role_ref.as_str())))
            .map(|b| {
                format!(
                    "rolebinding '{ns}/{}' -> role '{ns}/{}'",
                    b.name,
                    b.role_ref,
                    ns = b.namespace
                )
            }),
    );

    Ok(ValidationReport {
        cluster_roles: doc.cluster_roles.len(),
        cluster_role_bindings: doc.cluster_role_bindings.len(),
        roles: doc.roles.len(),
        role_bindings: doc.role_bindings.len(),
        dangling,
    })
}
