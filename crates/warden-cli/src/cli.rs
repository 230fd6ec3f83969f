//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use warden_core::{Action, ResourceAttributes, Subject};

/// Warden - RBAC authorization decision engine
#[derive(Parser, Debug)]
#[command(name = "warden", version)]
#[command(about = "Check, validate and serve RBAC policies", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "WARDEN_CONFIG")]
    pub config: Option<String>,

    /// Increase log verbosity (overridden by RUST_LOG)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decide whether a subject may perform an action
    Check(CheckArgs),
    /// Load and validate a policy document
    Validate {
        /// Policy document (YAML or JSON)
        #[arg(short, long, env = "WARDEN_POLICY")]
        policy: Option<PathBuf>,
    },
    /// Serve an HTTP endpoint protected by the gate
    Serve(ServeArgs),
    /// Configuration file operations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `warden check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Policy document (YAML or JSON)
    #[arg(short, long, env = "WARDEN_POLICY")]
    pub policy: Option<PathBuf>,

    /// User name of the subject
    #[arg(short, long)]
    pub user: String,

    /// Group the subject belongs to (repeatable)
    #[arg(short, long = "group")]
    pub groups: Vec<String>,

    /// Verb to check (get, list, create, ...)
    #[arg(long)]
    pub verb: String,

    /// Non-resource URL path
    #[arg(long, conflicts_with_all = ["resource", "subresource", "name", "namespace", "api_group"])]
    pub path: Option<String>,

    /// Resource type (pods, deployments, ...)
    #[arg(short, long, required_unless_present = "path")]
    pub resource: Option<String>,

    /// Subresource (status, scale, log, ...)
    #[arg(long)]
    pub subresource: Option<String>,

    /// Object name
    #[arg(long)]
    pub name: Option<String>,

    /// Namespace; omit for cluster-scoped requests
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// API group; omit for the core group
    #[arg(long)]
    pub api_group: Option<String>,

    /// Print which binding and rule granted the request
    #[arg(long)]
    pub explain: bool,
}

impl CheckArgs {
    /// The subject described by the flags.
    pub fn subject(&self) -> Subject {
        Subject::new(&self.user).with_groups(self.groups.iter().cloned())
    }

    /// The action described by the flags.
    pub fn action(&self) -> Action {
        if let Some(path) = &self.path {
            return Action::non_resource(&self.verb, path);
        }

        let mut attrs =
            ResourceAttributes::new(&self.verb, self.resource.clone().unwrap_or_default());
        if let Some(group) = &self.api_group {
            attrs = attrs.api_group(group);
        }
        if let Some(sub) = &self.subresource {
            attrs = attrs.subresource(sub);
        }
        if let Some(name) = &self.name {
            attrs = attrs.name(name);
        }
        if let Some(ns) = &self.namespace {
            attrs = attrs.namespace(ns);
        }
        Action::resource(attrs)
    }
}

/// Arguments for `warden serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Policy document (YAML or JSON)
    #[arg(short, long, env = "WARDEN_POLICY")]
    pub policy: Option<PathBuf>,

    /// Address to listen on (overrides server.bind)
    #[arg(short, long, env = "WARDEN_BIND")]
    pub bind: Option<String>,

    /// Seconds between policy reloads (overrides server.reload_interval_secs)
    #[arg(long)]
    pub reload_interval: Option<u64>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Get a configuration value by dotted key
    Get {
        /// Dotted key, e.g. `server.bind`
        key: String,
    },
    /// Write a default configuration file
    Init {
        /// Where to write it (defaults to the resolved config path)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
