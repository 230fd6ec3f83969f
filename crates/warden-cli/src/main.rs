//! Warden CLI
//!
//! Command-line interface for RBAC policy checks and the authorization gate.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use warden_cli::cli::{Cli, Command};
use warden_cli::commands::{policy_path, render_decision, run_check, run_validate};
use warden_cli::config_handlers::handle_config_command;
use warden_cli::server::{ServeOptions, run_server};
use warden_cli::WardenConfig;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = match cli.verbose {
        0 => "info,warden=debug",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Check(args) => {
            let outcome = WardenConfig::load(config_path)
                .map_err(warden_cli::Error::from)
                .and_then(|config| policy_path(args.policy.as_deref(), &config))
                .and_then(|policy| run_check(&policy, &args));
            match outcome {
                Ok(decision) => {
                    println!("{}", render_decision(&decision, args.explain));
                    Ok(if decision.is_allowed() {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::from(1)
                    })
                }
                Err(e) => {
                    tracing::error!("Check failed: {e}");
                    eprintln!("error: {e}");
                    Ok(ExitCode::from(e.exit_code()))
                }
            }
        }
        Command::Validate { policy } => {
            let config = WardenConfig::load(config_path)?;
            let policy = policy_path(policy.as_deref(), &config)?;
            let report = run_validate(&policy)?;
            for dangling in &report.dangling {
                tracing::warn!("Dangling role reference: {dangling}");
            }
            println!("{report}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve(args) => {
            let config = WardenConfig::load(config_path)?;
            let policy = policy_path(args.policy.as_deref(), &config)?;
            let reload_secs = args
                .reload_interval
                .unwrap_or(config.server.reload_interval_secs);
            let options = ServeOptions {
                policy,
                bind: args.bind.unwrap_or(config.server.bind),
                reload_interval: (reload_secs > 0).then(|| Duration::from_secs(reload_secs)),
                gate: config.gate,
            };
            run_server(options).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config { action } => {
            handle_config_command(config_path, action)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
