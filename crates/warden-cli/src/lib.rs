//! # warden-cli
//!
//! Command-line interface for the Warden authorization engine.
//!
//! This crate provides:
//! - `warden check`: evaluate one request against a policy document
//! - `warden validate`: load a policy document and report problems
//! - `warden serve`: an HTTP echo endpoint protected by the gate
//! - `warden config`: inspect and create the TOML configuration file

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_handlers;
pub mod error;
pub mod server;

pub use config::WardenConfig;
pub use error::{Error, Result};
