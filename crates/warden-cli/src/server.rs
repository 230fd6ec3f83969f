//! `serve` subcommand: an echo endpoint behind the gate.
//!
//! Every request that gets through the gate is answered with the subject and
//! action the gate authorized, which makes the server useful for trying out
//! policies with curl.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use axum::routing::get;
use axum::{Json, response::IntoResponse};
use warden_acl::{MemoryPolicyStore, PermissionEvaluator};
use warden_auth::{GateConfig, GateLayer, HeaderSubject, subject_from_parts};
use warden_core::Action;

use crate::error::{Error, Result};

/// Build the application router.
pub fn build_router(store: Arc<MemoryPolicyStore>, gate: GateConfig) -> Router {
    let evaluator = PermissionEvaluator::new(store);
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .fallback(echo)
        .layer(GateLayer::new(evaluator, Arc::new(HeaderSubject), gate))
}

async fn echo(req: Request) -> impl IntoResponse {
    let (parts, _body) = req.into_parts();
    let subject = subject_from_parts(&parts);
    let action = parts.extensions.get::<Action>();
    Json(serde_json::json!({
        "subject": subject,
        "action": action,
        "path": parts.uri.path(),
    }))
}

/// Options for [`run_server`].
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Policy document to serve.
    pub policy: PathBuf,
    /// Address to listen on.
    pub bind: String,
    /// How often to re-read the policy file, if at all.
    pub reload_interval: Option<Duration>,
    /// Gate settings.
    pub gate: GateConfig,
}

/// Serve until Ctrl-C.
pub async fn run_server(options: ServeOptions) -> Result<()> {
    let store = Arc::new(MemoryPolicyStore::load(&options.policy)?);

    if let Some(interval) = options.reload_interval {
        tokio::spawn(reload_periodically(
            Arc::clone(&store),
            options.policy.clone(),
            interval,
        ));
    }

    let app = build_router(store, options.gate);
    let server_error = |source| Error::Server {
        addr: options.bind.clone(),
        source,
    };

    let listener = tokio::net::TcpListener::bind(&options.bind)
        .await
        .map_err(server_error)?;
    tracing::info!(addr = %options.bind, policy = %options.policy.display(), "Warden gate listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .map_err(server_error)
}

/// Re-read the policy file on a fixed interval.
///
/// A file that fails to load leaves the previous snapshot in place.
async fn reload_periodically(store: Arc<MemoryPolicyStore>, policy: PathBuf, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately; the store was just loaded.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        reload_once(&store, &policy);
    }
}

fn reload_once(store: &MemoryPolicyStore, policy: &Path) {
    if let Err(e) = store.reload(policy) {
        tracing::warn!("Policy reload from {} failed: {e}", policy.display());
    }
}
