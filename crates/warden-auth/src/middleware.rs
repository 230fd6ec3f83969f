//! Tower authorization middleware.
//!
//! `GateLayer` and `GateService` wrap any inner service with an RBAC check.
//! Generic over the policy store and the `SubjectExtractor`, so any
//! authenticator and any store can sit behind it.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::IntoResponse;
use http::Request;
use tower::{Layer, Service};
use warden_acl::{PermissionEvaluator, PolicyStore};
use warden_core::{Action, Subject};

use crate::{GateConfig, GateError, RequestInfoResolver, SubjectExtractor, clean_path};

/// Tower `Layer` that wraps services with an authorization gate.
pub struct GateLayer<S: PolicyStore + ?Sized, E: SubjectExtractor> {
    evaluator: PermissionEvaluator<S>,
    extractor: Arc<E>,
    config: GateConfig,
    resolver: RequestInfoResolver,
}

impl<S: PolicyStore + ?Sized, E: SubjectExtractor> GateLayer<S, E> {
    /// Create a new gate layer.
    pub fn new(evaluator: PermissionEvaluator<S>, extractor: Arc<E>, config: GateConfig) -> Self {
        let resolver = config.request_info_resolver();
        Self {
            evaluator,
            extractor,
            config,
            resolver,
        }
    }
}

impl<S: PolicyStore + ?Sized, E: SubjectExtractor> Clone for GateLayer<S, E> {
    fn clone(&self) -> Self {
        Self {
            evaluator: self.evaluator.clone(),
            extractor: Arc::clone(&self.extractor),
            config: self.config.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

impl<S: PolicyStore + ?Sized, E: SubjectExtractor> fmt::Debug for GateLayer<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateLayer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: PolicyStore + ?Sized, E: SubjectExtractor, I> Layer<I> for GateLayer<S, E> {
    type Service = GateService<S, E, I>;

    fn layer(&self, inner: I) -> Self::Service {
        GateService {
            inner,
            evaluator: self.evaluator.clone(),
            extractor: Arc::clone(&self.extractor),
            config: self.config.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

/// Tower `Service` that authorizes requests before forwarding them.
///
/// On a permitted request, inserts the [`Subject`] and the [`Action`] into
/// request extensions where they're available to downstream handlers.
pub struct GateService<S: PolicyStore + ?Sized, E: SubjectExtractor, I> {
    inner: I,
    evaluator: PermissionEvaluator<S>,
    extractor: Arc<E>,
    config: GateConfig,
    resolver: RequestInfoResolver,
}

impl<S: PolicyStore + ?Sized, E: SubjectExtractor, I: Clone> Clone for GateService<S, E, I> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            evaluator: self.evaluator.clone(),
            extractor: Arc::clone(&self.extractor),
            config: self.config.clone(),
            resolver: self.resolver.clone(),
        }
    }
}

impl<S: PolicyStore + ?Sized, E: SubjectExtractor, I> GateService<S, E, I> {
    /// Decide whether `req` may proceed, recording subject and action on it.
    fn authorize(&self, req: &mut Request<Body>) -> Result<(), GateError> {
        let path = clean_path(req.uri().path());
        if !self.config.protects(&path) {
            return Ok(());
        }

        let subject = self.extractor.extract(req)?;
        let action = match req.extensions().get::<Action>() {
            Some(action) => action.clone(),
            None => self
                .resolver
                .resolve(req.method(), &path, req.uri().query())?,
        };

        if !self.evaluator.evaluate(&subject, &action)? {
            log::warn!("Forbidden: user '{}' {:?}", subject.user, action);
            return Err(GateError::forbidden(&action));
        }

        req.extensions_mut().insert::<Subject>(subject);
        req.extensions_mut().insert::<Action>(action);
        Ok(())
    }
}

impl<S, E, I> Service<Request<Body>> for GateService<S, E, I>
where
    S: PolicyStore + ?Sized + 'static,
    E: SubjectExtractor,
    I: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    I::Response: IntoResponse,
    I::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let outcome = self.authorize(&mut req);

        Box::pin(async move {
            if let Err(err) = outcome {
                if !err.is_client_error() {
                    log::warn!("Authorization failed: {err}");
                }
                return Ok(gate_error_response(&err));
            }

            let resp = inner
                .call(req)
                .await
                .unwrap_or_else(|infallible| match infallible {});
            Ok(resp.into_response())
        })
    }
}

/// Build the response for a request the gate stopped.
///
/// 403 with a `WWW-Authenticate: Forbidden,<message>` header for denials,
/// 500 for everything else.
fn gate_error_response(err: &GateError) -> axum::response::Response {
    let message = err.to_string();
    let category = if err.is_client_error() {
        "authorization"
    } else {
        "internal"
    };
    let body = serde_json::json!({
        "error": {
            "category": category,
            "message": message,
        }
    });

    let mut response = (
        err.status_code(),
        [(http::header::CONTENT_TYPE, "application/json")],
        serde_json::to_string(&body).unwrap_or_default(),
    )
        .into_response();

    if err.is_client_error() {
        if let Ok(value) = http::HeaderValue::from_str(&format!("Forbidden,{message}")) {
            response
                .headers_mut()
                .insert(http::header::WWW_AUTHENTICATE, value);
        }
    }

    response
}
