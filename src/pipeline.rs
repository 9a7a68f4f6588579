//! Ordered request interceptors in front of the resume route.
//!
//! Each interceptor either answers the request itself or hands it to the
//! rest of the [`Chain`]. The standard order is access log, API key check,
//! global rate limit, then the route handler. The whole router sits behind
//! the CORS layer, so browser preflights never get this far.

use axum::{
    Router,
    body::HttpBody,
    extract::{ConnectInfo, Request, State},
    http::header,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use crate::access_log::{ClientAddr, RequestTrace, client_addr};
use crate::auth::{AuthResult, Authenticator};
use crate::cors::{PlainOptions, cors_layer, origin_value, plain_options_bypass};
use crate::error::{ConfigError, GatewayError};
use crate::handlers::{health_handler, metrics_handler, resume_handler};
use crate::metrics::{REQUEST_TOTAL, record_rejection};
use crate::rate_limit::RateLimiter;
use crate::state::AppState;

pub const RESUME_ROUTE: &str = "/api/agent/resume";

pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = Response> + Send + 'a>>;

pub trait Interceptor: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Answer the request, or pass it on with `chain.proceed(req)`.
    fn intercept<'a>(&'a self, req: Request, chain: Chain<'a>) -> BoxFuture<'a>;
}

/// The interceptors still to run, followed by the route handler.
pub struct Chain<'a> {
    remaining: &'a [Arc<dyn Interceptor>],
    handler: Next,
}

impl<'a> Chain<'a> {
    pub fn proceed(self, req: Request) -> BoxFuture<'a> {
        match self.remaining.split_first() {
            Some((next, rest)) => {
                tracing::trace!(interceptor = next.name(), "Entering interceptor");
                next.intercept(
                    req,
                    Chain {
                        remaining: rest,
                        handler: self.handler,
                    },
                )
            }
            None => Box::pin(self.handler.run(req)),
        }
    }
}

pub struct Pipeline {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Pipeline {
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self { interceptors }
    }

    /// Logger → Authenticator → Rate Limiter.
    pub fn standard(state: &AppState) -> Self {
        let interceptors: Vec<Arc<dyn Interceptor>> = vec![
            Arc::new(AccessLogger) as Arc<dyn Interceptor>,
            state.authenticator.clone() as Arc<dyn Interceptor>,
            state.rate_limiter.clone() as Arc<dyn Interceptor>,
        ];
        Self::new(interceptors)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub async fn run(&self, req: Request, handler: Next) -> Response {
        Chain {
            remaining: &self.interceptors,
            handler,
        }
        .proceed(req)
        .await
    }
}

async fn pipeline_middleware(
    State(pipeline): State<Arc<Pipeline>>,
    req: Request,
    next: Next,
) -> Response {
    pipeline.run(req, next).await
}

fn reject<'a>(err: GatewayError) -> BoxFuture<'a> {
    record_rejection(err.reason());
    Box::pin(std::future::ready(err.into_response()))
}

fn client_of(req: &Request) -> ClientAddr {
    req.extensions()
        .get::<ClientAddr>()
        .cloned()
        .unwrap_or_else(|| ClientAddr("unknown".to_string()))
}

// Every response built here is fully buffered, so the body's size hint is
// exact. Content-Length covers anything that was streamed with a declared size.
fn response_size(response: &Response) -> u64 {
    response.body().size_hint().exact().unwrap_or_else(|| {
        response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    })
}

// Logs entry and completion, with the status and size actually produced downstream
pub struct AccessLogger;

impl Interceptor for AccessLogger {
    fn name(&self) -> &'static str {
        "access_log"
    }

    fn intercept<'a>(&'a self, mut req: Request, chain: Chain<'a>) -> BoxFuture<'a> {
        Box::pin(async move {
            let start_time = Instant::now();
            REQUEST_TOTAL.inc();

            let remote = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr);
            let client = client_addr(req.headers(), remote);
            let method = req.method().to_string();
            let path = req.uri().path().to_string();

            tracing::info!(method = %method, path = %path, client = %client, "Incoming request");
            req.extensions_mut().insert(client.clone());

            let response = chain.proceed(req).await;

            RequestTrace {
                method,
                path,
                client,
                status: response.status().as_u16(),
                bytes: response_size(&response),
                duration: start_time.elapsed(),
            }
            .log();

            response
        })
    }
}

impl Interceptor for Authenticator {
    fn name(&self) -> &'static str {
        "api_key"
    }

    fn intercept<'a>(&'a self, req: Request, chain: Chain<'a>) -> BoxFuture<'a> {
        match self.authorize(req.method(), req.headers()) {
            AuthResult::Allowed => chain.proceed(req),
            AuthResult::Skipped => {
                tracing::debug!(client = %client_of(&req), "API key validation is skipped");
                chain.proceed(req)
            }
            AuthResult::MissingKey => {
                tracing::warn!(
                    client = %client_of(&req),
                    path = %req.uri().path(),
                    "Unauthorized access attempt: X-API-Key header missing"
                );
                reject(GatewayError::MissingApiKey)
            }
            AuthResult::InvalidKey => {
                tracing::warn!(
                    client = %client_of(&req),
                    path = %req.uri().path(),
                    "Forbidden access attempt: invalid API key"
                );
                reject(GatewayError::InvalidApiKey)
            }
        }
    }
}

impl Interceptor for RateLimiter {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn intercept<'a>(&'a self, req: Request, chain: Chain<'a>) -> BoxFuture<'a> {
        // the lock is released before anything downstream runs
        if self.admit() {
            chain.proceed(req)
        } else {
            tracing::warn!(
                client = %client_of(&req),
                path = %req.uri().path(),
                max_requests = self.max_requests(),
                window_secs = self.period().as_secs(),
                "Global rate limit exceeded"
            );
            reject(GatewayError::RateLimited)
        }
    }
}

/// `/api` routes behind the pipeline, plus the operational endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    let pipeline = Arc::new(Pipeline::standard(&state));

    let api = Router::new()
        .route(RESUME_ROUTE, any(resume_handler))
        .route_layer(middleware::from_fn_with_state(pipeline, pipeline_middleware))
        .with_state(state);

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .merge(api)
}

/// The full application: router wrapped in the cross-origin policy.
/// Preflights stop at the CORS layer, any other OPTIONS goes through the pipeline.
pub fn app(state: Arc<AppState>) -> Result<Router, ConfigError> {
    let cors = cors_layer(&state.config.frontend_origin)?;
    let router = build_router(state.clone());
    let plain = PlainOptions {
        router: router.clone(),
        origin: origin_value(&state.config.frontend_origin)?,
    };

    Ok(router
        .layer(cors)
        .layer(middleware::from_fn_with_state(plain, plain_options_bypass)))
}
