use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, Method, header},
    middleware::Next,
    response::Response,
};
use std::time::Duration;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use crate::auth::API_KEY_HEADER;
use crate::error::ConfigError;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(300);

/// The configured origin as a header value. Wildcards are refused since
/// credentials are allowed.
pub fn origin_value(frontend_origin: &str) -> Result<HeaderValue, ConfigError> {
    if frontend_origin == "*" {
        return Err(ConfigError::WildcardOrigin(frontend_origin.to_string()));
    }
    HeaderValue::from_str(frontend_origin).map_err(|_| ConfigError::InvalidOrigin {
        origin: frontend_origin.to_string(),
    })
}

/// Cross-origin layer for the whole router: one literal origin, credentials
/// allowed, preflights answered here without reaching the pipeline.
pub fn cors_layer(frontend_origin: &str) -> Result<CorsLayer, ConfigError> {
    let origin = origin_value(frontend_origin)?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
        .allow_credentials(true)
        .max_age(PREFLIGHT_MAX_AGE))
}

/// A browser preflight: OPTIONS carrying `Access-Control-Request-Method`.
pub fn is_preflight(req: &Request) -> bool {
    req.method() == Method::OPTIONS
        && req
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}

/// Router without the CORS layer, used for OPTIONS requests that are not
/// preflights. `CorsLayer` would otherwise answer those itself.
#[derive(Clone)]
pub struct PlainOptions {
    pub router: Router,
    pub origin: HeaderValue,
}

pub async fn plain_options_bypass(
    State(plain): State<PlainOptions>,
    req: Request,
    next: Next,
) -> Response {
    if req.method() != Method::OPTIONS || is_preflight(&req) {
        return next.run(req).await;
    }

    let has_origin = req.headers().contains_key(header::ORIGIN);
    let mut response = match plain.router.oneshot(req).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    // same headers CorsLayer puts on an actual request
    if has_origin {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, plain.origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.append(header::VARY, HeaderValue::from_static("origin"));
    }
    response
}
