use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failures of the single outbound call to the resume agent.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream base url is not set")]
    MissingBaseUrl,

    #[error("failed to call upstream: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream returned non-success status: {status}, body: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode upstream response ({status}): {source}")]
    Decode {
        status: StatusCode,
        #[source]
        source: reqwest::Error,
    },
}

impl UpstreamError {
    /// Status reported by the upstream, when it got far enough to send one.
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Status { status, .. } | UpstreamError::Decode { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Everything a request can fail with on its way through the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid request body")]
    InvalidBody,

    #[error("Missing 'query' in request body")]
    MissingQuery,

    #[error("Unauthorized: X-API-Key header missing")]
    MissingApiKey,

    #[error("Forbidden: Invalid API Key")]
    InvalidApiKey,

    #[error("Too Many Requests")]
    RateLimited,

    #[error("Error processing request: {0}")]
    Upstream(#[from] UpstreamError),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::InvalidBody | GatewayError::MissingQuery => StatusCode::BAD_REQUEST,
            GatewayError::MissingApiKey => StatusCode::UNAUTHORIZED,
            GatewayError::InvalidApiKey => StatusCode::FORBIDDEN,
            GatewayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            // the upstream's own status is only logged, we report our own failure
            GatewayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for the rejection metric.
    pub fn reason(&self) -> &'static str {
        match self {
            GatewayError::MethodNotAllowed => "method",
            GatewayError::InvalidBody | GatewayError::MissingQuery => "input",
            GatewayError::MissingApiKey => "missing_key",
            GatewayError::InvalidApiKey => "invalid_key",
            GatewayError::RateLimited => "rate_limit",
            GatewayError::Upstream(_) => "upstream",
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), format!("{}\n", self)).into_response()
    }
}

/// Startup failures, fatal to the process.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("rate limit window must be at least one second")]
    ZeroRateWindow,

    #[error("frontend origin {origin:?} is not a valid header value")]
    InvalidOrigin { origin: String },

    #[error("frontend origin must be a literal origin when credentials are allowed, got {0:?}")]
    WildcardOrigin(String),
}
