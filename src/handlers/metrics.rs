use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub async fn metrics_handler() -> Response {
    match crate::metrics::render() {
        Ok(text) => text.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}
