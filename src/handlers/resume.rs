use axum::{
    Json,
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::access_log::ClientAddr;
use crate::error::GatewayError;
use crate::metrics::record_rejection;
use crate::models::ResumeQuery;
use crate::state::AppState;

fn reject(client: &ClientAddr, path: &str, err: GatewayError) -> GatewayError {
    tracing::warn!(client = %client, path = %path, error = %err, "Rejected request");
    record_rejection(err.reason());
    err
}

// POST /api/agent/resume
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();
    let client = parts
        .extensions
        .get::<ClientAddr>()
        .cloned()
        .unwrap_or_else(|| ClientAddr("unknown".to_string()));
    let path = parts.uri.path();

    if parts.method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }
    if parts.method != Method::POST {
        return Err(reject(&client, path, GatewayError::MethodNotAllowed));
    }

    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|_| reject(&client, path, GatewayError::InvalidBody))?;
    let payload = ResumeQuery::from_body(&body).map_err(|e| reject(&client, path, e))?;

    tracing::info!(client = %client, query = %payload.query, "Received query");

    let response = state.upstream.forward(&payload.query).await.map_err(|e| {
        tracing::error!(
            client = %client,
            path = %path,
            upstream_status = ?e.upstream_status(),
            error = %e,
            "Error calling resume agent"
        );
        record_rejection("upstream");
        GatewayError::from(e)
    })?;

    tracing::info!(client = %client, "Response sent successfully");
    Ok(Json(response).into_response())
}
