use std::time::Instant;

use crate::error::UpstreamError;
use crate::metrics::{UPSTREAM_ERRORS, UPSTREAM_LATENCY};
use crate::models::{AgentResponse, ResumeQuery};

pub const QUERY_PATH: &str = "/query-resume";

/// Client for the resume agent. One POST per call, no retry, no timeout
/// beyond reqwest's defaults.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn forward(&self, query: &str) -> Result<AgentResponse, UpstreamError> {
        if self.base_url.is_empty() {
            return Err(UpstreamError::MissingBaseUrl);
        }

        let start_time = Instant::now();
        let result = self.send(query).await;
        UPSTREAM_LATENCY.observe(start_time.elapsed().as_secs_f64());

        if result.is_err() {
            UPSTREAM_ERRORS.inc();
        }
        result
    }

    async fn send(&self, query: &str) -> Result<AgentResponse, UpstreamError> {
        let res = self
            .client
            .post(format!("{}{}", self.base_url, QUERY_PATH))
            .json(&ResumeQuery {
                query: query.to_string(),
            })
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = res.status();
        if !status.is_success() {
            // body is diagnostics only, a failed read leaves it empty
            let body = res.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        res.json::<AgentResponse>()
            .await
            .map_err(|source| UpstreamError::Decode { status, source })
    }
}
