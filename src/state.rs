use std::sync::Arc;

use crate::auth::Authenticator;
use crate::config::GatewayConfig;
use crate::rate_limit::RateLimiter;
use crate::upstream::UpstreamClient;

// app's shared state, built once and handed out behind an Arc
pub struct AppState {
    pub config: GatewayConfig,
    pub upstream: UpstreamClient,
    pub authenticator: Arc<Authenticator>,
    pub rate_limiter: Arc<RateLimiter>, // the only mutable part, locked internally
}

impl AppState {
    pub fn new(config: GatewayConfig, client: reqwest::Client) -> Self {
        Self {
            upstream: UpstreamClient::new(client, config.upstream_url.clone()),
            authenticator: Arc::new(Authenticator::new(&config.api_key)),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit, config.rate_window)),
            config,
        }
    }
}
