//! API gateway in front of the resume agent.
//!
//! Inbound `POST /api/agent/resume` requests go through access logging,
//! API-key authentication and a global fixed-window rate limit before being
//! forwarded to the agent's `/query-resume` endpoint. The agent's JSON answer
//! is relayed back unchanged.

pub mod access_log;
pub mod auth;
pub mod config;
pub mod cors;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod rate_limit;
pub mod state;
pub mod upstream;

pub use config::{Args, GatewayConfig};
pub use error::{ConfigError, GatewayError, UpstreamError};
pub use pipeline::{app, build_router};
pub use state::AppState;
