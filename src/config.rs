use clap::Parser;
use std::time::Duration;

use crate::error::ConfigError;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "resume-gateway")]
#[command(about = "API gateway in front of the resume agent")]
pub struct Args {
    // Shared secret expected in X-API-Key (empty disables the check)
    #[arg(long, env = "API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    // The one browser origin allowed to call us
    #[arg(long, env = "FRONTEND_ORIGIN", default_value = "http://localhost:5173")]
    pub frontend_origin: String,

    // Base url of the resume agent
    #[arg(short, long, env = "RESUME_AGENT_URL", default_value = "http://localhost:8000")]
    pub upstream_url: String,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Rate limit max requests per window (global, not per client)
    #[arg(long, env = "RATE_LIMIT_MAX", default_value_t = 8)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value_t = 60)]
    pub rate_window: u64,

    // tracing filter directive
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Process-lifetime configuration. Built once in `main`, read-only afterwards.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub frontend_origin: String,
    pub upstream_url: String,
    pub port: u16,
    pub rate_limit: u32,
    pub rate_window: Duration,
}

impl Args {
    pub fn into_config(self) -> Result<GatewayConfig, ConfigError> {
        if self.rate_window == 0 {
            return Err(ConfigError::ZeroRateWindow);
        }

        Ok(GatewayConfig {
            api_key: self.api_key,
            frontend_origin: self.frontend_origin.trim().to_string(),
            upstream_url: self.upstream_url.trim().trim_end_matches('/').to_string(),
            port: self.port,
            rate_limit: self.rate_limit,
            rate_window: Duration::from_secs(self.rate_window),
        })
    }
}

impl GatewayConfig {
    pub fn auth_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            frontend_origin: "http://localhost:5173".to_string(),
            upstream_url: "http://localhost:8000".to_string(),
            port: 8080,
            rate_limit: 8,
            rate_window: Duration::from_secs(60),
        }
    }
}
