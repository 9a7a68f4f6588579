use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use resume_gateway::{AppState, Args, app};

// this is main async function with tokio
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env has to be loaded before clap reads the environment
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::new(args.log_level.clone()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if dotenv.is_err() {
        tracing::info!("No .env file found, using process environment");
    }

    let config = args.into_config()?;
    if !config.auth_enabled() {
        tracing::warn!("API_KEY not set, API key validation will be skipped");
    }

    tracing::info!(
        frontend_origin = %config.frontend_origin,
        upstream_url = %config.upstream_url,
        port = config.port,
        "Configuration loaded"
    );
    tracing::info!(
        "Rate limit: {} requests per {} seconds",
        config.rate_limit,
        config.rate_window.as_secs()
    );

    let port = config.port;
    let state = Arc::new(AppState::new(config, reqwest::Client::new()));
    let router = app(state)?;

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Gateway listening on {}", addr);
    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
