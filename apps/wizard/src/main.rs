mod api_client;
mod config;
mod errors;
mod fallback;
mod gateway;
mod models;
mod routes;
mod state;
mod templates;
mod wizard;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::api_client::ApiClient;
use crate::config::Config;
use crate::gateway::HttpGateway;
use crate::routes::build_router;
use crate::state::AppState;
use crate::wizard::{spawn_session_sweeper, SessionStore, Wizard, WizardTimings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed numeric vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Wizard v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the analysis gateway client
    let client = ApiClient::new(config.api_url.clone(), config.request_timeout)?;
    info!(
        "Analysis gateway at {} (timeout {:?})",
        client.base_url(),
        config.request_timeout
    );
    let gateway = Arc::new(HttpGateway::new(client));

    let timings = WizardTimings::from(&config);
    info!(
        "Extraction debounce {:?}, fallback delay {:?}",
        timings.extraction_debounce, timings.fallback_delay
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        wizard: Wizard::new(gateway, timings),
        sessions: Arc::new(SessionStore::default()),
    };

    // Drop sessions abandoned by the browser
    spawn_session_sweeper(
        state.sessions.clone(),
        state.wizard.clone(),
        config.session_ttl,
        config.session_sweep_interval,
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
