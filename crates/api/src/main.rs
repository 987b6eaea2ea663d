//! AutoFollow API server.

use std::sync::Arc;

use anthropic_brain::AnthropicBrain;
use api::realtime::{run_relay_listener, ReconnectConfig};
use api::{
    app, AppState, ClerkIdentity, Config, IdentityProvider, LocalIdentity, LogFormat, RealtimeHub,
};
use brain_core::Brain;
use database::Database;
use followup_engine::{EngineConfig, FollowupEngine};
use mock_brain::EchoBrain;
use relay_bridge::{RedisBus, Relay, RelayConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    init_tracing(config.log_format);
    info!(addr = %config.addr, "Starting AutoFollow API");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let brain: Arc<dyn Brain> = if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        Arc::new(AnthropicBrain::from_env()?)
    } else {
        warn!("ANTHROPIC_API_KEY not set, replies will echo the client");
        Arc::new(EchoBrain::new())
    };

    let relay_config = RelayConfig::from_env();
    let relay = Relay::new(Arc::new(RedisBus::connect(&relay_config).await?));

    let hub = Arc::new(RealtimeHub::new());
    let engine = Arc::new(FollowupEngine::new(
        db.clone(),
        brain,
        relay,
        hub.clone(),
        EngineConfig::from_env(),
    ));

    let identity: Arc<dyn IdentityProvider> = match config.clerk.clone() {
        Some(clerk) => Arc::new(ClerkIdentity::new(clerk)?),
        None => {
            warn!("CLERK_SECRET_KEY not set, organisations and users get local ids");
            Arc::new(LocalIdentity)
        }
    };

    let listener_task = tokio::spawn(run_relay_listener(
        engine.clone(),
        ReconnectConfig::default(),
    ));

    let state = AppState::new(engine, hub, identity);
    let router = app(state, config.cors_origins.as_deref());

    info!(addr = %config.addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    listener_task.abort();
    db.close().await;
    info!("AutoFollow API stopped");

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received");
}
