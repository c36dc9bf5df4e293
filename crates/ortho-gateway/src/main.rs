//! ortho-gateway: Orthopedic Clinic WhatsApp Gateway Main Binary
//!
//! Wires the conversation engine to its gateways (WhatsApp Cloud API,
//! patient directory, OpenAI, Zoom / Google Meet) and serves the webhook.

mod server;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ortho_ai::OpenAiClient;
use ortho_core::{
    Config, ConversationEngine, MemorySessionStore, SessionStore, SqliteSessionStore,
};
use ortho_directory::DirectoryClient;
use ortho_meetings::{GoogleMeetClient, MeetingService, ZoomClient};
use ortho_whatsapp::CloudApiClient;

use crate::server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse()?)
        )
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration (TOML file when present, environment otherwise)
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting ortho-gateway...");
    tracing::info!("AI model: {}", config.ai.model);

    let messaging = CloudApiClient::new(
        config.whatsapp.token.clone(),
        config.whatsapp.phone_id.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create WhatsApp client: {}", e))?;

    let directory = DirectoryClient::new(
        config.directory.base_url.clone(),
        config.directory.api_key.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create directory client: {}", e))?;

    let ai = OpenAiClient::new(config.ai.api_key.clone(), config.ai.model.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create AI client: {}", e))?;

    let zoom = ZoomClient::new(
        config.zoom.account_id.clone(),
        config.zoom.client_id.clone(),
        config.zoom.client_secret.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create Zoom client: {}", e))?;

    let meet = GoogleMeetClient::new(
        config.google.client_id.clone(),
        config.google.client_secret.clone(),
        config.google.refresh_token.clone(),
        config.google.calendar_id.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create Google Meet client: {}", e))?;

    let meetings = MeetingService::new(zoom, meet);

    // Sessions persist across restarts when a database path is configured
    let store: Arc<dyn SessionStore> = match &config.session.db_path {
        Some(path) => {
            tracing::info!("Using SQLite session store at {}", path);
            Arc::new(
                SqliteSessionStore::new(path)
                    .map_err(|e| anyhow::anyhow!("Failed to open session store: {}", e))?,
            )
        }
        None => {
            tracing::info!("Using in-memory session store");
            Arc::new(MemorySessionStore::new())
        }
    };

    let engine = ConversationEngine::new(
        store,
        Arc::new(messaging),
        Arc::new(directory),
        Arc::new(meetings),
        Arc::new(ai),
    );

    let state = AppState {
        engine: Arc::new(engine),
        verify_token: config.whatsapp.verify_token.clone(),
    };

    let port = config.server.port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(port, state).await {
            tracing::error!("Webhook server error: {}", e);
        }
    });

    tracing::info!("ortho-gateway initialized successfully");
    tracing::info!("Press Ctrl+C to exit");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    server_handle.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
