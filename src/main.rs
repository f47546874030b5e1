use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use undercover::{
    api, config::ServerConfig, history::JsonFileStore, llm, state::AppState,
    words::CandidateGenerator,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "undercover=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Undercover...");

    let config = ServerConfig::from_env();

    // Word generation services; none configured means fallback words only
    let llm_config = llm::LlmConfig::from_env();
    let generator = CandidateGenerator::from_config(&llm_config);
    for source in generator.sources() {
        tracing::info!(
            "Word generation via {} ({})",
            source.name,
            source.model.as_deref().unwrap_or("default model")
        );
    }

    let history_store = Arc::new(JsonFileStore::new(config.history_path.clone()));
    tracing::info!("Word history at {}", history_store.path().display());

    let state = Arc::new(AppState::with_parts(
        generator,
        history_store,
        config.selection,
    ));

    let app = api::router(state, "static");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
