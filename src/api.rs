//! HTTP routes: the JSON API next to the WebSocket and static UI.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::protocol::GameView;
use crate::state::AppState;
use crate::words::SourceInfo;
use crate::ws;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub words: Vec<String>,
}

/// Generation services the server will ask for candidates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersResponse {
    pub providers: Vec<SourceInfo>,
    /// `false` means every game uses the built-in word list
    pub generation_enabled: bool,
}

/// Full application router.
///
/// `static_dir` holds the UI and is served for every unmatched path.
pub fn router(state: Arc<AppState>, static_dir: &str) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/game", get(get_game))
        .route("/api/history", get(get_history).delete(clear_history))
        .route("/api/providers", get(list_providers))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Current game without secrets.
///
/// GET /api/game
pub async fn get_game(State(state): State<Arc<AppState>>) -> Json<GameView> {
    Json(state.game_view().await)
}

/// GET /api/history
pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        words: state.get_history().await,
    })
}

/// DELETE /api/history
pub async fn clear_history(State(state): State<Arc<AppState>>) -> StatusCode {
    state.clear_history().await;
    StatusCode::NO_CONTENT
}

/// GET /api/providers
pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: state.generator.sources(),
        generation_enabled: state.generator.is_available(),
    })
}
