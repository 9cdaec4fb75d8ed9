/// Catalog listing
use crate::state::AppState;
use axum::{extract::State, Json};
use loopcast_stream::PlaylistEntry;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub tracks: Vec<PlaylistEntry>,
    pub total: usize,
}

/// GET /playlist
pub async fn playlist(State(state): State<AppState>) -> Json<PlaylistResponse> {
    let tracks = state
        .engine
        .as_ref()
        .map(|engine| engine.playlist())
        .unwrap_or_default();

    Json(PlaylistResponse {
        total: tracks.len(),
        tracks,
    })
}
