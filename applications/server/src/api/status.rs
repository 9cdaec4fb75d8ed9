/// Now-playing status
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CurrentTrack {
    pub title: String,
    pub artist: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Playing {
        status: &'static str,
        current_track: CurrentTrack,
        playlist_size: usize,
        track_index: usize,
    },
    Empty {
        status: &'static str,
        message: &'static str,
    },
}

/// GET /status
///
/// Reports the track most recently started by any client.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let Some(engine) = state.engine.as_ref() else {
        return Json(StatusResponse::Empty {
            status: "no tracks",
            message: "No audio files in playlist",
        });
    };

    let snapshot = engine.current_status_snapshot();
    Json(StatusResponse::Playing {
        status: "playing",
        current_track: CurrentTrack {
            title: snapshot.track_title,
            artist: snapshot.track_artist,
        },
        playlist_size: snapshot.catalog_size,
        track_index: snapshot.cursor_index,
    })
}
