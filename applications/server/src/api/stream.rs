/// ICY audio stream endpoint
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use loopcast_stream::ChannelSink;
use std::convert::Infallible;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};

/// Request header a client sends to ask for interleaved metadata
pub const ICY_METADATA_HEADER: &str = "icy-metadata";

/// GET /stream
///
/// Starts a new session at the shared cursor. The session runs on its own
/// task and feeds the response body through a bounded channel; dropping the
/// body (client gone) ends the session on its next write.
pub async fn stream(State(state): State<AppState>, headers: HeaderMap) -> Result<Response> {
    let engine = state.engine.as_ref().ok_or_else(|| {
        ServerError::Unavailable(
            "No audio files available. Please add audio files to the audio directory.".to_string(),
        )
    })?;

    let requested = client_wants_metadata(&headers);
    let session = engine.open_session(engine.cursor_index(), requested)?;
    let session_id = session.session_id();
    let wants_metadata = session.wants_metadata();
    let settings = engine.settings();

    tracing::info!(
        session = %session_id,
        metadata = wants_metadata,
        "Client connected"
    );

    let (mut sink, rx) = ChannelSink::channel(settings.client_buffer_chunks);
    tokio::spawn(async move {
        match session.run(&mut sink).await {
            Ok(end) => tracing::info!(session = %session_id, "Client session ended: {:?}", end),
            Err(e) => tracing::error!(session = %session_id, "Client session failed: {}", e),
        }
    });

    let body = Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>));

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, settings.output_format.mime_type())
        .header(header::CACHE_CONTROL, "no-cache, no-store")
        .header(header::CONNECTION, "close")
        .header("icy-name", state.station.name.as_str())
        .header("icy-genre", state.station.genre.as_str())
        .header("icy-url", station_url(&state, &headers))
        .header("icy-pub", if state.station.public { "1" } else { "0" })
        .header("icy-br", settings.bitrate_kbps.to_string());

    if wants_metadata {
        response = response.header("icy-metaint", engine.metadata_interval_bytes().to_string());
    }

    response
        .body(body)
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))
}

/// True when the client sent `Icy-MetaData: 1`
fn client_wants_metadata(headers: &HeaderMap) -> bool {
    headers
        .get(ICY_METADATA_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "1")
}

fn station_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(url) = &state.public_url {
        return url.clone();
    }

    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|host| format!("http://{}/", host))
        .unwrap_or_default()
}
