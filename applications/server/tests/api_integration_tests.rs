/// API integration tests
/// Tests complete HTTP request/response cycles against the router
mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use common::{create_app_without_encoder, create_empty_app, create_test_app, fixtures};
use loopcast_stream::framer::{parse_block, parse_stream_title};
use serde_json::Value;
use tokio_stream::StreamExt;
use tower::util::ServiceExt;

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = get(app, uri).await;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

/// Read at least `len` bytes from an endless response body
async fn read_prefix(response: Response, len: usize) -> Vec<u8> {
    let mut data = response.into_body().into_data_stream();
    let mut out = Vec::new();
    while out.len() < len {
        let chunk = data.next().await.unwrap().unwrap();
        out.extend_from_slice(&chunk);
    }
    out
}

// ============================================================================
// Stream Tests
// ============================================================================

#[tokio::test]
async fn test_stream_with_metadata() {
    let (app, _dir) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stream")
                .header("Icy-MetaData", "1")
                .header(header::HOST, "radio.local:5000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(headers["icy-metaint"], "16000");
    assert_eq!(headers["icy-name"], fixtures::STATION_NAME);
    assert_eq!(headers["icy-genre"], "Various");
    assert_eq!(headers["icy-pub"], "1");
    assert_eq!(headers["icy-br"], "128");
    assert_eq!(headers["icy-url"], "http://radio.local:5000/");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache, no-store");

    // 16000 audio bytes, then a block of at most a few units
    let bytes = read_prefix(response, 16_100).await;
    assert!(bytes[..16_000].iter().all(|&b| b == 0x11));

    let block_len = 1 + bytes[16_000] as usize * 16;
    assert!(bytes.len() >= 16_000 + block_len);
    let text = parse_block(&bytes[16_000..16_000 + block_len]).unwrap();
    assert_eq!(
        parse_stream_title(&text).unwrap(),
        format!("{} - {}", fixtures::FIRST_ARTIST, fixtures::FIRST_TITLE)
    );
}

#[tokio::test]
async fn test_stream_without_metadata() {
    let (app, _dir) = create_test_app();

    let response = get(app, "/stream").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("icy-metaint").is_none());

    let bytes = read_prefix(response, 20_100).await;
    assert!(bytes[..20_000].iter().all(|&b| b == 0x11));
    assert!(bytes[20_000..20_100].iter().all(|&b| b == 0x22));
}

#[tokio::test]
async fn test_stream_empty_catalog_is_unavailable() {
    let response = get(create_empty_app(), "/stream").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_stream_missing_encoder_is_unavailable() {
    let (app, _dir) = create_app_without_encoder();
    let response = get(app, "/stream").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Status / Playlist Tests
// ============================================================================

#[tokio::test]
async fn test_status_playing() {
    let (app, _dir) = create_test_app();
    let (status, json) = get_json(app, "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "playing");
    assert_eq!(json["current_track"]["title"], fixtures::FIRST_TITLE);
    assert_eq!(json["current_track"]["artist"], fixtures::FIRST_ARTIST);
    assert_eq!(json["playlist_size"], 2);
    assert_eq!(json["track_index"], 0);
}

#[tokio::test]
async fn test_status_no_tracks() {
    let (status, json) = get_json(create_empty_app(), "/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "no tracks");
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_playlist() {
    let (app, _dir) = create_test_app();
    let (status, json) = get_json(app, "/playlist").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 2);

    let tracks = json["tracks"].as_array().unwrap();
    assert_eq!(tracks[0]["index"], 0);
    assert_eq!(tracks[0]["filename"], "01_first.mp3");
    assert_eq!(tracks[0]["title"], fixtures::FIRST_TITLE);
    assert_eq!(tracks[0]["artist"], fixtures::FIRST_ARTIST);
    assert_eq!(tracks[1]["filename"], "02_second.mp3");
    assert_eq!(tracks[1]["title"], fixtures::SECOND_TITLE);
    assert!(tracks[1]["artist"].is_null());
}

#[tokio::test]
async fn test_playlist_empty() {
    let (_, json) = get_json(create_empty_app(), "/playlist").await;
    assert_eq!(json["total"], 0);
    assert_eq!(json["tracks"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Misc Endpoints
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _dir) = create_test_app();
    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["tracks"], 2);
}

#[tokio::test]
async fn test_index_page() {
    let response = get(create_empty_app(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains(fixtures::STATION_NAME));
    assert!(html.contains("/stream"));
}

#[tokio::test]
async fn test_unknown_route() {
    let response = get(create_empty_app(), "/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
