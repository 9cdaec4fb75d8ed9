/// HTML landing page
use crate::state::AppState;
use axum::{extract::State, response::Html};

/// GET /
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let name = escape_html(&state.station.name);
    let mime = state
        .engine
        .as_ref()
        .map_or("audio/mpeg", |e| e.settings().output_format.mime_type());

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>{name}</title></head>
<body>
    <h1>{name}</h1>
    <h2>Endpoints</h2>
    <ul>
        <li><a href="/stream">/stream</a> - Main audio stream (ICY protocol)</li>
        <li><a href="/status">/status</a> - Current track status (JSON)</li>
        <li><a href="/playlist">/playlist</a> - Playlist (JSON)</li>
        <li><a href="/health">/health</a> - Health check (JSON)</li>
    </ul>
    <h2>How to listen</h2>
    <p>Open the stream URL in a media player such as VLC or mpv.</p>
    <audio controls>
        <source src="/stream" type="{mime}">
        Your browser does not support the audio element.
    </audio>
</body>
</html>
"#
    ))
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
