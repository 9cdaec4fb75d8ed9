//! ICY metadata block framing
//!
//! A block is one length byte (in units of 16 bytes) followed by
//! `StreamTitle='...';` padded with zero bytes to `length * 16`. A lone zero
//! byte means "nothing new".

use bytes::Bytes;

/// Size unit of the length byte
pub const METADATA_BLOCK_UNIT: usize = 16;

/// Largest payload a single length byte can describe
pub const MAX_METADATA_PAYLOAD: usize = 255 * METADATA_BLOCK_UNIT;

/// "No metadata change" block
pub const EMPTY_BLOCK: &[u8] = &[0];

const PREFIX: &[u8] = b"StreamTitle='";
const SUFFIX: &[u8] = b"';";

/// `"Artist - Title"`, or whichever of the two is present
pub fn display_string(title: &str, artist: Option<&str>) -> String {
    let title = title.trim();
    let artist = artist.map(str::trim).filter(|a| !a.is_empty());

    match (artist, title.is_empty()) {
        (Some(artist), false) => format!("{} - {}", artist, title),
        (Some(artist), true) => artist.to_string(),
        (None, _) => title.to_string(),
    }
}

/// Frame a title/artist pair as an ICY metadata block
pub fn frame(title: &str, artist: Option<&str>) -> Bytes {
    frame_display(&display_string(title, artist))
}

/// Frame an already composed display string
pub fn frame_display(display: &str) -> Bytes {
    if display.is_empty() {
        return Bytes::from_static(EMPTY_BLOCK);
    }

    let budget = MAX_METADATA_PAYLOAD - PREFIX.len() - SUFFIX.len();
    let capacity = (PREFIX.len() + display.len() + SUFFIX.len()).min(MAX_METADATA_PAYLOAD);
    let mut payload = Vec::with_capacity(capacity);
    payload.extend_from_slice(PREFIX);

    let mut used = 0;
    for ch in display.chars() {
        let byte = latin1_byte(ch);
        let escaped = matches!(byte, b'\'' | b'\\');
        let width = if escaped { 2 } else { 1 };
        if used + width > budget {
            break;
        }
        if escaped {
            payload.push(b'\\');
        }
        payload.push(byte);
        used += width;
    }
    payload.extend_from_slice(SUFFIX);

    let padded = payload.len().div_ceil(METADATA_BLOCK_UNIT) * METADATA_BLOCK_UNIT;
    let mut block = Vec::with_capacity(1 + padded);
    block.push((padded / METADATA_BLOCK_UNIT) as u8);
    block.extend_from_slice(&payload);
    block.resize(1 + padded, 0);

    Bytes::from(block)
}

/// One byte per character: control characters become spaces, anything
/// outside Latin-1 becomes `?`
fn latin1_byte(ch: char) -> u8 {
    match ch as u32 {
        0x00..=0x1f | 0x7f..=0x9f => b' ',
        code @ 0x20..=0xff => code as u8,
        _ => b'?',
    }
}

/// Decode a block back to its text (length byte × 16, trailing zeros stripped)
///
/// Returns `None` when the buffer is shorter than the length byte announces.
pub fn parse_block(block: &[u8]) -> Option<String> {
    let (&length, rest) = block.split_first()?;
    let size = length as usize * METADATA_BLOCK_UNIT;
    let payload = rest.get(..size)?;

    let end = payload.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    Some(payload[..end].iter().map(|&b| b as char).collect())
}

/// Extract and unescape the `StreamTitle` value from decoded block text
pub fn parse_stream_title(text: &str) -> Option<String> {
    let body = text.strip_prefix("StreamTitle='")?.strip_suffix("';")?;

    let mut title = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            title.push(chars.next()?);
        } else {
            title.push(ch);
        }
    }
    Some(title)
}
