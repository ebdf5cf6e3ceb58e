//! Embedding binary assets in SVG.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Media type from the leading bytes.
pub fn sniff_mime(data: &[u8]) -> Option<&'static str> {
    match data {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => {
            let head = String::from_utf8_lossy(&data[..data.len().min(512)]);
            if head.contains("<svg") { Some("image/svg+xml") } else { None }
        }
    }
}

pub fn data_uri(data: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}
