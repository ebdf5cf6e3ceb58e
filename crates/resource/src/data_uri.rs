use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use vellum_traits::ResourceError;

/// A decoded `data:` URI.
#[derive(Debug, Clone, PartialEq)]
pub struct DataUri {
    pub mime: String,
    pub data: Vec<u8>,
}

/// Decodes `data:[<mime>][;param=value]*[;base64],<payload>`.
///
/// The mime type defaults to `text/plain`. Non-base64 payloads are
/// percent-decoded.
pub fn decode_data_uri(uri: &str) -> Result<DataUri, ResourceError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ResourceError::InvalidReference(truncate(uri)))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ResourceError::InvalidReference(truncate(uri)))?;

    let mut params = header.split(';');
    let mime = match params.next().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_ascii_lowercase(),
        _ => "text/plain".to_string(),
    };
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let data = if is_base64 {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let compact = percent_decode(compact.as_bytes());
        STANDARD
            .decode(&compact)
            .map_err(|e| ResourceError::LoadFailed {
                path: truncate(uri),
                message: e.to_string(),
            })?
    } else {
        percent_decode(payload.as_bytes())
    };

    Ok(DataUri { mime, data })
}

fn percent_decode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'%' && i + 2 < input.len() {
            let hi = (input[i + 1] as char).to_digit(16);
            let lo = (input[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(input[i]);
        i += 1;
    }
    out
}

fn truncate(uri: &str) -> String {
    uri.chars().take(48).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_png_header() {
        let uri = decode_data_uri("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(uri.mime, "image/png");
        assert_eq!(&uri.data[1..4], b"PNG");
    }

    #[test]
    fn decodes_percent_encoded_svg() {
        let uri = decode_data_uri("data:image/svg+xml;utf8,%3Csvg%3E%3C/svg%3E").unwrap();
        assert_eq!(uri.mime, "image/svg+xml");
        assert_eq!(uri.data, b"<svg></svg>");
    }

    #[test]
    fn missing_mime_defaults_to_text() {
        let uri = decode_data_uri("data:,hello").unwrap();
        assert_eq!(uri.mime, "text/plain");
        assert_eq!(uri.data, b"hello");
    }

    #[test]
    fn malformed_uris_fail() {
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:image/png;base64,@@@").is_err());
        assert!(decode_data_uri("image/png,abc").is_err());
    }
}
