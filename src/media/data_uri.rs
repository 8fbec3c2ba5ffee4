/// `data:<mime>;base64,<payload>` encoding for image payloads

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Split a base64 data URI into its MIME type and decoded bytes.
/// Returns `None` for anything else (plain URLs, non-base64 URIs, bad payloads).
pub fn decode(uri: &str) -> Option<(String, Vec<u8>)> {
    let rest = uri.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    Some((mime.to_string(), bytes))
}
