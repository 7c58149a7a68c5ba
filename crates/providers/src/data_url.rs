//! Codec for inline `data:<mime>;base64,<payload>` URLs.
//!
//! This is the only image transport the app uses: files are read and encoded
//! on the client before a submission is enabled, and the gateway splits the
//! URL back into a MIME tag and raw payload for transmission.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A decomposed data URL. `data` is still base64 — the wire format wants it
/// that way, so there is no reason to decode in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub data: String,
}

/// Split a `data:<mime>;base64,<payload>` URL. Returns `None` for anything
/// malformed; callers degrade to text-only rather than failing the request.
pub fn parse(url: &str) -> Option<DataUrl> {
    let rest = url.strip_prefix("data:")?;
    let (mime_type, data) = rest.split_once(";base64,")?;
    if mime_type.is_empty() || data.is_empty() {
        return None;
    }
    Some(DataUrl {
        mime_type: mime_type.to_string(),
        data: data.to_string(),
    })
}

/// Encode raw bytes into the same shape `parse` accepts.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}
