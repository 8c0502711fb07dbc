//! Image bytes to transport-safe text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

use crate::error::{PokedexError, Result};

/// Encode raw image bytes as standard, padded base64.
///
/// No resizing, recompression or re-encoding happens here.
pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Read an image file and return its base64 encoding.
pub fn read_image_base64(path: &Path) -> Result<String> {
    let bytes = read_image(path)?;
    Ok(encode_image(&bytes))
}

/// Read an image file into memory.
pub fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| PokedexError::ImageRead(format!("{}: {}", path.display(), e)))
}

/// Guess the MIME type of an image from its magic bytes.
///
/// Falls back to `image/jpeg`, which is what camera captures almost
/// always are.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

/// Build a `data:` URL for an already-encoded image.
pub fn data_url(mime: &str, encoded: &str) -> String {
    format!("data:{};base64,{}", mime, encoded)
}
