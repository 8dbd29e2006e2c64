//! Core types for image editing.

use crate::error::{EditorError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Image formats recognised by upload and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
    /// GIF format.
    Gif,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
            Self::Gif => "gif",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }

        None
    }
}

/// An image held as base64 text plus its MIME type.
///
/// This is both the uploaded original and the payload the model returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFile {
    /// Base64 payload, without any `data:` prefix.
    pub base64: String,
    /// MIME type, e.g. `image/png`.
    pub mime_type: String,
}

impl ImageFile {
    /// Creates an image from an already-encoded payload.
    pub fn new(base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Encodes raw bytes. When `mime_type` is `None` or not an image type the
    /// format is sniffed from the bytes.
    pub fn from_bytes(data: &[u8], mime_type: Option<&str>) -> Result<Self> {
        let mime_type = match mime_type {
            Some(m) if m.starts_with("image/") => m.to_string(),
            _ => ImageFormat::from_magic_bytes(data)
                .map(|f| f.mime_type().to_string())
                .ok_or_else(|| EditorError::Decode("Unknown image format".into()))?,
        };

        Ok(Self {
            base64: base64::engine::general_purpose::STANDARD.encode(data),
            mime_type,
        })
    }

    /// Decodes the payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        decode_base64_lenient(&self.base64).map_err(|e| EditorError::Decode(e.to_string()))
    }

    /// Returns the format named by the MIME type, if recognised.
    pub fn format(&self) -> Option<ImageFormat> {
        match self.mime_type.as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::WebP),
            "image/gif" => Some(ImageFormat::Gif),
            _ => None,
        }
    }

    /// Returns the image as a data URL using its own MIME type.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }

    /// Returns true if either field is empty.
    pub fn is_empty(&self) -> bool {
        self.base64.is_empty() || self.mime_type.is_empty()
    }
}

/// Decodes base64 that may carry a data URL prefix, whitespace or no padding.
fn decode_base64_lenient(input: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    let b64 = match input.find(";base64,") {
        Some(pos) => &input[pos + 8..],
        None => input,
    };

    let cleaned: String = b64.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    if let Ok(data) = base64::engine::general_purpose::STANDARD.decode(&cleaned) {
        return Ok(data);
    }

    base64::engine::general_purpose::STANDARD_NO_PAD.decode(&cleaned)
}

/// A validated request to edit an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    /// The image to edit.
    pub image: ImageFile,
    /// The edit instruction.
    pub prompt: String,
}

impl EditRequest {
    /// Creates a new edit request.
    pub fn new(image: ImageFile, prompt: impl Into<String>) -> Self {
        Self {
            image,
            prompt: prompt.into(),
        }
    }
}

/// Outcome of one edit: the edited image or a message for the user.
///
/// Serializes as `{"imageData": {...}}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditResult {
    /// The model returned an image.
    ImageData(ImageFile),
    /// The edit failed; the message is shown to the user.
    Error(String),
}

impl EditResult {
    /// Creates an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Returns true for the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::ImageData(_))
    }

    /// Returns the edited image, if any.
    pub fn image(&self) -> Option<&ImageFile> {
        match self {
            Self::ImageData(image) => Some(image),
            Self::Error(_) => None,
        }
    }

    /// Returns the error message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::ImageData(_) => None,
            Self::Error(message) => Some(message),
        }
    }
}
