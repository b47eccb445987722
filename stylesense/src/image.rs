//! Uploaded-image handling.
//!
//! An [`OutfitImage`] holds the raw upload bytes for the duration of one
//! request. Validation happens at construction: only JPEG and PNG uploads
//! are accepted, checked against both the file extension and the file
//! signature, before any pipeline stage runs.

use crate::error::ImageError;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG format (default).
    #[default]
    Jpeg,
    /// PNG format.
    Png,
}

impl ImageFormat {
    /// Get the MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Get the canonical file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Detect format from a file extension.
    ///
    /// Only the upload set {jpg, jpeg, png} is recognized.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    /// Detect format from magic bytes (file signature).
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, 0x50, 0x4E, 0x47, ..] => Some(Self::Png),
            _ => None,
        }
    }
}

/// A user-supplied photo, held in memory for one request.
///
/// Immutable after construction; dropped when the request completes.
#[derive(Clone)]
pub struct OutfitImage {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl std::fmt::Debug for OutfitImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutfitImage")
            .field("bytes", &format!("[{} bytes]", self.bytes.len()))
            .field("format", &self.format)
            .finish()
    }
}

impl OutfitImage {
    /// Create an image from raw bytes, validating the file signature.
    ///
    /// When a declared format is given it must agree with the detected one.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::UnrecognizedData`] if the bytes are neither
    /// JPEG nor PNG, or [`ImageError::FormatMismatch`] if the declared
    /// format disagrees with the file signature.
    pub fn from_bytes(
        bytes: Vec<u8>,
        declared: impl Into<Option<ImageFormat>>,
    ) -> Result<Self, ImageError> {
        let detected =
            ImageFormat::from_magic_bytes(&bytes).ok_or(ImageError::UnrecognizedData)?;
        if let Some(declared) = declared.into()
            && declared != detected
        {
            return Err(ImageError::FormatMismatch { declared, detected });
        }
        Ok(Self {
            bytes,
            format: detected,
        })
    }

    /// Load an image from a file path.
    ///
    /// The extension is checked against the accepted upload set before the
    /// file is read, so unsupported uploads never reach a pipeline stage.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::UnsupportedExtension`] for extensions outside
    /// {jpg, jpeg, png}, plus any error from [`Self::from_bytes`] or the
    /// underlying read.
    pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let declared = ImageFormat::from_extension(ext)
            .ok_or_else(|| ImageError::UnsupportedExtension(ext.to_string()))?;
        let bytes = tokio::fs::read(path).await?;
        Self::from_bytes(bytes, declared)
    }

    /// Get the image format.
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    /// Get the raw image bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encode the image bytes as base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// Encode as a data URL (`data:image/jpeg;base64,...`) for transport
    /// inside a multimodal message payload.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            self.to_base64()
        )
    }
}

impl std::fmt::Display for OutfitImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[Image: {} bytes, {}]",
            self.bytes.len(),
            self.format.mime_type()
        )
    }
}
