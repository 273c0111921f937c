//! Design images in transport form.
//!
//! Every image that crosses the generative backend boundary (uploaded
//! floorplans, renders, refinements) is carried as a base64 payload plus a
//! MIME type. Data URLs (`data:image/png;base64,...`) are accepted and
//! produced at the edge for interop with browser clients.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Raster formats the generative backend accepts as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterFormat {
    Png,
    Jpeg,
    Webp,
    Gif,
}

impl RasterFormat {
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }

    /// Detect the format from the file signature.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else {
            None
        }
    }

    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }
}

impl fmt::Display for RasterFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// An opaque reference to an image: base64 payload paired with its MIME type.
#[derive(Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DesignImage {
    pub mime_type: String,
    /// Standard base64 (with padding), no data-URL prefix.
    pub data: String,
}

impl DesignImage {
    /// Wrap an already-encoded payload.
    #[must_use]
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encode raw image bytes, detecting the format from the file signature.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedFormat`] when the bytes are not PNG,
    /// JPEG, WebP, or GIF.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        let format = RasterFormat::sniff(bytes).ok_or_else(|| {
            CoreError::UnsupportedFormat(
                "expected a PNG, JPEG, WebP, or GIF image".to_string(),
            )
        })?;
        Ok(Self::new(format.mime_type(), STANDARD.encode(bytes)))
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidImage`] if the URL is malformed or not
    /// base64-encoded.
    pub fn from_data_url(url: &str) -> Result<Self, CoreError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| CoreError::InvalidImage("missing 'data:' scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CoreError::InvalidImage("missing ',' separator".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| CoreError::InvalidImage("payload is not base64".to_string()))?;
        if mime.is_empty() {
            return Err(CoreError::InvalidImage("missing MIME type".to_string()));
        }
        Ok(Self::new(mime, payload))
    }

    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decode the payload back to raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidImage`] if the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, CoreError> {
        STANDARD
            .decode(self.data.trim())
            .map_err(|e| CoreError::InvalidImage(e.to_string()))
    }

    /// The recognised raster format, if the MIME type names one.
    #[must_use]
    pub fn format(&self) -> Option<RasterFormat> {
        RasterFormat::from_mime(&self.mime_type)
    }

    /// Whether two images carry the same pixels byte-for-byte.
    ///
    /// Compares decoded bytes so that differing base64 whitespace does not
    /// hide an unchanged image.
    #[must_use]
    pub fn same_bytes(&self, other: &Self) -> bool {
        if self.data == other.data {
            return true;
        }
        match (self.decode(), other.decode()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Length of the base64 payload, used for logging.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Debug for DesignImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesignImage")
            .field("mime_type", &self.mime_type)
            .field("encoded_len", &self.data.len())
            .finish()
    }
}
