//! Document types and utilities.
//!
//! A [`Document`] is the immutable input of a pipeline run: the raw bytes of
//! a scanned form together with its declared [`MediaKind`].

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use derive_more::{From, Into};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};
use uuid::Uuid;

use crate::{Error, Result, TRACING_TARGET};

/// Unique identifier for documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, From, Into)]
pub struct DocumentId(
    #[from]
    #[into]
    pub Uuid,
);

impl DocumentId {
    /// Creates a new time-ordered document ID.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared media kind of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MediaKind {
    /// Portable Document Format.
    Pdf,
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// TIFF image (single or multi-page).
    Tiff,
    /// Windows bitmap.
    Bmp,
    /// HEIF/HEIC image.
    Heif,
}

impl MediaKind {
    /// Returns the MIME type sent to OCR services.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Tiff => "image/tiff",
            Self::Bmp => "image/bmp",
            Self::Heif => "image/heif",
        }
    }

    /// Returns true for raster image kinds.
    pub fn is_image(&self) -> bool {
        !matches!(self, Self::Pdf)
    }

    /// Determines the media kind from a file extension (case-insensitive).
    pub fn from_extension(extension: &str) -> Option<Self> {
        let kind = match extension.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "tif" | "tiff" => Self::Tiff,
            "bmp" => Self::Bmp,
            "heif" | "heic" => Self::Heif,
            _ => return None,
        };
        Some(kind)
    }

    /// Determines the media kind from the leading bytes of the content.
    pub fn sniff(content: &[u8]) -> Option<Self> {
        const TIFF_LE: &[u8] = b"II*\0";
        const TIFF_BE: &[u8] = b"MM\0*";

        if content.starts_with(b"%PDF") {
            Some(Self::Pdf)
        } else if content.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if content.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if content.starts_with(TIFF_LE) || content.starts_with(TIFF_BE) {
            Some(Self::Tiff)
        } else if content.starts_with(b"BM") {
            Some(Self::Bmp)
        } else if content.len() >= 12 && &content[4..8] == b"ftyp" {
            matches!(&content[8..12], b"heic" | b"heix" | b"mif1" | b"msf1").then_some(Self::Heif)
        } else {
            None
        }
    }
}

/// An immutable scanned form submitted for extraction.
///
/// # Examples
///
/// ```rust
/// use bytes::Bytes;
/// use formscan_core::types::{Document, MediaKind};
///
/// let doc = Document::new(Bytes::from_static(b"%PDF-1.7"), MediaKind::Pdf)
///     .with_filename("form-283.pdf");
/// assert_eq!(doc.mime_type(), "application/pdf");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier for this document.
    pub id: DocumentId,
    /// The document content as bytes.
    pub content: Bytes,
    /// Declared media kind.
    pub media_kind: MediaKind,
    /// Original filename, when known.
    pub filename: Option<String>,
}

impl Document {
    /// Creates a new document from bytes and a declared media kind.
    pub fn new(content: Bytes, media_kind: MediaKind) -> Self {
        Self {
            id: DocumentId::new(),
            content,
            media_kind,
            filename: None,
        }
    }

    /// Creates a document whose media kind is detected from its content.
    pub fn sniffed(content: Bytes) -> Result<Self> {
        let media_kind = MediaKind::sniff(&content).ok_or_else(|| {
            Error::invalid_input().with_message("unrecognized document format")
        })?;
        Ok(Self::new(content, media_kind))
    }

    /// Reads a document from disk.
    ///
    /// The media kind is taken from the file extension, falling back to the
    /// content signature.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = Bytes::from(tokio::fs::read(path).await?);

        let media_kind = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MediaKind::from_extension)
            .or_else(|| MediaKind::sniff(&content))
            .ok_or_else(|| {
                Error::invalid_input()
                    .with_message(format!("unsupported document type: {}", path.display()))
            })?;

        let mut document = Self::new(content, media_kind);
        document.filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned);

        tracing::debug!(
            target: TRACING_TARGET,
            document_id = %document.id,
            media_kind = %document.media_kind,
            size = document.size(),
            path = %path.display(),
            "Loaded document"
        );

        Ok(document)
    }

    /// Sets the original filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Returns the MIME type of the declared media kind.
    pub fn mime_type(&self) -> &'static str {
        self.media_kind.mime_type()
    }

    /// Returns the document bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    /// Returns the document size in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Returns true if the document has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_detection() {
        assert_eq!(MediaKind::from_extension("PDF"), Some(MediaKind::Pdf));
        assert_eq!(MediaKind::from_extension("jpeg"), Some(MediaKind::Jpeg));
        assert_eq!(MediaKind::from_extension("tif"), Some(MediaKind::Tiff));
        assert_eq!(MediaKind::from_extension("docx"), None);
    }

    #[test]
    fn test_content_sniffing() {
        assert_eq!(MediaKind::sniff(b"%PDF-1.4\n"), Some(MediaKind::Pdf));
        assert_eq!(
            MediaKind::sniff(b"\x89PNG\r\n\x1a\n\0\0"),
            Some(MediaKind::Png)
        );
        assert_eq!(MediaKind::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(MediaKind::Jpeg));
        assert_eq!(MediaKind::sniff(b"plain text"), None);
    }

    #[test]
    fn test_sniffed_rejects_unknown() {
        assert!(Document::sniffed(Bytes::from_static(b"hello")).is_err());
    }

    #[tokio::test]
    async fn test_from_path_uses_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scan.png");
        tokio::fs::write(&path, b"not really a png").await.unwrap();

        let document = Document::from_path(&path).await.unwrap();
        assert_eq!(document.media_kind, MediaKind::Png);
        assert_eq!(document.filename.as_deref(), Some("scan.png"));
        assert!(document.media_kind.is_image());
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let result = Document::from_path("/definitely/not/here.pdf").await;
        assert!(result.is_err());
    }
}
