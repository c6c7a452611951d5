//! Image intake: validate an uploaded file before it reaches OCR.
//!
//! Only a small set of raster formats is accepted. The format is taken from
//! the file's magic bytes, with the filename extension as a fallback for
//! content `infer` cannot classify.

use std::path::Path;

use thiserror::Error;

/// Extensions offered in upload dialogs.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Errors raised while accepting an upload.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Uploaded file is empty")]
    Empty,

    #[error("Unsupported image type: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raster formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    /// Map a MIME type to a supported format.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Map a filename extension (case-insensitive) to a supported format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

/// An accepted image upload. Lives for one request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Accept raw upload bytes, rejecting empty or non-image content.
    pub fn from_bytes(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, IntakeError> {
        let filename = filename.into();
        if bytes.is_empty() {
            return Err(IntakeError::Empty);
        }

        let format = match infer::get(&bytes) {
            Some(kind) => ImageFormat::from_mime(kind.mime_type())
                .ok_or_else(|| IntakeError::UnsupportedFormat(kind.mime_type().to_string()))?,
            None => extension_of(&filename)
                .and_then(ImageFormat::from_extension)
                .ok_or_else(|| IntakeError::UnsupportedFormat(filename.clone()))?,
        };

        tracing::debug!(
            "Accepted upload {} ({}, {} bytes)",
            filename,
            format,
            bytes.len()
        );

        Ok(Self {
            filename,
            format,
            bytes,
        })
    }

    /// Read and accept an image from disk.
    pub fn from_path(path: &Path) -> Result<Self, IntakeError> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Self::from_bytes(filename, bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn extension_of(filename: &str) -> Option<&str> {
    Path::new(filename).extension().and_then(|e| e.to_str())
}
