//! Preview rendering collaborator.
//!
//! Rasterizing a design is done outside this crate. A session holds an
//! optional [`PreviewRenderer`] and hands it captured documents.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::document::DesignDocument;
use crate::DesignResult;

/// Raster output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewFormat {
    /// PNG image.
    #[default]
    Png,
    /// JPEG image.
    Jpeg,
}

impl PreviewFormat {
    /// MIME type of the format.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Options passed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewOptions {
    /// Output format.
    pub format: PreviewFormat,
    /// Pixel multiplier over the canvas size (e.g. 2.0 for retina).
    pub scale: f64,
    /// Whether hidden elements are left out.
    pub skip_hidden: bool,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            format: PreviewFormat::Png,
            scale: 1.0,
            skip_hidden: true,
        }
    }
}

/// A rendered preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    /// Encoding of `bytes`.
    pub format: PreviewFormat,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

impl PreviewImage {
    /// The image as a `data:` URI.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            STANDARD.encode(&self.bytes)
        )
    }
}

/// Renders design documents to raster previews.
pub trait PreviewRenderer: std::fmt::Debug + Send + Sync {
    /// Render a document.
    ///
    /// # Errors
    ///
    /// Returns [`DesignError::Render`](crate::DesignError::Render) if the
    /// document cannot be rendered.
    fn render(&self, document: &DesignDocument, options: &PreviewOptions) -> DesignResult<PreviewImage>;
}
