// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rendering-backend contract.
//
// The engine never touches PDF content streams itself — glyph and image
// rasterization, HTML layout, transforms, and final byte serialization are
// the backend's job. Every draw call takes an explicit `PageHandle`, so the
// replay loop has no hidden "current page" cursor to get out of sync.

use std::path::Path;

use stempel_core::error::Result;
use stempel_core::types::Color;

/// Handle to an imported output page (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle(u32);

impl PageHandle {
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    pub fn number(self) -> u32 {
        self.0
    }
}

/// Font style selector for text drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

impl FontStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Bold => "bold",
        }
    }
}

/// Standard document metadata fields the backend can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataField {
    Title,
    Author,
    Subject,
    Keywords,
    Creator,
}

impl MetadataField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Author => "Author",
            Self::Subject => "Subject",
            Self::Keywords => "Keywords",
            Self::Creator => "Creator",
        }
    }
}

/// External rendering collaborator.
///
/// Implementations own the loaded document and all drawing state. Graphics
/// state (font, color, alpha, transform stack) follows the usual PDF model:
/// setters apply to subsequent draw calls in order.
pub trait RenderBackend {
    /// Open the source document and return its page count.
    ///
    /// Fails with `StempelError::SourceUnreadable` when the path does not
    /// exist or is not a valid document.
    fn open_source(&mut self, path: &Path) -> Result<u32>;

    /// Import source page `index` (1-based) as a new output page carrying the
    /// source page's full visual content as a background layer. Returns the
    /// page dimensions `(width, height)`.
    fn import_page(&mut self, index: u32) -> Result<(f64, f64)>;

    /// Draw a text run at `(x, y)` on the given page.
    fn draw_text(&mut self, page: PageHandle, x: f64, y: f64, text: &str) -> Result<()>;

    /// Draw an image at `(x, y)`. A zero width or height means "use the
    /// backend's natural sizing for that dimension".
    fn draw_image(
        &mut self,
        page: PageHandle,
        source: &Path,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()>;

    /// Draw a rich-text block at `(x, y)`. Zero width/height as for images.
    fn draw_html(
        &mut self,
        page: PageHandle,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        html: &str,
    ) -> Result<()>;

    fn set_font(&mut self, family: &str, style: FontStyle, size: f64);

    fn set_text_color(&mut self, color: Color);

    /// Set the draw alpha for subsequent operations (`0.0..=1.0`).
    fn set_alpha(&mut self, alpha: f64);

    /// Open a transform scope. Must be balanced by `end_transform`.
    fn begin_transform(&mut self);

    /// Rotate the coordinate system by `angle_degrees` around the pivot,
    /// inside the currently open transform scope.
    fn rotate(&mut self, angle_degrees: f64, pivot_x: f64, pivot_y: f64);

    /// Close the innermost transform scope.
    fn end_transform(&mut self);

    /// Mark the page's current content boundary; content drawn afterwards
    /// stacks above the mark. Used for `layer = "under"` watermarks.
    fn mark_content_boundary(&mut self, page: PageHandle);

    fn set_metadata(&mut self, field: MetadataField, value: &str);

    /// Apply document-native protection: print-only permissions locked with
    /// the given user password, no owner password, default permission mask.
    fn restrict_permissions(&mut self, user_password: &str) -> Result<()>;

    /// Serialize the finished document and return its bytes.
    fn finalize(&mut self) -> Result<Vec<u8>>;
}
