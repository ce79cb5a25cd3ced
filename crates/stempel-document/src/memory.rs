// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory recording backend.
//
// `MemoryBackend` does not rasterize anything. It records every backend call
// in order, validates the contract the engine relies on (pages drawn only
// after import, balanced transform scopes, readable image sources), and
// serializes the recorded operation log as the "rendered" output bytes.
// Used by the unit tests and benches, and by callers that want a dry run of
// a stamping pipeline without a real PDF library.

use std::fmt;
use std::path::{Path, PathBuf};

use stempel_core::error::{Result, StempelError};
use stempel_core::types::Color;
use tracing::debug;

use crate::backend::{FontStyle, MetadataField, PageHandle, RenderBackend};

/// A4 page size in millimetres.
const A4_MM: (f64, f64) = (210.0, 297.0);

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    OpenSource { path: PathBuf },
    ImportPage { index: u32, width: f64, height: f64 },
    DrawText { page: u32, x: f64, y: f64, text: String },
    DrawImage { page: u32, source: PathBuf, x: f64, y: f64, width: f64, height: f64 },
    DrawHtml { page: u32, x: f64, y: f64, width: f64, height: f64, html: String },
    SetFont { family: String, style: FontStyle, size: f64 },
    SetTextColor { color: Color },
    SetAlpha { alpha: f64 },
    BeginTransform,
    Rotate { angle: f64, pivot_x: f64, pivot_y: f64 },
    EndTransform,
    MarkContentBoundary { page: u32 },
    SetMetadata { field: MetadataField, value: String },
    RestrictPermissions,
}

impl fmt::Display for BackendCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenSource { path } => write!(f, "open-source path={}", path.display()),
            Self::ImportPage { index, width, height } => {
                write!(f, "import-page index={index} width={width} height={height}")
            }
            Self::DrawText { page, x, y, text } => {
                write!(f, "draw-text page={page} x={x} y={y} text={text:?}")
            }
            Self::DrawImage { page, source, x, y, width, height } => write!(
                f,
                "draw-image page={page} x={x} y={y} width={width} height={height} source={}",
                source.display()
            ),
            Self::DrawHtml { page, x, y, width, height, html } => write!(
                f,
                "draw-html page={page} x={x} y={y} width={width} height={height} html={html:?}"
            ),
            Self::SetFont { family, style, size } => {
                write!(f, "set-font family={family} style={} size={size}", style.as_str())
            }
            Self::SetTextColor { color } => {
                write!(f, "set-color r={} g={} b={}", color.r, color.g, color.b)
            }
            Self::SetAlpha { alpha } => write!(f, "set-alpha value={alpha}"),
            Self::BeginTransform => write!(f, "begin-transform"),
            Self::Rotate { angle, pivot_x, pivot_y } => {
                write!(f, "rotate angle={angle} px={pivot_x} py={pivot_y}")
            }
            Self::EndTransform => write!(f, "end-transform"),
            Self::MarkContentBoundary { page } => write!(f, "mark-boundary page={page}"),
            Self::SetMetadata { field, value } => {
                write!(f, "set-metadata field={} value={value:?}", field.as_str())
            }
            Self::RestrictPermissions => write!(f, "restrict-permissions mode=print-only"),
        }
    }
}

/// Recording `RenderBackend` with caller-supplied source geometry.
///
/// The backend cannot parse real PDFs (that is the point), so the page sizes
/// it reports for the source document are configured at construction. The
/// source path is still required to exist — `open_source` keeps the
/// `SourceUnreadable` contract observable.
pub struct MemoryBackend {
    page_sizes: Vec<(f64, f64)>,
    calls: Vec<BackendCall>,
    imported_pages: u32,
    transform_depth: u32,
    scope_underflow: bool,
}

impl MemoryBackend {
    /// Backend reporting the given `(width, height)` per source page.
    pub fn with_pages(page_sizes: Vec<(f64, f64)>) -> Self {
        Self {
            page_sizes,
            calls: Vec::new(),
            imported_pages: 0,
            transform_depth: 0,
            scope_underflow: false,
        }
    }

    /// Backend reporting `count` A4 portrait pages (millimetres).
    pub fn a4(count: u32) -> Self {
        Self::with_pages(vec![A4_MM; count as usize])
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Latest value written for a metadata field, if any.
    pub fn metadata_value(&self, field: MetadataField) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            BackendCall::SetMetadata { field: f, value } if *f == field => Some(value.as_str()),
            _ => None,
        })
    }

    fn check_page(&self, page: PageHandle) -> Result<()> {
        let number = page.number();
        if number == 0 || number > self.imported_pages {
            return Err(StempelError::BackendDraw(format!(
                "page {number} is not an imported page (have {})",
                self.imported_pages
            )));
        }
        Ok(())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::a4(1)
    }
}

impl RenderBackend for MemoryBackend {
    fn open_source(&mut self, path: &Path) -> Result<u32> {
        std::fs::metadata(path).map_err(|err| {
            StempelError::SourceUnreadable(format!("{}: {err}", path.display()))
        })?;
        self.calls.push(BackendCall::OpenSource {
            path: path.to_path_buf(),
        });
        Ok(self.page_sizes.len() as u32)
    }

    fn import_page(&mut self, index: u32) -> Result<(f64, f64)> {
        let (width, height) = *index
            .checked_sub(1)
            .and_then(|i| self.page_sizes.get(i as usize))
            .ok_or_else(|| {
                StempelError::SourceUnreadable(format!(
                    "source page {index} out of range (have {})",
                    self.page_sizes.len()
                ))
            })?;
        self.imported_pages = self.imported_pages.max(index);
        self.calls.push(BackendCall::ImportPage { index, width, height });
        Ok((width, height))
    }

    fn draw_text(&mut self, page: PageHandle, x: f64, y: f64, text: &str) -> Result<()> {
        self.check_page(page)?;
        self.calls.push(BackendCall::DrawText {
            page: page.number(),
            x,
            y,
            text: text.to_string(),
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        page: PageHandle,
        source: &Path,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.check_page(page)?;
        if !source.is_file() {
            return Err(StempelError::BackendDraw(format!(
                "image source not readable: {}",
                source.display()
            )));
        }
        self.calls.push(BackendCall::DrawImage {
            page: page.number(),
            source: source.to_path_buf(),
            x,
            y,
            width,
            height,
        });
        Ok(())
    }

    fn draw_html(
        &mut self,
        page: PageHandle,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        html: &str,
    ) -> Result<()> {
        self.check_page(page)?;
        self.calls.push(BackendCall::DrawHtml {
            page: page.number(),
            x,
            y,
            width,
            height,
            html: html.to_string(),
        });
        Ok(())
    }

    fn set_font(&mut self, family: &str, style: FontStyle, size: f64) {
        self.calls.push(BackendCall::SetFont {
            family: family.to_string(),
            style,
            size,
        });
    }

    fn set_text_color(&mut self, color: Color) {
        self.calls.push(BackendCall::SetTextColor { color });
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.calls.push(BackendCall::SetAlpha { alpha });
    }

    fn begin_transform(&mut self) {
        self.transform_depth += 1;
        self.calls.push(BackendCall::BeginTransform);
    }

    fn rotate(&mut self, angle_degrees: f64, pivot_x: f64, pivot_y: f64) {
        self.calls.push(BackendCall::Rotate {
            angle: angle_degrees,
            pivot_x,
            pivot_y,
        });
    }

    fn end_transform(&mut self) {
        if self.transform_depth == 0 {
            self.scope_underflow = true;
        } else {
            self.transform_depth -= 1;
        }
        self.calls.push(BackendCall::EndTransform);
    }

    fn mark_content_boundary(&mut self, page: PageHandle) {
        self.calls.push(BackendCall::MarkContentBoundary {
            page: page.number(),
        });
    }

    fn set_metadata(&mut self, field: MetadataField, value: &str) {
        self.calls.push(BackendCall::SetMetadata {
            field,
            value: value.to_string(),
        });
    }

    fn restrict_permissions(&mut self, _user_password: &str) -> Result<()> {
        // The password itself is deliberately not recorded.
        self.calls.push(BackendCall::RestrictPermissions);
        Ok(())
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        if self.transform_depth != 0 || self.scope_underflow {
            return Err(StempelError::BackendDraw(
                "unbalanced transform scope at finalize".to_string(),
            ));
        }

        let mut out = String::from("%stempel-render 1\n");
        for call in &self.calls {
            out.push_str(&call.to_string());
            out.push('\n');
        }

        debug!(calls = self.calls.len(), bytes = out.len(), "render log serialized");
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_source_requires_existing_path() {
        let mut backend = MemoryBackend::a4(1);
        let result = backend.open_source(Path::new("/nonexistent/source.pdf"));
        match result {
            Err(StempelError::SourceUnreadable(_)) => {}
            other => panic!("expected SourceUnreadable, got {other:?}"),
        }
    }

    #[test]
    fn drawing_on_unimported_page_fails() {
        let mut backend = MemoryBackend::a4(2);
        let result = backend.draw_text(PageHandle::new(1), 0.0, 0.0, "early");
        assert!(matches!(result, Err(StempelError::BackendDraw(_))));
    }

    #[test]
    fn unbalanced_transform_scope_fails_finalize() {
        let mut backend = MemoryBackend::a4(1);
        backend.begin_transform();
        assert!(backend.finalize().is_err());
    }

    #[test]
    fn transform_underflow_fails_finalize() {
        let mut backend = MemoryBackend::a4(1);
        backend.end_transform();
        assert!(backend.finalize().is_err());
    }

    #[test]
    fn missing_image_source_is_a_draw_failure() {
        let mut backend = MemoryBackend::a4(1);
        backend.import_page(1).expect("import");
        let result = backend.draw_image(
            PageHandle::new(1),
            Path::new("/nonexistent/logo.png"),
            5.0,
            5.0,
            0.0,
            0.0,
        );
        assert!(matches!(result, Err(StempelError::BackendDraw(_))));
    }

    #[test]
    fn render_log_lists_calls_in_order() {
        let mut backend = MemoryBackend::with_pages(vec![(100.0, 200.0)]);
        backend.import_page(1).expect("import");
        backend.set_alpha(0.5);
        backend
            .draw_text(PageHandle::new(1), 10.0, 20.0, "hello")
            .expect("draw");

        let rendered = String::from_utf8(backend.finalize().expect("finalize")).expect("utf8");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "%stempel-render 1");
        assert_eq!(lines[1], "import-page index=1 width=100 height=200");
        assert_eq!(lines[2], "set-alpha value=0.5");
        assert_eq!(lines[3], "draw-text page=1 x=10 y=20 text=\"hello\"");
    }

    #[test]
    fn metadata_value_returns_latest_write() {
        let mut backend = MemoryBackend::a4(1);
        backend.set_metadata(MetadataField::Keywords, "first");
        backend.set_metadata(MetadataField::Keywords, "second");
        assert_eq!(backend.metadata_value(MetadataField::Keywords), Some("second"));
        assert_eq!(backend.metadata_value(MetadataField::Title), None);
    }
}
