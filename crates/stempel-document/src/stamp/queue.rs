// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp queue — deferred overlay operations and the operation-major replay
// loop that applies them across the imported page set.

use std::path::PathBuf;

use stempel_core::config::StamperConfig;
use stempel_core::error::Result;
use stempel_core::types::{Color, Layer, PageFilter, PageInfo, StampOptions};
use tracing::{debug, instrument};

use crate::backend::{FontStyle, PageHandle, RenderBackend};
use crate::import::PageSet;
use crate::stamp::position::{begin_rotation, end_rotation, Anchor};

/// Font size used when a text stamp does not specify one.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

// Watermarks always use the same heavy face regardless of session config.
const WATERMARK_FONT_FAMILY: &str = "helvetica";
const WATERMARK_FONT_SIZE: f64 = 40.0;

const WATERMARK_DEFAULT_OPACITY: f64 = 0.15;
const WATERMARK_DEFAULT_ROTATION: f64 = 45.0;
const WATERMARK_DEFAULT_POSITION: &str = "center";

/// Content payload of one queued overlay operation.
#[derive(Debug, Clone, PartialEq)]
pub enum StampContent {
    Text { text: String, x: f64, y: f64 },
    Image { source: PathBuf, x: f64, y: f64 },
    Html { html: String, x: f64, y: f64 },
    Watermark { text: String },
}

/// A single deferred drawing operation.
///
/// The option set and the page filter are captured by value at creation, so
/// later changes to the session-wide filter never retroactively affect an
/// already-queued operation. Instances are never mutated after creation and
/// are consumed exactly once during replay.
#[derive(Debug, Clone, PartialEq)]
pub struct StampOp {
    content: StampContent,
    options: StampOptions,
    filter: PageFilter,
}

impl StampOp {
    /// Capture an operation with the filter in effect at enqueue time.
    ///
    /// An explicit `only_pages` option always wins over the session default.
    /// Watermark defaults (opacity 0.15, rotation 45°, center anchor) are
    /// resolved here so the queued record is self-contained.
    pub fn new(content: StampContent, mut options: StampOptions, session_filter: &PageFilter) -> Self {
        let filter = match &options.only_pages {
            Some(pages) => PageFilter::only(pages.iter().copied()),
            None => session_filter.clone(),
        };

        if matches!(content, StampContent::Watermark { .. }) {
            options.opacity.get_or_insert(WATERMARK_DEFAULT_OPACITY);
            options.rotate.get_or_insert(WATERMARK_DEFAULT_ROTATION);
            options
                .position
                .get_or_insert_with(|| WATERMARK_DEFAULT_POSITION.to_string());
        }

        Self {
            content,
            options,
            filter,
        }
    }

    pub fn content(&self) -> &StampContent {
        &self.content
    }

    pub fn options(&self) -> &StampOptions {
        &self.options
    }

    pub fn filter(&self) -> &PageFilter {
        &self.filter
    }
}

/// Ordered queue of deferred stamp operations.
///
/// `push` only ever appends; existing entries are never removed or
/// reordered.
#[derive(Debug, Clone, Default)]
pub struct StampQueue {
    ops: Vec<StampOp>,
}

impl StampQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: StampOp) {
        self.ops.push(op);
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply every queued operation across the page set.
    ///
    /// Replay is operation-major: for operations A queued before B, every
    /// page receives A's drawing before any page receives B's. When two
    /// stamps overlap on a page, A therefore always renders beneath B —
    /// iterating page-major instead would change the visual output and is
    /// not an equivalent implementation.
    ///
    /// An operation whose filter matches no page is a silent no-op.
    #[instrument(skip_all, fields(operations = self.ops.len(), pages = pages.page_count()))]
    pub fn replay<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        pages: &PageSet,
        config: &StamperConfig,
    ) -> Result<()> {
        for (index, op) in self.ops.iter().enumerate() {
            let mut pages_touched = 0u32;
            for page in pages.iter() {
                if !op.filter.matches(page.number) {
                    continue;
                }
                execute(op, backend, page, config)?;
                pages_touched += 1;
            }
            debug!(operation = index, pages_touched, "operation replayed");
        }
        Ok(())
    }
}

/// Dispatch one operation against one page.
fn execute<B: RenderBackend + ?Sized>(
    op: &StampOp,
    backend: &mut B,
    page: &PageInfo,
    config: &StamperConfig,
) -> Result<()> {
    let handle = PageHandle::new(page.number);
    let options = &op.options;

    match &op.content {
        StampContent::Text { text, x, y } => {
            let rotated = begin_rotation(backend, options.rotate, *x, *y);
            backend.set_font(
                &config.default_font,
                FontStyle::Regular,
                options.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            );
            if let Some(spec) = &options.color {
                backend.set_text_color(Color::from(spec));
            }
            backend.draw_text(handle, *x, *y, text)?;
            end_rotation(backend, rotated);
        }

        StampContent::Image { source, x, y } => {
            let rotated = begin_rotation(backend, options.rotate, *x, *y);
            backend.draw_image(
                handle,
                source,
                *x,
                *y,
                options.width.unwrap_or(0.0),
                options.height.unwrap_or(0.0),
            )?;
            end_rotation(backend, rotated);
        }

        StampContent::Html { html, x, y } => {
            let rotated = begin_rotation(backend, options.rotate, *x, *y);
            backend.draw_html(
                handle,
                *x,
                *y,
                options.width.unwrap_or(0.0),
                options.height.unwrap_or(0.0),
                html,
            )?;
            end_rotation(backend, rotated);
        }

        StampContent::Watermark { text } => {
            if options.layer == Some(Layer::Under) {
                backend.mark_content_boundary(handle);
            }

            backend.set_alpha(options.opacity.unwrap_or(WATERMARK_DEFAULT_OPACITY));

            let anchor = Anchor::from_name(
                options
                    .position
                    .as_deref()
                    .unwrap_or(WATERMARK_DEFAULT_POSITION),
            );
            let (x, y) = anchor.resolve(page.width, page.height);

            let rotated = begin_rotation(backend, options.rotate, x, y);
            if let Some(spec) = &options.color {
                backend.set_text_color(Color::from(spec));
            }
            backend.set_font(WATERMARK_FONT_FAMILY, FontStyle::Bold, WATERMARK_FONT_SIZE);
            backend.draw_text(handle, x, y, text)?;
            backend.set_alpha(1.0);
            end_rotation(backend, rotated);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::import;
    use crate::memory::{BackendCall, MemoryBackend};

    fn fixture_source(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("source.pdf");
        std::fs::write(&path, b"%PDF-1.4 fixture").expect("write fixture");
        path
    }

    fn text_op(text: &str, filter: &PageFilter) -> StampOp {
        StampOp::new(
            StampContent::Text {
                text: text.to_string(),
                x: 50.0,
                y: 50.0,
            },
            StampOptions::default(),
            filter,
        )
    }

    /// Draw-text calls as (text, page) pairs, in recorded order.
    fn drawn(backend: &MemoryBackend) -> Vec<(String, u32)> {
        backend
            .calls()
            .iter()
            .filter_map(|call| match call {
                BackendCall::DrawText { page, text, .. } => Some((text.clone(), *page)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn replay_is_operation_major() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = fixture_source(&dir);
        let mut backend = MemoryBackend::a4(3);
        let pages = import(&mut backend, &source).expect("import");

        let all = PageFilter::all();
        let mut queue = StampQueue::new();
        queue.push(text_op("A", &all));
        queue.push(text_op("B", &all));
        queue
            .replay(&mut backend, &pages, &StamperConfig::default())
            .expect("replay");

        // Every page receives A before any page receives B.
        let expected: Vec<(String, u32)> = [("A", 1), ("A", 2), ("A", 3), ("B", 1), ("B", 2), ("B", 3)]
            .iter()
            .map(|(t, p)| (t.to_string(), *p))
            .collect();
        assert_eq!(drawn(&backend), expected);
    }

    #[test]
    fn per_operation_filter_restricts_pages() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = fixture_source(&dir);
        let mut backend = MemoryBackend::a4(3);
        let pages = import(&mut backend, &source).expect("import");

        let mut queue = StampQueue::new();
        queue.push(text_op("ONLY-2", &PageFilter::only([2])));
        queue
            .replay(&mut backend, &pages, &StamperConfig::default())
            .expect("replay");

        assert_eq!(drawn(&backend), vec![("ONLY-2".to_string(), 2)]);
    }

    #[test]
    fn only_pages_option_overrides_session_filter() {
        let session_filter = PageFilter::only([1]);
        let op = StampOp::new(
            StampContent::Text {
                text: "X".into(),
                x: 0.0,
                y: 0.0,
            },
            StampOptions {
                only_pages: Some(vec![3]),
                ..StampOptions::default()
            },
            &session_filter,
        );
        assert!(!op.filter().matches(1));
        assert!(op.filter().matches(3));
    }

    #[test]
    fn filter_matching_no_page_is_a_silent_noop() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = fixture_source(&dir);
        let mut backend = MemoryBackend::a4(2);
        let pages = import(&mut backend, &source).expect("import");

        let mut queue = StampQueue::new();
        queue.push(text_op("GHOST", &PageFilter::only([99])));
        queue
            .replay(&mut backend, &pages, &StamperConfig::default())
            .expect("replay must not error");

        assert!(drawn(&backend).is_empty());
    }

    #[test]
    fn text_dispatch_sets_font_and_color() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = fixture_source(&dir);
        let mut backend = MemoryBackend::a4(1);
        let pages = import(&mut backend, &source).expect("import");

        let mut queue = StampQueue::new();
        queue.push(StampOp::new(
            StampContent::Text {
                text: "PAID".into(),
                x: 30.0,
                y: 40.0,
            },
            StampOptions {
                font_size: Some(18.0),
                color: Some(stempel_core::types::ColorSpec::Hex("#FF0000".into())),
                ..StampOptions::default()
            },
            &PageFilter::all(),
        ));
        queue
            .replay(&mut backend, &pages, &StamperConfig::default())
            .expect("replay");

        let calls = backend.calls();
        assert!(calls.contains(&BackendCall::SetFont {
            family: "helvetica".into(),
            style: FontStyle::Regular,
            size: 18.0,
        }));
        assert!(calls.contains(&BackendCall::SetTextColor {
            color: Color::new(255, 0, 0),
        }));
    }

    #[test]
    fn rotation_scope_wraps_the_draw() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = fixture_source(&dir);
        let mut backend = MemoryBackend::a4(1);
        let pages = import(&mut backend, &source).expect("import");

        let mut queue = StampQueue::new();
        queue.push(StampOp::new(
            StampContent::Text {
                text: "TILTED".into(),
                x: 10.0,
                y: 20.0,
            },
            StampOptions {
                rotate: Some(90.0),
                ..StampOptions::default()
            },
            &PageFilter::all(),
        ));
        queue
            .replay(&mut backend, &pages, &StamperConfig::default())
            .expect("replay");

        let calls = backend.calls();
        let begin = calls
            .iter()
            .position(|c| *c == BackendCall::BeginTransform)
            .expect("begin");
        let draw = calls
            .iter()
            .position(|c| matches!(c, BackendCall::DrawText { .. }))
            .expect("draw");
        let end = calls
            .iter()
            .position(|c| *c == BackendCall::EndTransform)
            .expect("end");
        assert!(begin < draw && draw < end);
        assert!(calls.contains(&BackendCall::Rotate {
            angle: 90.0,
            pivot_x: 10.0,
            pivot_y: 20.0,
        }));
    }

    #[test]
    fn watermark_defaults_and_restore() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = fixture_source(&dir);
        let mut backend = MemoryBackend::a4(1);
        let pages = import(&mut backend, &source).expect("import");

        let mut queue = StampQueue::new();
        queue.push(StampOp::new(
            StampContent::Watermark {
                text: "CONFIDENTIAL".into(),
            },
            StampOptions::default(),
            &PageFilter::all(),
        ));
        queue
            .replay(&mut backend, &pages, &StamperConfig::default())
            .expect("replay");

        // Center anchor on A4 (210 x 297).
        let (x, y) = (210.0 / 2.0 - 40.0, 297.0 / 2.0);
        let calls = backend.calls();
        assert!(calls.contains(&BackendCall::SetAlpha { alpha: 0.15 }));
        assert!(calls.contains(&BackendCall::Rotate {
            angle: 45.0,
            pivot_x: x,
            pivot_y: y,
        }));
        assert!(calls.contains(&BackendCall::SetFont {
            family: "helvetica".into(),
            style: FontStyle::Bold,
            size: 40.0,
        }));
        assert!(calls.contains(&BackendCall::DrawText {
            page: 1,
            x,
            y,
            text: "CONFIDENTIAL".into(),
        }));

        // Alpha restored before the scope closes.
        let restore = calls
            .iter()
            .position(|c| *c == BackendCall::SetAlpha { alpha: 1.0 })
            .expect("alpha restore");
        let end = calls
            .iter()
            .position(|c| *c == BackendCall::EndTransform)
            .expect("end transform");
        assert!(restore < end);
    }

    #[test]
    fn under_layer_marks_content_boundary_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = fixture_source(&dir);
        let mut backend = MemoryBackend::a4(1);
        let pages = import(&mut backend, &source).expect("import");

        let mut queue = StampQueue::new();
        queue.push(StampOp::new(
            StampContent::Watermark {
                text: "DRAFT".into(),
            },
            StampOptions {
                layer: Some(Layer::Under),
                ..StampOptions::default()
            },
            &PageFilter::all(),
        ));
        queue
            .replay(&mut backend, &pages, &StamperConfig::default())
            .expect("replay");

        let calls = backend.calls();
        let mark = calls
            .iter()
            .position(|c| *c == BackendCall::MarkContentBoundary { page: 1 })
            .expect("boundary mark");
        let draw = calls
            .iter()
            .position(|c| matches!(c, BackendCall::DrawText { .. }))
            .expect("draw");
        assert!(mark < draw);
    }

    #[test]
    fn over_layer_draws_without_boundary_mark() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = fixture_source(&dir);
        let mut backend = MemoryBackend::a4(1);
        let pages = import(&mut backend, &source).expect("import");

        let mut queue = StampQueue::new();
        queue.push(StampOp::new(
            StampContent::Watermark {
                text: "FINAL".into(),
            },
            StampOptions::default(),
            &PageFilter::all(),
        ));
        queue
            .replay(&mut backend, &pages, &StamperConfig::default())
            .expect("replay");

        assert!(!backend
            .calls()
            .iter()
            .any(|c| matches!(c, BackendCall::MarkContentBoundary { .. })));
    }

    #[test]
    fn html_and_image_pass_zero_for_unset_dimensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = fixture_source(&dir);
        let logo = dir.path().join("logo.png");
        std::fs::write(&logo, b"png bytes").expect("write logo");

        let mut backend = MemoryBackend::a4(1);
        let pages = import(&mut backend, &source).expect("import");

        let all = PageFilter::all();
        let mut queue = StampQueue::new();
        queue.push(StampOp::new(
            StampContent::Html {
                html: "<b>note</b>".into(),
                x: 5.0,
                y: 6.0,
            },
            StampOptions::default(),
            &all,
        ));
        queue.push(StampOp::new(
            StampContent::Image {
                source: logo.clone(),
                x: 7.0,
                y: 8.0,
            },
            StampOptions {
                width: Some(64.0),
                ..StampOptions::default()
            },
            &all,
        ));
        queue
            .replay(&mut backend, &pages, &StamperConfig::default())
            .expect("replay");

        let calls = backend.calls();
        assert!(calls.contains(&BackendCall::DrawHtml {
            page: 1,
            x: 5.0,
            y: 6.0,
            width: 0.0,
            height: 0.0,
            html: "<b>note</b>".into(),
        }));
        assert!(calls.contains(&BackendCall::DrawImage {
            page: 1,
            source: logo,
            x: 7.0,
            y: 8.0,
            width: 64.0,
            height: 0.0,
        }));
    }
}
