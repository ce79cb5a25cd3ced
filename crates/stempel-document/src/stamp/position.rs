// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Position and transform resolution — named anchors to absolute coordinates,
// and the balanced rotation-scope guard around draw calls.

use crate::backend::RenderBackend;

/// Named logical position on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

impl Anchor {
    /// Parse an anchor name. Unrecognized names resolve as `Center`; a bad
    /// position string never aborts a stamp operation.
    pub fn from_name(name: &str) -> Self {
        match name {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Center,
        }
    }

    /// Absolute `(x, y)` for this anchor on a page of the given size.
    ///
    /// The horizontal offsets assume the text-run origin conventions of the
    /// rendering backend (a nominal 80-unit-wide run centered on the page
    /// midline, 10-unit side margins).
    pub fn resolve(self, page_width: f64, page_height: f64) -> (f64, f64) {
        match self {
            Self::Top => (page_width / 2.0 - 40.0, 20.0),
            Self::Bottom => (page_width / 2.0 - 40.0, page_height - 30.0),
            Self::Left => (10.0, page_height / 2.0),
            Self::Right => (page_width - 80.0, page_height / 2.0),
            Self::Center => (page_width / 2.0 - 40.0, page_height / 2.0),
        }
    }
}

/// Open a rotation scope around `(pivot_x, pivot_y)` when `angle` is present
/// and non-zero. Returns whether a scope was opened; the caller must pass
/// that flag to [`end_rotation`] after drawing so scopes stay balanced.
///
/// A zero or absent angle opens no scope, and the matching close is skipped —
/// drawing proceeds in the untransformed coordinate system.
pub fn begin_rotation<B: RenderBackend + ?Sized>(
    backend: &mut B,
    angle: Option<f64>,
    pivot_x: f64,
    pivot_y: f64,
) -> bool {
    match angle {
        Some(degrees) if degrees != 0.0 => {
            backend.begin_transform();
            backend.rotate(degrees, pivot_x, pivot_y);
            true
        }
        _ => false,
    }
}

/// Close the rotation scope opened by [`begin_rotation`], if any.
pub fn end_rotation<B: RenderBackend + ?Sized>(backend: &mut B, rotated: bool) {
    if rotated {
        backend.end_transform();
    }
}
