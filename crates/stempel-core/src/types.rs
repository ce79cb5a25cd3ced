// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Stempel stamping engine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stamping session.
///
/// Used in tracing spans so log lines from interleaved sessions stay
/// attributable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page orientation, derived from the page dimensions at import time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// A square page counts as portrait.
    pub fn from_dimensions(width: f64, height: f64) -> Self {
        if height >= width {
            Self::Portrait
        } else {
            Self::Landscape
        }
    }
}

/// Geometry of a single imported page.
///
/// Page numbers are 1-based. Instances are created by the importer and never
/// mutated afterwards; the replay loop only reads them for position
/// resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub number: u32,
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
}

impl PageInfo {
    pub fn new(number: u32, width: f64, height: f64) -> Self {
        Self {
            number,
            width,
            height,
            orientation: Orientation::from_dimensions(width, height),
        }
    }
}

/// Set of 1-based page numbers an operation applies to.
///
/// The empty set means "all pages". Filters are captured by value when an
/// operation is queued, so changing the session default later never affects
/// already-queued operations. Page numbers beyond the document's page count
/// are allowed — they simply never match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFilter {
    pages: BTreeSet<u32>,
}

impl PageFilter {
    /// Filter that matches every page.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter restricted to the given page numbers.
    pub fn only(pages: impl IntoIterator<Item = u32>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
        }
    }

    pub fn matches(&self, page: u32) -> bool {
        self.pages.is_empty() || self.pages.contains(&page)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.pages.is_empty()
    }
}

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` hex string; the leading `#` is optional.
    ///
    /// Exactly six hex digits are expected. Malformed or missing channels
    /// degrade to zero rather than erroring, so a bad color never aborts a
    /// stamp operation.
    pub fn from_hex(hex: &str) -> Self {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .unwrap_or(0)
        };
        Self {
            r: channel(0..2),
            g: channel(2..4),
            b: channel(4..6),
        }
    }
}

impl From<&ColorSpec> for Color {
    fn from(spec: &ColorSpec) -> Self {
        match spec {
            ColorSpec::Hex(hex) => Color::from_hex(hex),
            ColorSpec::Rgb([r, g, b]) => Color::new(*r, *g, *b),
        }
    }
}

/// Color as it appears on the configuration surface: either a `"#RRGGBB"`
/// string or a `[r, g, b]` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Hex(String),
    Rgb([u8; 3]),
}

/// Where a watermark sits relative to content already on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Draw on top of whatever already exists (default).
    #[default]
    Over,
    /// Mark the page's content boundary so later content stacks above the
    /// stamp.
    Under,
}

/// Per-operation option set, captured by value when the operation is queued.
///
/// Every field is optional; the dispatch code supplies the documented
/// defaults (font size 12, opacity 0.15 / rotation 45° / center anchor for
/// watermarks, zero width/height meaning backend-natural sizing).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampOptions {
    pub font_size: Option<f64>,
    pub color: Option<ColorSpec>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Rotation in degrees around the stamp's pivot point.
    pub rotate: Option<f64>,
    /// Draw alpha in `0.0..=1.0`.
    pub opacity: Option<f64>,
    /// Named anchor (`top`, `bottom`, `left`, `right`, `center`).
    pub position: Option<String>,
    pub layer: Option<Layer>,
    /// Explicit page set overriding the session-wide default filter.
    pub only_pages: Option<Vec<u32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_and_triple_agree() {
        assert_eq!(
            Color::from(&ColorSpec::Hex("#FF0000".into())),
            Color::from(&ColorSpec::Rgb([255, 0, 0]))
        );
    }

    #[test]
    fn lowercase_hex() {
        assert_eq!(Color::from_hex("#00ff00"), Color::new(0, 255, 0));
    }

    #[test]
    fn hash_prefix_is_optional() {
        assert_eq!(Color::from_hex("0000FF"), Color::new(0, 0, 255));
    }

    #[test]
    fn malformed_hex_degrades_to_zero_channels() {
        assert_eq!(Color::from_hex("zzzzzz"), Color::BLACK);
        assert_eq!(Color::from_hex("#F"), Color::BLACK);
        assert_eq!(Color::from_hex(""), Color::BLACK);
        // A single bad channel only zeroes that channel.
        assert_eq!(Color::from_hex("#FFxx00"), Color::new(255, 0, 0));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = PageFilter::all();
        assert!(filter.is_unrestricted());
        assert!(filter.matches(1));
        assert!(filter.matches(9999));
    }

    #[test]
    fn restricted_filter_matches_only_listed_pages() {
        let filter = PageFilter::only([2, 4]);
        assert!(!filter.matches(1));
        assert!(filter.matches(2));
        assert!(!filter.matches(3));
        assert!(filter.matches(4));
    }

    #[test]
    fn orientation_from_dimensions() {
        assert_eq!(
            Orientation::from_dimensions(210.0, 297.0),
            Orientation::Portrait
        );
        assert_eq!(
            Orientation::from_dimensions(297.0, 210.0),
            Orientation::Landscape
        );
        // Square pages are portrait.
        assert_eq!(
            Orientation::from_dimensions(100.0, 100.0),
            Orientation::Portrait
        );
    }

    #[test]
    fn color_spec_deserializes_both_shapes() {
        let hex: ColorSpec = serde_json::from_str(r##""#FF0000""##).expect("hex form");
        let triple: ColorSpec = serde_json::from_str("[255, 0, 0]").expect("triple form");
        assert_eq!(Color::from(&hex), Color::from(&triple));
    }

    #[test]
    fn stamp_options_deserialize_with_defaults() {
        let options: StampOptions =
            serde_json::from_str(r#"{"font_size": 18, "layer": "under"}"#).expect("parse");
        assert_eq!(options.font_size, Some(18.0));
        assert_eq!(options.layer, Some(Layer::Under));
        assert!(options.color.is_none());
        assert!(options.only_pages.is_none());
    }
}
