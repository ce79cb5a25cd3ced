// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Declarative stamp/watermark recipes.
//
// A recipe is the serialized form of one stamp and/or one watermark; applying
// it through `StampSession::apply_recipe` is equivalent to making the
// corresponding direct builder calls.

use serde::{Deserialize, Serialize};
use stempel_core::types::StampOptions;

/// Declarative description of stamping work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampRecipe {
    pub stamp: Option<StampSpec>,
    pub watermark: Option<WatermarkSpec>,
}

/// One positional stamp.
///
/// `type` selects text, image, or html; unknown values degrade to plain text
/// rendering rather than erroring. `page`, when present, restricts this
/// stamp to that single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampSpec {
    #[serde(rename = "type", default = "default_stamp_type")]
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub options: StampOptions,
}

fn default_stamp_type() -> String {
    "text".to_string()
}

/// One watermark, with its option set inlined alongside the text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSpec {
    pub text: String,
    #[serde(flatten)]
    pub options: StampOptions,
}
