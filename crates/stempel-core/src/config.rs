// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamping engine configuration.

use serde::{Deserialize, Serialize};

/// Session-level settings consumed by the stamp queue and metadata composer.
///
/// Loading this from a config file is the caller's concern; the engine only
/// sees the resolved values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StamperConfig {
    /// Font family used for text stamps that do not specify one.
    pub default_font: String,
    /// Product name written to the Creator metadata field when the caller
    /// leaves it unset.
    pub creator: String,
}

impl Default for StamperConfig {
    fn default() -> Self {
        Self {
            default_font: "helvetica".to_string(),
            creator: "Stempel".to_string(),
        }
    }
}
