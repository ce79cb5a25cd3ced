// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Metadata composition — standard document fields plus an arbitrary custom
// map carried inside the Keywords field.
//
// Carrier format: `Keywords = "<existing keywords> | meta:<base64(json)>"`.
// A consumer splits on the separator and base64-decodes the trailing segment
// to recover the exact JSON payload.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stempel_core::error::Result;
use tracing::{debug, instrument};

use crate::backend::{MetadataField, RenderBackend};

/// Separator between the human-readable keywords and the encoded custom map.
pub const CUSTOM_METADATA_SEPARATOR: &str = " | meta:";

/// Standard document metadata fields, all optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
}

/// Writes standard and custom metadata to the backend in one pass.
///
/// Keywords is written last so the carrier field reflects the final combined
/// value once the custom map has been folded in.
#[derive(Debug, Clone, Default)]
pub struct MetadataComposer {
    pub standard: DocumentMetadata,
    pub custom: Map<String, Value>,
}

impl MetadataComposer {
    /// Apply all metadata to the backend.
    ///
    /// Title, Author, and Subject are set only when non-empty. Creator is
    /// always set, falling back to `default_creator`. An empty custom map
    /// produces no `meta:` token at all.
    #[instrument(skip_all, fields(custom_entries = self.custom.len()))]
    pub fn apply<B: RenderBackend + ?Sized>(
        &self,
        backend: &mut B,
        default_creator: &str,
    ) -> Result<()> {
        let standard = &self.standard;

        for (field, value) in [
            (MetadataField::Title, &standard.title),
            (MetadataField::Author, &standard.author),
            (MetadataField::Subject, &standard.subject),
        ] {
            if let Some(value) = value {
                if !value.is_empty() {
                    backend.set_metadata(field, value);
                }
            }
        }

        let creator = standard
            .creator
            .as_deref()
            .filter(|creator| !creator.is_empty())
            .unwrap_or(default_creator);
        backend.set_metadata(MetadataField::Creator, creator);

        // Only the pre-existing keywords are trimmed, so the separator stays
        // literally `" | meta:"` and consumers can always split on it.
        let existing = standard.keywords.as_deref().unwrap_or("").trim();
        let keywords = if self.custom.is_empty() {
            existing.to_string()
        } else {
            let token = BASE64.encode(serde_json::to_string(&self.custom)?);
            format!("{existing}{CUSTOM_METADATA_SEPARATOR}{token}")
        };
        if !keywords.is_empty() {
            backend.set_metadata(MetadataField::Keywords, &keywords);
        }

        debug!("metadata applied");
        Ok(())
    }
}

/// Recover the custom-metadata map from a Keywords value.
///
/// Returns `None` when the carrier token is absent or undecodable.
pub fn decode_custom_metadata(keywords: &str) -> Option<Map<String, Value>> {
    let (_, token) = keywords.rsplit_once(CUSTOM_METADATA_SEPARATOR)?;
    let json = BASE64.decode(token).ok()?;
    serde_json::from_slice(&json).ok()
}
