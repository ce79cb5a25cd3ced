// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamping session — caller-owned pipeline state from source to saved file.
//
// One session owns one backend, one stamp queue, and one output. There is no
// shared instance anywhere: a fresh session starts from nothing, and `save`
// consumes the session, so state cannot leak between two stamping runs.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use stempel_core::config::StamperConfig;
use stempel_core::error::{Result, StempelError};
use stempel_core::types::{PageFilter, SessionId, StampOptions};
use stempel_security::{fingerprint, FileEnvelope};
use tracing::{info, instrument};

use crate::backend::RenderBackend;
use crate::import::import;
use crate::metadata::{DocumentMetadata, MetadataComposer};
use crate::recipe::StampRecipe;
use crate::stamp::queue::{StampContent, StampOp, StampQueue};

/// Outcome of a completed save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub output: PathBuf,
    /// Pages imported from the source (fixed at import time).
    pub pages: u32,
    /// Stamp operations that were replayed.
    pub operations: usize,
    /// Size of the file on disk, envelope included when one was applied.
    pub bytes_written: u64,
    /// SHA-256 hex fingerprint of the rendered (pre-envelope) bytes.
    pub document_hash: String,
    pub envelope_applied: bool,
}

/// A single stamping run over one source document.
///
/// Builder calls consume and return the session, so the usual shape is one
/// fluent chain ending in [`StampSession::save`]:
///
/// ```ignore
/// let report = StampSession::new(backend)
///     .from_file("input.pdf")
///     .stamp_text("APPROVED", 50.0, 50.0, StampOptions::default())
///     .save("output.pdf")?;
/// ```
pub struct StampSession<B: RenderBackend> {
    id: SessionId,
    backend: B,
    config: StamperConfig,
    source: Option<PathBuf>,
    default_filter: PageFilter,
    queue: StampQueue,
    metadata: MetadataComposer,
    document_password: Option<String>,
    envelope_passphrase: Option<String>,
}

impl<B: RenderBackend> StampSession<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, StamperConfig::default())
    }

    pub fn with_config(backend: B, config: StamperConfig) -> Self {
        Self {
            id: SessionId::new(),
            backend,
            config,
            source: None,
            default_filter: PageFilter::all(),
            queue: StampQueue::new(),
            metadata: MetadataComposer::default(),
            document_password: None,
            envelope_passphrase: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn queued_operations(&self) -> usize {
        self.queue.len()
    }

    /// Select the source document to import at save time.
    pub fn from_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Set the session-wide page filter for operations queued afterwards.
    ///
    /// Already-queued operations keep the filter they captured. An empty set
    /// means all pages.
    pub fn only_on_pages(mut self, pages: impl IntoIterator<Item = u32>) -> Self {
        self.default_filter = PageFilter::only(pages);
        self
    }

    /// Queue a text stamp at `(x, y)`.
    pub fn stamp_text(
        self,
        text: impl Into<String>,
        x: f64,
        y: f64,
        options: StampOptions,
    ) -> Self {
        self.enqueue(
            StampContent::Text {
                text: text.into(),
                x,
                y,
            },
            options,
        )
    }

    /// Queue an image stamp at `(x, y)`.
    pub fn stamp_image(
        self,
        source: impl Into<PathBuf>,
        x: f64,
        y: f64,
        options: StampOptions,
    ) -> Self {
        self.enqueue(
            StampContent::Image {
                source: source.into(),
                x,
                y,
            },
            options,
        )
    }

    /// Queue a rich-text block at `(x, y)`.
    pub fn stamp_html(
        self,
        html: impl Into<String>,
        x: f64,
        y: f64,
        options: StampOptions,
    ) -> Self {
        self.enqueue(
            StampContent::Html {
                html: html.into(),
                x,
                y,
            },
            options,
        )
    }

    /// Queue a watermark. Unset options get the watermark defaults
    /// (opacity 0.15, rotation 45°, center anchor).
    pub fn watermark_text(self, text: impl Into<String>, options: StampOptions) -> Self {
        self.enqueue(StampContent::Watermark { text: text.into() }, options)
    }

    fn enqueue(mut self, content: StampContent, options: StampOptions) -> Self {
        self.queue
            .push(StampOp::new(content, options, &self.default_filter));
        self
    }

    /// Apply a declarative recipe — equivalent to the corresponding direct
    /// builder calls.
    ///
    /// A recipe `page` restricts that stamp only; the session-wide filter is
    /// left untouched. Unknown stamp types degrade to plain text.
    pub fn apply_recipe(mut self, recipe: &StampRecipe) -> Self {
        if let Some(stamp) = &recipe.stamp {
            let mut options = stamp.options.clone();
            if let Some(page) = stamp.page {
                options.only_pages = Some(vec![page]);
            }
            self = match stamp.kind.as_str() {
                "html" => self.stamp_html(stamp.value.clone(), stamp.x, stamp.y, options),
                "image" => self.stamp_image(stamp.value.as_str(), stamp.x, stamp.y, options),
                _ => self.stamp_text(stamp.value.clone(), stamp.x, stamp.y, options),
            };
        }

        if let Some(watermark) = &recipe.watermark {
            self = self.watermark_text(watermark.text.clone(), watermark.options.clone());
        }

        self
    }

    /// Set the standard metadata fields written at save time.
    pub fn with_metadata(mut self, standard: DocumentMetadata) -> Self {
        self.metadata.standard = standard;
        self
    }

    /// Set the custom metadata map carried inside the Keywords field.
    pub fn with_custom_metadata(mut self, custom: Map<String, Value>) -> Self {
        self.metadata.custom = custom;
        self
    }

    /// Apply document-native protection: print-only permissions locked with
    /// `user_password`, applied before the output bytes are finalized.
    pub fn protect_document(mut self, user_password: impl Into<String>) -> Self {
        self.document_password = Some(user_password.into());
        self
    }

    /// Wrap the saved file in the authenticated-encryption envelope.
    ///
    /// Stacks with [`StampSession::protect_document`]: native protection is
    /// baked into the rendered bytes, the envelope wraps those bytes.
    pub fn encrypt_output(mut self, passphrase: impl Into<String>) -> Self {
        self.envelope_passphrase = Some(passphrase.into());
        self
    }

    /// Run the whole pipeline: import, replay, metadata, optional native
    /// protection, serialize, write, optional envelope.
    ///
    /// Any failure before the write aborts with no output file. The envelope
    /// step rewrites the plaintext output in place; the two writes are
    /// sequential with no atomicity guarantee between them, so callers
    /// needing stronger guarantees should save to a temporary path and
    /// rename afterwards.
    #[instrument(skip_all, fields(session = %self.id, output = %output.as_ref().display()))]
    pub fn save(mut self, output: impl AsRef<Path>) -> Result<SaveReport> {
        let output = output.as_ref();
        let source = self.source.clone().ok_or_else(|| {
            StempelError::SourceUnreadable("no source document configured".to_string())
        })?;

        let pages = import(&mut self.backend, &source)?;
        self.queue.replay(&mut self.backend, &pages, &self.config)?;
        self.metadata.apply(&mut self.backend, &self.config.creator)?;

        if let Some(password) = &self.document_password {
            self.backend.restrict_permissions(password)?;
        }

        let rendered = self.backend.finalize()?;
        std::fs::write(output, &rendered)?;

        let document_hash = fingerprint(&rendered);
        let mut bytes_written = rendered.len() as u64;
        let mut envelope_applied = false;

        if let Some(passphrase) = &self.envelope_passphrase {
            bytes_written = FileEnvelope::new(passphrase.clone()).encrypt_file_in_place(output)?;
            envelope_applied = true;
        }

        info!(
            pages = pages.page_count(),
            operations = self.queue.len(),
            bytes = bytes_written,
            envelope = envelope_applied,
            hash = %document_hash,
            "document saved"
        );

        Ok(SaveReport {
            output: output.to_path_buf(),
            pages: pages.page_count(),
            operations: self.queue.len(),
            bytes_written,
            document_hash,
            envelope_applied,
        })
    }
}
