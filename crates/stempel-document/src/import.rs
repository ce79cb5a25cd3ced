// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page import — build the immutable page set from a source document.

use std::path::Path;

use stempel_core::error::Result;
use stempel_core::types::PageInfo;
use tracing::{debug, info, instrument};

use crate::backend::RenderBackend;

/// Ordered, immutable set of imported pages.
///
/// The page count is fixed here and used for the whole replay; stamp
/// operations referencing pages beyond it are silent no-ops.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSet {
    pages: Vec<PageInfo>,
}

impl PageSet {
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Look up a page by its 1-based number.
    pub fn get(&self, number: u32) -> Option<&PageInfo> {
        number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
    }

    /// Iterate pages in ascending page-number order.
    pub fn iter(&self) -> std::slice::Iter<'_, PageInfo> {
        self.pages.iter()
    }
}

/// Open `source` and import every page, in increasing index order starting
/// at 1, each as an output page with the source page's dimensions and visual
/// content as background.
///
/// No pages are skipped, merged, or reordered. Fails with
/// `StempelError::SourceUnreadable` when the source is missing or invalid.
#[instrument(skip_all, fields(source = %source.display()))]
pub fn import<B: RenderBackend + ?Sized>(backend: &mut B, source: &Path) -> Result<PageSet> {
    info!("importing source document");

    let count = backend.open_source(source)?;
    let mut pages = Vec::with_capacity(count as usize);

    for number in 1..=count {
        let (width, height) = backend.import_page(number)?;
        pages.push(PageInfo::new(number, width, height));
    }

    debug!(pages = pages.len(), "source imported");
    Ok(PageSet { pages })
}
