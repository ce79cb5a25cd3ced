// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stamp module — queued overlay operations and position/transform resolution.

pub mod position;
pub mod queue;

pub use position::Anchor;
pub use queue::{StampContent, StampOp, StampQueue};
