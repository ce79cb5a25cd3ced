// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// stempel-security — Output protection for the Stempel stamping engine.
//
// Provides the whole-file authenticated-encryption envelope (AES-256-GCM over
// the rendered document bytes) and the SHA-256 digest helpers used for key
// derivation and document fingerprinting.

pub mod digest;
pub mod envelope;

pub use digest::{derive_key, fingerprint};
pub use envelope::{FileEnvelope, NONCE_LEN, TAG_LEN};
