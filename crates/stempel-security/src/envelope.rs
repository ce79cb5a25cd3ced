// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File-level encryption envelope — AES-256-GCM over the rendered output
// bytes, written as `nonce(12) || ciphertext || tag(16)`.

use std::path::Path;

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use stempel_core::error::{Result, StempelError};
use tracing::{debug, instrument};

use crate::digest::derive_key;

/// Length of the random nonce prefixed to every envelope.
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag appended to every envelope.
pub const TAG_LEN: usize = 16;

/// Passphrase-based whole-file encryption envelope.
///
/// The envelope is stateless across invocations — each `encrypt` call draws a
/// fresh random nonce, and the passphrase is held only for the lifetime of
/// this value. The key is a single unsalted SHA-256 of the passphrase (see
/// [`derive_key`] for why this deliberately weak derivation is kept).
pub struct FileEnvelope {
    passphrase: String,
}

impl FileEnvelope {
    /// Create a new envelope handle with the given passphrase.
    pub fn new(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
        }
    }

    fn sealing_key(&self) -> Result<LessSafeKey> {
        let key_bytes = derive_key(&self.passphrase);
        let unbound = UnboundKey::new(&AES_256_GCM, &key_bytes)
            .map_err(|_| StempelError::Encryption("cannot construct AES-256-GCM key".into()))?;
        Ok(LessSafeKey::new(unbound))
    }

    /// Encrypt `plaintext`, returning the full envelope payload
    /// `nonce || ciphertext || tag`.
    #[instrument(skip_all, fields(plaintext_len = plaintext.len()))]
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let key = self.sealing_key()?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        SystemRandom::new()
            .fill(&mut nonce_bytes)
            .map_err(|_| StempelError::Encryption("nonce generation failed".into()))?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut in_out = plaintext.to_vec();
        key.seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| StempelError::Encryption("AES-256-GCM seal failed".into()))?;

        let mut payload = Vec::with_capacity(NONCE_LEN + in_out.len());
        payload.extend_from_slice(&nonce_bytes);
        payload.extend_from_slice(&in_out);

        debug!(payload_len = payload.len(), "envelope sealed");
        Ok(payload)
    }

    /// Decrypt-and-verify an envelope payload, returning the plaintext.
    ///
    /// Fails with `StempelError::Decryption` on a wrong key, tampered
    /// ciphertext, or tag mismatch — garbage plaintext is never returned.
    #[instrument(skip_all, fields(payload_len = payload.len()))]
    pub fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() < NONCE_LEN + TAG_LEN {
            return Err(StempelError::Decryption(format!(
                "payload too short for envelope layout ({} bytes)",
                payload.len()
            )));
        }

        let key = self.sealing_key()?;

        let (nonce_bytes, sealed) = payload.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| StempelError::Decryption("malformed nonce".into()))?;

        // `sealed` is ciphertext followed by the 16-byte tag; ring verifies
        // the tag and unseals in one call.
        let mut in_out = sealed.to_vec();
        let plaintext = key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| {
                StempelError::Decryption("authentication failed (wrong key or tampered data)".into())
            })?;

        debug!(plaintext_len = plaintext.len(), "envelope opened");
        Ok(plaintext.to_vec())
    }

    /// Encrypt the file at `path`, overwriting it in place with the envelope
    /// payload. Returns the number of bytes written.
    ///
    /// The write happens only after the full cryptographic result exists, so
    /// a cipher failure never leaves a half-written envelope behind.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn encrypt_file_in_place(&self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let plaintext = std::fs::read(path)?;
        let payload = self.encrypt(&plaintext)?;
        std::fs::write(path, &payload)?;
        debug!(bytes = payload.len(), "file encrypted in place");
        Ok(payload.len() as u64)
    }

    /// Decrypt the envelope at `input` and write the recovered plaintext
    /// verbatim to `output`.
    ///
    /// On any decryption failure no output file is written.
    #[instrument(skip(self), fields(input = %input.as_ref().display(), output = %output.as_ref().display()))]
    pub fn decrypt_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<u64> {
        let payload = std::fs::read(input.as_ref())?;
        let plaintext = self.decrypt(&payload)?;
        std::fs::write(output.as_ref(), &plaintext)?;
        debug!(bytes = plaintext.len(), "file decrypted");
        Ok(plaintext.len() as u64)
    }
}
