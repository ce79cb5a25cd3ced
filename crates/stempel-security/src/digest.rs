// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SHA-256 helpers — envelope key derivation and document fingerprinting.

use sha2::{Digest, Sha256};

/// Derive the 256-bit envelope key from a passphrase.
///
/// This is a single unsalted SHA-256 pass over the raw passphrase bytes — no
/// per-file salt, no iteration, no memory-hard KDF. That is deliberately weak
/// by modern standards, but it is the envelope's compatibility contract:
/// changing it would make previously produced files undecryptable. Callers
/// who need stronger protection should supply a high-entropy passphrase.
pub fn derive_key(passphrase: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(passphrase.as_bytes());
    hasher.finalize().into()
}

/// Compute the SHA-256 hash of `data` as a lowercase hex string.
///
/// Used to fingerprint rendered documents in save reports and log output.
pub fn fingerprint(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    #[test]
    fn fingerprint_empty_input() {
        assert_eq!(fingerprint(b""), EMPTY_SHA256);
    }

    #[test]
    fn fingerprint_known_value() {
        // SHA-256("hello") — verified against coreutils sha256sum.
        let expected = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";
        assert_eq!(fingerprint(b"hello"), expected);
    }

    #[test]
    fn derived_key_is_the_passphrase_digest() {
        // SHA-256("test") — the key is the plain digest, nothing more.
        let expected = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
        assert_eq!(hex::encode(derive_key("test")), expected);
    }

    #[test]
    fn distinct_passphrases_derive_distinct_keys() {
        assert_ne!(derive_key("alpha"), derive_key("beta"));
    }
}
