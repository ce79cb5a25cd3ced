// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the stempel-security crate. Measures the
// whole-file envelope on a payload the size of a typical stamped PDF.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use stempel_security::FileEnvelope;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Seal and open a 1 MiB payload.
///
/// Key derivation is included on purpose — it runs once per call in the real
/// save pipeline, so excluding it would flatter the numbers.
fn bench_envelope_round_trip(c: &mut Criterion) {
    let payload: Vec<u8> = (0..1024 * 1024).map(|i| (i % 251) as u8).collect();
    let envelope = FileEnvelope::new("bench-passphrase");

    c.bench_function("envelope_encrypt (1 MiB)", |b| {
        b.iter(|| {
            let sealed = envelope.encrypt(black_box(&payload)).expect("encrypt");
            black_box(sealed);
        });
    });

    let sealed = envelope.encrypt(&payload).expect("encrypt");
    c.bench_function("envelope_decrypt (1 MiB)", |b| {
        b.iter(|| {
            let plain = envelope.decrypt(black_box(&sealed)).expect("decrypt");
            black_box(plain);
        });
    });
}

criterion_group!(benches, bench_envelope_round_trip);
criterion_main!(benches);
