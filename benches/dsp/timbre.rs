//! Benchmarks for the harmonic partial sum.

use std::{f32::consts::TAU, hint::black_box};

use criterion::{BenchmarkId, Criterion};
use fire_keys::dsp::Timbre;

use crate::BLOCK_SIZES;

pub fn bench_timbre(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/timbre");
    let step = TAU * 440.0 / 44_100.0;

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, timbre) in [("piano", Timbre::piano()), ("bright", Timbre::bright())] {
            let audible = timbre.audible(440.0, 44_100.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (i, s) in buffer.iter_mut().enumerate() {
                        *s = timbre.sample(black_box(step * i as f32), audible);
                    }
                })
            });
        }
    }

    group.finish();
}
