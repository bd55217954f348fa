//! Benchmarks for the struck-string envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fire_keys::dsp::{DecayEnvelope, EnvelopeShape};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 44_100.0;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let dt = 1.0 / SAMPLE_RATE;

        // Attack ramp plus the start of the decay
        let env = DecayEnvelope::new(EnvelopeShape::AttackDecay, 0.008, 0.8, 2.0, 1800.0);
        let decay = env.decay_time(440.0, false);
        group.bench_with_input(BenchmarkId::new("attack_decay", size), &size, |b, _| {
            b.iter(|| {
                for (i, s) in buffer.iter_mut().enumerate() {
                    *s = env.level(black_box(i as f32 * dt), decay);
                }
            })
        });

        // Pure exponential, pedal down
        let env = DecayEnvelope::new(EnvelopeShape::Exponential, 0.0, 0.8, 2.0, 1800.0);
        let decay = env.decay_time(440.0, true);
        group.bench_with_input(BenchmarkId::new("exponential", size), &size, |b, _| {
            b.iter(|| {
                for (i, s) in buffer.iter_mut().enumerate() {
                    *s = env.level(black_box(0.5 + i as f32 * dt), decay);
                }
            })
        });
    }

    group.finish();
}
