//! Whole-engine renders.
//!
//! Voices are held with the pedal down and a long sustain decay so none of
//! them is evicted while criterion iterates.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use fire_keys::{
    config::{ClockKind, SynthConfig},
    dsp::EnvelopeResolution,
    notes::PIANO_FREQUENCIES,
    synth::{engine, BlockRenderer, SynthHandle},
};

use crate::BLOCK_SIZES;

const VOICE_COUNTS: &[usize] = &[1, 8, 32];

fn held_chord(config: SynthConfig, voices: usize) -> (SynthHandle, BlockRenderer) {
    let (handle, renderer) = engine(
        config
            .clock(ClockKind::Samples)
            .sustain_decay(10_000.0),
    )
    .expect("bench config is valid");

    handle.set_sustain(true);
    // Spread across the keyboard, low to high
    let stride = PIANO_FREQUENCIES.len() / voices;
    for &(_, frequency) in PIANO_FREQUENCIES.iter().step_by(stride.max(1)).take(voices) {
        handle.note_on(frequency);
    }
    (handle, renderer)
}

pub fn bench_polyphony(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/polyphony");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for &voices in VOICE_COUNTS {
            let (_handle, mut renderer) = held_chord(SynthConfig::default(), voices);
            group.bench_with_input(
                BenchmarkId::new(format!("{voices}_voices"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        renderer.render(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    group.finish();
}

/// Per-sample envelope against one level per block, 8 voices.
pub fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/resolution");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, resolution) in [
            ("per_sample", EnvelopeResolution::PerSample),
            ("block_end", EnvelopeResolution::BlockEnd),
        ] {
            let config = SynthConfig::default().envelope_resolution(resolution);
            let (_handle, mut renderer) = held_chord(config, 8);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    renderer.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
