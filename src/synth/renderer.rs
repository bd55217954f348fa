use std::{
    f32::consts::TAU,
    f64::consts::TAU as TAU_F64,
    sync::{Arc, Mutex},
};

use crate::{
    config::SynthConfig,
    dsp::{saturation::soft_limit, DecayEnvelope, EnvelopeResolution, Timbre},
    synth::{lock_registry, registry::VoiceRegistry},
};

/// What happened during one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Voices mixed into the block.
    pub voices: usize,
    /// Voices that fell silent and were removed after the block.
    pub evicted: usize,
}

/// Audio-thread half of the engine.
///
/// Each call to [`render`](Self::render) mixes every registered voice into
/// the output, advances their phase and age by exactly one block, drops the
/// ones that have decayed, and normalizes the sum.
pub struct BlockRenderer {
    shared: Arc<Mutex<VoiceRegistry>>,
    sample_rate: f32,
    volume: f32,
    silence_threshold: f32,
    envelope: DecayEnvelope,
    resolution: EnvelopeResolution,
    timbre: Timbre,
}

impl BlockRenderer {
    pub(crate) fn new(shared: Arc<Mutex<VoiceRegistry>>, config: &SynthConfig) -> Self {
        Self {
            shared,
            sample_rate: config.sample_rate,
            volume: config.volume,
            silence_threshold: config.silence_threshold,
            envelope: DecayEnvelope::from_config(config),
            resolution: config.envelope_resolution,
            timbre: config.timbre.clone(),
        }
    }

    /// Fill `out` with the next `out.len()` samples of the mix.
    pub fn render(&mut self, out: &mut [f32]) -> RenderStats {
        out.fill(0.0);
        let frames = out.len();
        if frames == 0 {
            return RenderStats::default();
        }

        let dt = 1.0 / self.sample_rate;
        let mut registry = lock_registry(&self.shared);
        let now = registry.now();
        let sustain = registry.sustain_active();

        let mut voices = 0;

        for voice in registry.voices_mut() {
            let frequency = voice.frequency();
            let age = voice.age(now) as f32;
            let decay = self.envelope.decay_time(frequency, sustain);
            let end_age = block_end_age(age, frames, self.sample_rate);
            let end_level = self.envelope.level(end_age, decay);

            let audible = self.timbre.audible(frequency, self.sample_rate);
            let phase0 = voice.phase();
            let step = TAU * frequency * dt;

            match self.resolution {
                EnvelopeResolution::PerSample => {
                    for (i, sample) in out.iter_mut().enumerate() {
                        let t = i as f32 * dt;
                        let level = self.envelope.level(age + t, decay);
                        let phase = phase0 + step * i as f32;
                        *sample += self.timbre.sample(phase, audible) * level;
                    }
                }
                EnvelopeResolution::BlockEnd => {
                    for (i, sample) in out.iter_mut().enumerate() {
                        let phase = phase0 + step * i as f32;
                        *sample += self.timbre.sample(phase, audible) * end_level;
                    }
                }
            }

            // Next block starts where this one would have continued
            let advance = TAU_F64 * frequency as f64 * frames as f64 / self.sample_rate as f64;
            voice.set_phase(((phase0 as f64 + advance) % TAU_F64) as f32);
            voices += 1;

            if !sustain
                && self.envelope.attack_finished(end_age)
                && end_level <= self.silence_threshold
            {
                voice.mark_decayed();
            }
        }

        let evicted = registry.remove_decayed();
        registry.advance_clock(now, frames, self.sample_rate);
        drop(registry);

        if voices > 0 {
            let gain = self.volume / (voices as f32).sqrt();
            for sample in out.iter_mut() {
                *sample = soft_limit(*sample * gain);
            }
        }

        RenderStats { voices, evicted }
    }

    /// Envelope level a voice of `frequency` would have at the last sample
    /// of a `frames`-long block that starts at `age`. This is the value the
    /// silence check compares against the threshold.
    pub fn end_level(&self, frequency: f32, age: f32, frames: usize, sustain: bool) -> f32 {
        let decay = self.envelope.decay_time(frequency, sustain);
        self.envelope
            .level(block_end_age(age, frames, self.sample_rate), decay)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }
}

#[inline]
fn block_end_age(age: f32, frames: usize, sample_rate: f32) -> f32 {
    let dt = 1.0 / sample_rate;
    age + frames.saturating_sub(1) as f32 * dt
}

#[cfg(test)]
mod tests {
    use crate::{
        config::{ClockKind, SynthConfig},
        dsp::{EnvelopeResolution, EnvelopeShape},
        synth::{engine, lock_registry},
    };

    fn config() -> SynthConfig {
        SynthConfig::default().clock(ClockKind::Samples)
    }

    #[test]
    fn empty_registry_renders_silence() {
        let (_handle, mut renderer) = engine(config()).unwrap();
        let mut out = vec![1.0f32; 512];

        let stats = renderer.render(&mut out);

        assert_eq!(stats.voices, 0);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn zero_length_block_is_a_no_op() {
        let (handle, mut renderer) = engine(config()).unwrap();
        handle.note_on(440.0);

        let stats = renderer.render(&mut []);
        assert_eq!(stats.voices, 0);
        assert_eq!(handle.active_voices(), 1);
    }

    #[test]
    fn phase_is_continuous_across_blocks() {
        let (handle, mut renderer) = engine(config().attack(0.0)).unwrap();
        handle.note_on(440.0);

        let mut first = vec![0.0f32; 256];
        let mut second = vec![0.0f32; 256];
        renderer.render(&mut first);
        renderer.render(&mut second);

        // One long render of the same span must agree sample for sample
        let (handle2, mut renderer2) = engine(config().attack(0.0)).unwrap();
        handle2.note_on(440.0);
        let mut joined = vec![0.0f32; 512];
        renderer2.render(&mut joined);

        for (i, (&a, &b)) in first.iter().chain(&second).zip(&joined).enumerate() {
            assert!((a - b).abs() < 1e-3, "sample {i}: {a} vs {b}");
        }
    }

    #[test]
    fn block_end_resolution_holds_one_level() {
        let cfg = config()
            .attack(0.0)
            .envelope_resolution(EnvelopeResolution::BlockEnd);
        let (handle, mut renderer) = engine(cfg).unwrap();
        handle.note_on(440.0);

        let mut out = vec![0.0f32; 1024];
        renderer.render(&mut out);

        // Same waveform as a constant-envelope voice, scaled by one factor
        let expected_level = renderer.end_level(440.0, 0.0, 1024, false);
        let timbre = crate::dsp::Timbre::piano();
        let step = std::f32::consts::TAU * 440.0 / 44_100.0;
        for i in [1usize, 100, 500, 1023] {
            let raw = timbre.sample(step * i as f32, 3) * expected_level * renderer.volume();
            assert!((out[i] - raw).abs() < 1e-4, "sample {i}");
        }
    }

    #[test]
    fn mass_eviction_happens_in_place() {
        let cfg = config()
            .envelope_shape(EnvelopeShape::Exponential)
            .base_decay(0.001);
        let (handle, mut renderer) = engine(cfg).unwrap();
        for i in 0..100 {
            handle.note_on(100.0 + i as f32 * 10.0);
        }
        let capacity = handle.with_registry(|reg| reg.capacity());

        let mut out = vec![0.0f32; 4096];
        let stats = renderer.render(&mut out);

        assert_eq!(stats.voices, 100);
        assert_eq!(stats.evicted, 100);
        assert_eq!(handle.active_voices(), 0);
        // Nothing on the render path grew the voice storage
        assert_eq!(lock_registry(&renderer.shared).capacity(), capacity);
    }

    #[test]
    fn wall_clock_ages_advance_across_back_to_back_blocks() {
        let cfg = SynthConfig::default()
            .clock(ClockKind::Monotonic)
            .sustain_decay(100.0);
        let (handle, mut renderer) = engine(cfg).unwrap();
        handle.set_sustain(true);
        handle.note_on(440.0);

        // Two chunks of one device callback, rendered with no wall time between them
        let mut out = vec![0.0f32; 4096];
        renderer.render(&mut out);
        renderer.render(&mut out);

        let age = handle.snapshot()[0].age;
        assert!(age >= 8192.0 / 44_100.0 - 1e-6, "age {age}");
    }
}
