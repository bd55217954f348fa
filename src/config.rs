//! Engine configuration.
//!
//! `SynthConfig::default()` is the tuning of the keyboard piano. Individual
//! values are changed with chained setters and checked once by
//! [`SynthConfig::validate`], which [`crate::synth::engine`] calls before
//! building anything.
//!
//! ```
//! use fire_keys::config::SynthConfig;
//!
//! let config = SynthConfig::default()
//!     .sample_rate(48_000.0)
//!     .volume(0.3)
//!     .max_voices(Some(16));
//! assert!(config.validate().is_ok());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{EnvelopeResolution, EnvelopeShape, Timbre},
    error::{ConfigError, ConfigResult},
    MAX_BLOCK_SIZE,
};

pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;
/// Frames per device callback. Large on purpose: the keyboard is played by
/// hand, so stability matters more than latency.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;
pub const DEFAULT_VOLUME: f32 = 0.45;
/// Seconds; natural fade time of an unpedalled note before frequency scaling.
pub const DEFAULT_BASE_DECAY: f32 = 0.8;
/// Seconds; fade time of every note while the pedal is down.
pub const DEFAULT_SUSTAIN_DECAY: f32 = 2.0;
/// Hz; the pitch at which the base decay is halved.
pub const DEFAULT_DECAY_SCALING: f32 = 1800.0;
pub const DEFAULT_ATTACK: f32 = 0.008;
pub const DEFAULT_SILENCE_THRESHOLD: f32 = 0.001;

/// Where voice ages are measured from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockKind {
    /// Wall-clock monotonic time. Notes start the instant the key is read.
    #[default]
    Monotonic,
    /// Time counted in rendered frames. Notes start at the next block
    /// boundary and rendering is fully deterministic.
    Samples,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub sample_rate: f32,
    /// Frames requested from the device per callback.
    pub block_size: usize,
    /// Master gain, 0.0 to 1.0.
    pub volume: f32,
    pub base_decay: f32,
    pub sustain_decay: f32,
    pub decay_scaling: f32,
    pub attack: f32,
    /// Linear envelope floor at which an unpedalled voice is dropped.
    pub silence_threshold: f32,
    pub envelope_shape: EnvelopeShape,
    pub envelope_resolution: EnvelopeResolution,
    pub timbre: Timbre,
    /// Optional ceiling on simultaneous voices. `None` means unbounded.
    pub max_voices: Option<usize>,
    pub clock: ClockKind,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            volume: DEFAULT_VOLUME,
            base_decay: DEFAULT_BASE_DECAY,
            sustain_decay: DEFAULT_SUSTAIN_DECAY,
            decay_scaling: DEFAULT_DECAY_SCALING,
            attack: DEFAULT_ATTACK,
            silence_threshold: DEFAULT_SILENCE_THRESHOLD,
            envelope_shape: EnvelopeShape::default(),
            envelope_resolution: EnvelopeResolution::default(),
            timbre: Timbre::default(),
            max_voices: None,
            clock: ClockKind::default(),
        }
    }
}

impl SynthConfig {
    pub fn sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn block_size(mut self, frames: usize) -> Self {
        self.block_size = frames;
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn base_decay(mut self, seconds: f32) -> Self {
        self.base_decay = seconds;
        self
    }

    pub fn sustain_decay(mut self, seconds: f32) -> Self {
        self.sustain_decay = seconds;
        self
    }

    pub fn decay_scaling(mut self, hz: f32) -> Self {
        self.decay_scaling = hz;
        self
    }

    pub fn attack(mut self, seconds: f32) -> Self {
        self.attack = seconds;
        self
    }

    pub fn silence_threshold(mut self, level: f32) -> Self {
        self.silence_threshold = level;
        self
    }

    pub fn envelope_shape(mut self, shape: EnvelopeShape) -> Self {
        self.envelope_shape = shape;
        self
    }

    pub fn envelope_resolution(mut self, resolution: EnvelopeResolution) -> Self {
        self.envelope_resolution = resolution;
        self
    }

    pub fn timbre(mut self, timbre: Timbre) -> Self {
        self.timbre = timbre;
        self
    }

    pub fn max_voices(mut self, ceiling: Option<usize>) -> Self {
        self.max_voices = ceiling;
        self
    }

    pub fn clock(mut self, clock: ClockKind) -> Self {
        self.clock = clock;
        self
    }

    /// Seconds of audio in one block: the callback deadline.
    pub fn block_duration(&self) -> f32 {
        self.block_size as f32 / self.sample_rate
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(ConfigError::BlockSize {
                got: self.block_size,
                max: MAX_BLOCK_SIZE,
            });
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::Volume(self.volume));
        }
        check_decay("base decay", self.base_decay)?;
        check_decay("sustain decay", self.sustain_decay)?;
        if !(self.decay_scaling.is_finite() && self.decay_scaling > 0.0) {
            return Err(ConfigError::DecayScaling(self.decay_scaling));
        }
        if !(self.attack.is_finite() && self.attack >= 0.0) {
            return Err(ConfigError::Attack(self.attack));
        }
        if !(self.silence_threshold > 0.0 && self.silence_threshold < 1.0) {
            return Err(ConfigError::SilenceThreshold(self.silence_threshold));
        }
        // Re-check the partials: a deserialized or hand-built timbre may not
        // have gone through Timbre::new.
        Timbre::new(self.timbre.partials().to_vec())?;
        if self.max_voices == Some(0) {
            return Err(ConfigError::ZeroVoices);
        }

        Ok(())
    }
}

fn check_decay(name: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::DecayTime { name, value })
    }
}
