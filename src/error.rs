//! Error types for engine construction.
//!
//! Rendering itself never fails: a block is always produced, even if it is
//! silence. Only configuration can be rejected.

use thiserror::Error;

/// Reasons a [`SynthConfig`](crate::config::SynthConfig) is rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    SampleRate(f32),

    #[error("block size must be between 1 and {max} frames, got {got}")]
    BlockSize { got: usize, max: usize },

    #[error("volume must be within 0.0..=1.0, got {0}")]
    Volume(f32),

    /// A decay time (base or sustain) that is zero, negative or not finite.
    #[error("{name} must be a positive number of seconds, got {value}")]
    DecayTime { name: &'static str, value: f32 },

    #[error("decay scaling must be a positive frequency in Hz, got {0}")]
    DecayScaling(f32),

    #[error("attack time must be zero or positive, got {0}")]
    Attack(f32),

    #[error("silence threshold must be within (0.0, 1.0), got {0}")]
    SilenceThreshold(f32),

    #[error("timbre needs at least one partial")]
    EmptyTimbre,

    /// Partials must be ordered by harmonic with strictly decreasing weights.
    #[error("partial {index} breaks harmonic ordering or decreasing weight")]
    PartialOrder { index: usize },

    #[error("voice ceiling must allow at least one voice")]
    ZeroVoices,
}

/// Result type for configuration checks
pub type ConfigResult<T> = Result<T, ConfigError>;
