//! Low-level DSP math used by the block renderer.
//!
//! Everything here is allocation-free and realtime-safe. These are plain
//! functions and small value types; voice bookkeeping and locking live in
//! [`crate::synth`].

/// Attack ramp and frequency-dependent exponential decay.
pub mod envelope;
/// Additive timbre: a fixed set of weighted harmonic partials.
pub mod partials;
/// Output stage limiter.
pub mod saturation;

pub use envelope::{DecayEnvelope, EnvelopeResolution, EnvelopeShape};
pub use partials::{Partial, Timbre};
