#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::SynthConfig;

/*
Struck-String Envelope
======================

A piano-like note has no sustain stage: once the hammer hits the string the
energy only drains away. This module models that with a short linear attack
followed by an exponential decay, evaluated directly from the voice's age
rather than stepped sample by sample.

Vocabulary
----------

  age          Seconds since the note was struck. The envelope is a pure
               function of age, so any block can be evaluated in isolation.

  decay        Time constant (tau) of the exponential fall, in seconds.
               After `decay` seconds the level is 1/e ≈ 0.37 of its peak.

  attack       Length of the linear 0 → 1 ramp at note onset. Without it the
               amplitude jumps from 0 to full in one sample, which is an
               audible click.

  sustain      The pedal, not an ADSR stage. While held, every voice uses
               the long `sustain_decay` time constant instead of its own.


The Shape
---------

  Level
    1.0 ┐ ╱╲
        │╱  ╲
        │     ╲_
        │       ╲__
        │          ╲____
    0.0 └──────────────────────→ Age
         A      exp(-(age - A) / decay)

  level(age) = age / A                     for age <  A
             = exp(-(age - A) / decay)     for age >= A

Both pieces meet at exactly 1.0, so the curve is continuous. After the
attack it is strictly decreasing for any fixed decay.


Frequency-Dependent Decay
-------------------------

High strings lose their energy faster than low ones. The base decay is
shortened as pitch rises:

    decay(f) = BASE_DECAY * S / (f + S)

S (`decay_scaling`, in Hz) is the frequency at which the decay is halved:

    f = 0      → BASE_DECAY
    f = S      → BASE_DECAY / 2
    f = 3S     → BASE_DECAY / 4

With the pedal down the formula is bypassed and every voice uses
SUSTAIN_DECAY, so low and high notes ring equally long.
*/

/// Which envelope curve a voice follows.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeShape {
    /// `exp(-age / decay)` from the first sample. Starts at full level.
    Exponential,
    /// Linear attack ramp, then exponential decay.
    #[default]
    AttackDecay,
}

/// How finely the envelope is evaluated inside one block.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeResolution {
    /// Evaluate at every sample's age.
    #[default]
    PerSample,
    /// Evaluate once at the block's last sample and hold it for the whole
    /// block. Cheaper, but the amplitude moves in audible steps at large
    /// block sizes.
    BlockEnd,
}

/// Envelope parameters shared by all voices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayEnvelope {
    shape: EnvelopeShape,
    attack: f32,
    base_decay: f32,
    sustain_decay: f32,
    decay_scaling: f32,
}

impl DecayEnvelope {
    pub fn new(
        shape: EnvelopeShape,
        attack: f32,
        base_decay: f32,
        sustain_decay: f32,
        decay_scaling: f32,
    ) -> Self {
        Self {
            shape,
            attack: attack.max(0.0),
            base_decay,
            sustain_decay,
            decay_scaling,
        }
    }

    pub fn from_config(config: &SynthConfig) -> Self {
        Self::new(
            config.envelope_shape,
            config.attack,
            config.base_decay,
            config.sustain_decay,
            config.decay_scaling,
        )
    }

    /// Decay time constant for a voice at `frequency`.
    #[inline]
    pub fn decay_time(&self, frequency: f32, sustain: bool) -> f32 {
        if sustain {
            self.sustain_decay
        } else {
            self.base_decay * (self.decay_scaling / (frequency + self.decay_scaling))
        }
    }

    /// Envelope level at `age` seconds for time constant `decay`.
    #[inline]
    pub fn level(&self, age: f32, decay: f32) -> f32 {
        let age = age.max(0.0);
        match self.shape {
            EnvelopeShape::Exponential => (-age / decay).exp(),
            EnvelopeShape::AttackDecay => {
                if age < self.attack {
                    age / self.attack
                } else {
                    (-(age - self.attack) / decay).exp()
                }
            }
        }
    }

    /// True once the voice has left its attack ramp.
    ///
    /// A voice is never a removal candidate before this: early in the ramp
    /// its level is below any silence threshold.
    #[inline]
    pub fn attack_finished(&self, age: f32) -> bool {
        match self.shape {
            EnvelopeShape::Exponential => true,
            EnvelopeShape::AttackDecay => age >= self.attack,
        }
    }

    pub fn attack(&self) -> f32 {
        self.attack
    }
}
