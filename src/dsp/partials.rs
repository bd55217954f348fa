#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/*
Additive Timbre
===============

Instead of shaping a rich waveform with a filter, an additive voice builds
its tone directly from a handful of sine waves at integer multiples of the
fundamental (the partials):

    wave(φ) = Σ wₖ · sin(hₖ·φ + θₖ) / Σ wₖ

  φ   fundamental phase in radians
  hₖ  harmonic number (1 = fundamental, 2 = octave, 3 = octave + fifth, ...)
  wₖ  relative weight, strictly decreasing with harmonic
  θₖ  small fixed phase offset; breaks the perfect alignment of the peaks so
      the summed waveform is less spiky

Dividing by the weight sum keeps a single voice within [-1, 1] whatever the
partial set is, so the master volume means the same thing for every timbre.

Aliasing
--------

A partial at hₖ·f ≥ sample_rate / 2 cannot be represented and folds back
as an inharmonic tone. Partials are ordered by harmonic, so the audible set
for a given pitch is always a prefix of the list; `audible` returns its
length once per block and the per-sample loop never checks Nyquist.
*/

/// One sine component of the timbre.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partial {
    /// Integer multiple of the fundamental.
    pub harmonic: u32,
    /// Relative amplitude.
    pub weight: f32,
    /// Fixed phase offset in radians.
    pub phase_offset: f32,
}

impl Partial {
    pub const fn new(harmonic: u32, weight: f32, phase_offset: f32) -> Self {
        Self {
            harmonic,
            weight,
            phase_offset,
        }
    }
}

/// A validated, ordered set of partials.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Partial>", into = "Vec<Partial>")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Timbre {
    partials: Vec<Partial>,
    total_weight: f32,
}

impl Timbre {
    /// Build a timbre, rejecting empty or badly ordered partial lists.
    pub fn new(partials: Vec<Partial>) -> ConfigResult<Self> {
        if partials.is_empty() {
            return Err(ConfigError::EmptyTimbre);
        }

        for (index, partial) in partials.iter().enumerate() {
            let valid = partial.harmonic >= 1
                && partial.weight.is_finite()
                && partial.weight > 0.0
                && partial.phase_offset.is_finite();
            let ordered = match index.checked_sub(1).map(|prev| &partials[prev]) {
                Some(prev) => partial.harmonic > prev.harmonic && partial.weight < prev.weight,
                None => true,
            };
            if !valid || !ordered {
                return Err(ConfigError::PartialOrder { index });
            }
        }

        let total_weight = partials.iter().map(|p| p.weight).sum();
        Ok(Self {
            partials,
            total_weight,
        })
    }

    /// Fundamental plus 2nd and 3rd harmonics: warm, slightly hollow.
    pub fn piano() -> Self {
        Self::from_trusted(vec![
            Partial::new(1, 1.0, 0.0),
            Partial::new(2, 0.6, 0.02),
            Partial::new(3, 0.3, 0.03),
        ])
    }

    /// Adds a 4th harmonic and flattens the upper weights for a brighter edge.
    pub fn bright() -> Self {
        Self::from_trusted(vec![
            Partial::new(1, 1.0, 0.0),
            Partial::new(2, 0.5, 0.02),
            Partial::new(3, 0.25, 0.03),
            Partial::new(4, 0.12, 0.04),
        ])
    }

    fn from_trusted(partials: Vec<Partial>) -> Self {
        let total_weight = partials.iter().map(|p| p.weight).sum();
        Self {
            partials,
            total_weight,
        }
    }

    pub fn partials(&self) -> &[Partial] {
        &self.partials
    }

    /// Number of leading partials below Nyquist for a voice at `frequency`.
    #[inline]
    pub fn audible(&self, frequency: f32, sample_rate: f32) -> usize {
        let nyquist = sample_rate * 0.5;
        self.partials
            .iter()
            .take_while(|p| p.harmonic as f32 * frequency < nyquist)
            .count()
    }

    /// Waveform value at fundamental phase `phase`, using the first
    /// `audible` partials.
    #[inline]
    pub fn sample(&self, phase: f32, audible: usize) -> f32 {
        let mut sum = 0.0;
        for partial in &self.partials[..audible.min(self.partials.len())] {
            sum += partial.weight * (partial.harmonic as f32 * phase + partial.phase_offset).sin();
        }
        sum / self.total_weight
    }
}

impl Default for Timbre {
    fn default() -> Self {
        Self::piano()
    }
}

impl TryFrom<Vec<Partial>> for Timbre {
    type Error = ConfigError;

    fn try_from(partials: Vec<Partial>) -> Result<Self, Self::Error> {
        Self::new(partials)
    }
}

impl From<Timbre> for Vec<Partial> {
    fn from(timbre: Timbre) -> Self {
        timbre.partials
    }
}
