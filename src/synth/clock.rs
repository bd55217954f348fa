use std::time::Instant;

use crate::config::ClockKind;

/// Time source for voice ages, in seconds.
///
/// The registry owns its clock and reads it under the same lock as the
/// voices, so note-on timestamps and render ages always come from one source.
pub trait Clock: Send {
    fn now(&self) -> f64;

    /// Called by the renderer after each block with the time it read at
    /// the start of that block.
    fn advance(&mut self, block_start: f64, frames: usize, sample_rate: f32);
}

/// Monotonic wall-clock time since the clock was created.
///
/// Never reads earlier than the end of the last rendered block. A device
/// callback that is split into several blocks renders them back to back in
/// almost no wall time; without the floor every block would see the same
/// `now` and the envelopes would repeat instead of moving on.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
    rendered_until: f64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            rendered_until: 0.0,
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64().max(self.rendered_until)
    }

    fn advance(&mut self, block_start: f64, frames: usize, sample_rate: f32) {
        let end = block_start + frames as f64 / sample_rate as f64;
        self.rendered_until = self.rendered_until.max(end);
    }
}

/// Time counted in rendered frames.
///
/// Exact and reproducible: one block of `frames` always moves time forward
/// by exactly `frames / sample_rate`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleClock {
    frames: u64,
    sample_rate: f64,
}

impl SampleClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: 0,
            sample_rate: sample_rate as f64,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Clock for SampleClock {
    fn now(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.frames as f64 / self.sample_rate
        } else {
            0.0
        }
    }

    fn advance(&mut self, _block_start: f64, frames: usize, sample_rate: f32) {
        self.frames += frames as u64;
        self.sample_rate = sample_rate as f64;
    }
}

pub(crate) fn from_kind(kind: ClockKind, sample_rate: f32) -> Box<dyn Clock> {
    match kind {
        ClockKind::Monotonic => Box::new(MonotonicClock::new()),
        ClockKind::Samples => Box::new(SampleClock::new(sample_rate)),
    }
}
