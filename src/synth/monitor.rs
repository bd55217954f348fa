//! Deadline reporting for the audio callback.
//!
//! The renderer itself never measures or logs anything. The sink wraps each
//! render in [`RenderMonitor::render`], which times it against the block's
//! real-time budget and pushes a small `Copy` report into a lock-free ring.
//! A non-realtime thread drains the ring and decides what to log.
//!
//! ```text
//!   audio callback                        main thread
//!   ──────────────                        ───────────
//!   RenderMonitor::render ──► rtrb ring ──► ReportReceiver::drain ──► log
//!        (never blocks,                        (may allocate,
//!         drops on full)                        may log)
//! ```

use std::time::{Duration, Instant};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::synth::renderer::{BlockRenderer, RenderStats};

/// Timing and voice counts for one rendered block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderReport {
    pub frames: usize,
    pub voices: usize,
    pub evicted: usize,
    /// Wall time spent inside the renderer.
    pub elapsed: Duration,
    /// Audio time the block represents: `frames / sample_rate`.
    pub deadline: Duration,
}

impl RenderReport {
    /// True if rendering took longer than the audio it produced.
    pub fn overran(&self) -> bool {
        self.elapsed > self.deadline
    }

    /// Fraction of the deadline spent rendering.
    pub fn load(&self) -> f32 {
        if self.deadline.is_zero() {
            return 0.0;
        }
        self.elapsed.as_secs_f32() / self.deadline.as_secs_f32()
    }
}

/// Audio-side end: times renders and publishes reports.
pub struct RenderMonitor {
    tx: Producer<RenderReport>,
    dropped: u64,
}

/// Control-side end: drains reports.
pub struct ReportReceiver {
    rx: Consumer<RenderReport>,
}

/// Create a connected monitor pair with room for `capacity` pending reports.
pub fn monitor(capacity: usize) -> (RenderMonitor, ReportReceiver) {
    let (tx, rx) = RingBuffer::<RenderReport>::new(capacity.max(1));
    (RenderMonitor { tx, dropped: 0 }, ReportReceiver { rx })
}

impl RenderMonitor {
    /// Render one block through `renderer` and report on it.
    pub fn render(&mut self, renderer: &mut BlockRenderer, out: &mut [f32]) -> RenderStats {
        let started = Instant::now();
        let stats = renderer.render(out);
        let elapsed = started.elapsed();

        let report = RenderReport {
            frames: out.len(),
            voices: stats.voices,
            evicted: stats.evicted,
            elapsed,
            deadline: Duration::from_secs_f64(out.len() as f64 / renderer.sample_rate() as f64),
        };
        if self.tx.push(report).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
        }

        stats
    }

    /// Reports lost because the ring was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl ReportReceiver {
    /// Pop every pending report.
    pub fn drain(&mut self) -> impl Iterator<Item = RenderReport> + '_ {
        std::iter::from_fn(move || self.rx.pop().ok())
    }
}
