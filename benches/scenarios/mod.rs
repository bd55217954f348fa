mod polyphony;

pub use polyphony::{bench_polyphony, bench_resolution};
