mod envelope;
mod timbre;

pub use envelope::bench_envelope;
pub use timbre::bench_timbre;
