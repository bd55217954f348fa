pub mod config; // Engine tuning and validation
pub mod dsp;
pub mod error;
pub mod input; // Keyboard → note translation
pub mod notes;
pub mod synth; // Voice registry and block renderer

/// Largest block the engine accepts from a device callback.
pub const MAX_BLOCK_SIZE: usize = 8192;
