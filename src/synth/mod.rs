// Purpose: Voice lifecycle and the block renderer
// Both halves of the engine share one registry behind one lock

pub mod clock;
pub mod handle;
pub mod message;
#[cfg(feature = "rtrb")]
pub mod monitor;
pub mod registry;
pub mod renderer;
pub mod voice;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{config::SynthConfig, error::ConfigResult};

pub use handle::SynthHandle;
pub use message::SynthMessage;
pub use registry::{Trigger, VoiceInfo, VoiceRegistry};
pub use renderer::{BlockRenderer, RenderStats};
pub use voice::{Voice, VoiceKey};

/// Build the engine: an input-side handle and the audio-side renderer,
/// both pointing at the same voice registry.
///
/// The handle is `Clone` and goes to whatever thread reads the keyboard; the
/// renderer moves into the audio callback.
pub fn engine(config: SynthConfig) -> ConfigResult<(SynthHandle, BlockRenderer)> {
    config.validate()?;

    let registry = VoiceRegistry::new(
        clock::from_kind(config.clock, config.sample_rate),
        config.max_voices,
    );
    let shared = Arc::new(Mutex::new(registry));

    log::info!(
        "engine ready: {} Hz, {} frame blocks ({:.1} ms), {} partials, voice ceiling {:?}",
        config.sample_rate,
        config.block_size,
        config.block_duration() * 1000.0,
        config.timbre.partials().len(),
        config.max_voices,
    );

    let renderer = BlockRenderer::new(Arc::clone(&shared), &config);
    let handle = SynthHandle::new(shared);
    Ok((handle, renderer))
}

/// Take the registry lock, recovering it if a previous holder panicked.
///
/// Every registry operation leaves the voice list consistent, so a poisoned
/// lock still guards valid state.
pub(crate) fn lock_registry(shared: &Mutex<VoiceRegistry>) -> MutexGuard<'_, VoiceRegistry> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
