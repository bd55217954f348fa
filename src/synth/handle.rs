use std::sync::{Arc, Mutex};

use crate::synth::{
    lock_registry,
    message::SynthMessage,
    registry::{Trigger, VoiceInfo, VoiceRegistry},
};

/// Input-thread half of the engine.
///
/// Each call takes the registry lock for a single short operation. Logging
/// happens after the lock is released.
#[derive(Clone)]
pub struct SynthHandle {
    inner: Arc<Mutex<VoiceRegistry>>,
}

impl SynthHandle {
    pub(crate) fn new(inner: Arc<Mutex<VoiceRegistry>>) -> Self {
        Self { inner }
    }

    pub fn note_on(&self, frequency: f32) -> Trigger {
        let trigger = self.with_registry(|reg| reg.note_on(frequency));
        match trigger {
            Trigger::Ignored => log::debug!("ignored note on at {frequency} Hz"),
            Trigger::Stole(key) => log::debug!(
                "note on {frequency:.2} Hz, voice ceiling reached, dropped {:.2} Hz",
                key.frequency()
            ),
            _ => log::debug!("note on {frequency:.2} Hz ({trigger:?})"),
        }
        trigger
    }

    pub fn note_off(&self, frequency: f32) -> bool {
        let found = self.with_registry(|reg| reg.note_off(frequency));
        log::trace!("note off {frequency:.2} Hz (sounding: {found})");
        found
    }

    pub fn set_sustain(&self, active: bool) {
        self.with_registry(|reg| reg.set_sustain(active));
        log::debug!("sustain {}", if active { "on" } else { "off" });
    }

    pub fn all_notes_off(&self) {
        self.with_registry(VoiceRegistry::all_notes_off);
        log::debug!("all notes off");
    }

    /// Apply a control message.
    pub fn send(&self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { frequency } => {
                self.note_on(frequency);
            }
            SynthMessage::NoteOff { frequency } => {
                self.note_off(frequency);
            }
            SynthMessage::Sustain(active) => self.set_sustain(active),
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    pub fn active_voices(&self) -> usize {
        self.with_registry(|reg| reg.len())
    }

    pub fn sustain_active(&self) -> bool {
        self.with_registry(|reg| reg.sustain_active())
    }

    pub fn snapshot(&self) -> Vec<VoiceInfo> {
        self.with_registry(|reg| reg.snapshot())
    }

    /// Run `f` with the registry locked.
    pub fn with_registry<R>(&self, f: impl FnOnce(&mut VoiceRegistry) -> R) -> R {
        let mut registry = lock_registry(&self.inner);
        f(&mut registry)
    }
}
