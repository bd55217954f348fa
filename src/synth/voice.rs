use std::f32::consts::TAU;

/// Identity of a voice: the exact bit pattern of its frequency.
///
/// Two note-ons for the same pitch share a key, so they collapse into one
/// voice and the second restarts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceKey(u32);

impl VoiceKey {
    pub fn new(frequency: f32) -> Self {
        Self(frequency.to_bits())
    }

    pub fn frequency(self) -> f32 {
        f32::from_bits(self.0)
    }
}

/// One sounding note.
#[derive(Debug, Clone, Copy)]
pub struct Voice {
    key: VoiceKey,
    phase: f32,
    start_time: f64,
    held: bool,
    // Set by the renderer, swept by `VoiceRegistry::remove_decayed`
    decayed: bool,
}

impl Voice {
    pub(crate) fn new(frequency: f32, start_time: f64) -> Self {
        Self {
            key: VoiceKey::new(frequency),
            phase: 0.0,
            start_time,
            held: true,
            decayed: false,
        }
    }

    /// Restart the note from its onset.
    pub(crate) fn retrigger(&mut self, start_time: f64) {
        self.phase = 0.0;
        self.start_time = start_time;
        self.held = true;
        self.decayed = false;
    }

    pub(crate) fn release(&mut self) {
        self.held = false;
    }

    /// Flag the voice for removal at the end of the render pass.
    pub(crate) fn mark_decayed(&mut self) {
        self.decayed = true;
    }

    /// Store the phase the next block starts from, wrapped into [0, 2π).
    pub(crate) fn set_phase(&mut self, phase: f32) {
        let wrapped = phase.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        self.phase = if wrapped >= TAU { 0.0 } else { wrapped };
    }

    pub fn key(&self) -> VoiceKey {
        self.key
    }

    pub fn frequency(&self) -> f32 {
        self.key.frequency()
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Seconds since onset, never negative.
    pub fn age(&self, now: f64) -> f64 {
        (now - self.start_time).max(0.0)
    }

    /// Whether the key that started this voice is still down.
    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn is_decayed(&self) -> bool {
        self.decayed
    }
}
