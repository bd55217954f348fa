/// Control events from the input side.
///
/// Pitches are carried as frequencies: the frequency is the voice's identity.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { frequency: f32 },
    /// Key released. The voice is not cut; it keeps decaying.
    NoteOff { frequency: f32 },
    Sustain(bool),
    AllNotesOff,
}
