use crate::synth::{
    clock::Clock,
    voice::{Voice, VoiceKey},
};

/// Voices reserved up front when no ceiling is configured.
const INITIAL_VOICE_CAPACITY: usize = 32;

/// What a note-on did to the registry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// A new voice was added.
    Started,
    /// The pitch was already sounding and restarted from its onset.
    Retriggered,
    /// The voice ceiling was reached; the oldest voice made room.
    Stole(VoiceKey),
    /// The frequency was not a playable pitch.
    Ignored,
}

/// Read-only view of a voice for status displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceInfo {
    pub frequency: f32,
    pub age: f64,
    pub held: bool,
}

/// All sounding voices plus the sustain pedal, behind one lock.
///
/// Voices are kept in a flat list keyed by frequency. Counts are small and
/// the renderer walks every voice each block anyway, so a linear lookup is
/// cheaper than hashing and never rehashes on the audio thread.
pub struct VoiceRegistry {
    voices: Vec<Voice>,
    sustain: bool,
    max_voices: Option<usize>,
    clock: Box<dyn Clock>,
}

impl VoiceRegistry {
    pub fn new(clock: Box<dyn Clock>, max_voices: Option<usize>) -> Self {
        let capacity = max_voices.unwrap_or(INITIAL_VOICE_CAPACITY);
        Self {
            voices: Vec::with_capacity(capacity),
            sustain: false,
            max_voices,
            clock,
        }
    }

    /// Start (or restart) the voice for `frequency` at the current time.
    pub fn note_on(&mut self, frequency: f32) -> Trigger {
        if !(frequency.is_finite() && frequency > 0.0) {
            return Trigger::Ignored;
        }

        let now = self.clock.now();
        let key = VoiceKey::new(frequency);
        if let Some(voice) = self.voices.iter_mut().find(|v| v.key() == key) {
            voice.retrigger(now);
            return Trigger::Retriggered;
        }

        let stolen = match self.max_voices {
            Some(ceiling) if self.voices.len() >= ceiling => self.evict_oldest(),
            _ => None,
        };

        self.voices.push(Voice::new(frequency, now));
        match stolen {
            Some(key) => Trigger::Stole(key),
            None => Trigger::Started,
        }
    }

    /// Mark the key as released. The voice keeps ringing and decays on its
    /// own; returns false if no voice has this frequency.
    pub fn note_off(&mut self, frequency: f32) -> bool {
        let key = VoiceKey::new(frequency);
        match self.voices.iter_mut().find(|v| v.key() == key) {
            Some(voice) => {
                voice.release();
                true
            }
            None => false,
        }
    }

    pub fn set_sustain(&mut self, active: bool) {
        self.sustain = active;
    }

    pub fn sustain_active(&self) -> bool {
        self.sustain
    }

    /// Drop every voice the renderer marked as decayed during its pass.
    ///
    /// The set of keys to remove travels on the voices themselves, so this
    /// is a single in-place `retain` and never allocates.
    pub fn remove_decayed(&mut self) -> usize {
        let before = self.voices.len();
        self.voices.retain(|voice| !voice.is_decayed());
        before - self.voices.len()
    }

    /// Silence everything immediately.
    pub fn all_notes_off(&mut self) {
        self.voices.clear();
    }

    fn evict_oldest(&mut self) -> Option<VoiceKey> {
        let oldest = self
            .voices
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.start_time().total_cmp(&b.start_time()))
            .map(|(idx, _)| idx)?;
        Some(self.voices.swap_remove(oldest).key())
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn contains(&self, frequency: f32) -> bool {
        let key = VoiceKey::new(frequency);
        self.voices.iter().any(|v| v.key() == key)
    }

    pub fn voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    pub fn voice(&self, frequency: f32) -> Option<&Voice> {
        let key = VoiceKey::new(frequency);
        self.voices.iter().find(|v| v.key() == key)
    }

    pub fn max_voices(&self) -> Option<usize> {
        self.max_voices
    }

    /// Current time on the registry's clock.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Ages and held state of every voice. Allocates; not for the audio thread.
    pub fn snapshot(&self) -> Vec<VoiceInfo> {
        let now = self.clock.now();
        self.voices
            .iter()
            .map(|v| VoiceInfo {
                frequency: v.frequency(),
                age: v.age(now),
                held: v.is_held(),
            })
            .collect()
    }

    pub(crate) fn voices_mut(&mut self) -> &mut [Voice] {
        &mut self.voices
    }

    /// Move the clock past a block that started at `block_start`.
    pub(crate) fn advance_clock(&mut self, block_start: f64, frames: usize, sample_rate: f32) {
        self.clock.advance(block_start, frames, sample_rate);
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.voices.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::clock::SampleClock;

    fn registry(max_voices: Option<usize>) -> VoiceRegistry {
        VoiceRegistry::new(Box::new(SampleClock::new(44_100.0)), max_voices)
    }

    #[test]
    fn same_frequency_collapses_into_one_voice() {
        let mut reg = registry(None);

        assert_eq!(reg.note_on(440.0), Trigger::Started);
        assert_eq!(reg.note_on(440.0), Trigger::Retriggered);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn retrigger_restarts_the_onset() {
        let mut reg = registry(None);
        reg.note_on(440.0);
        reg.voices_mut()[0].set_phase(1.5);
        reg.advance_clock(reg.now(), 44_100, 44_100.0);

        reg.note_on(440.0);
        let voice = reg.voice(440.0).unwrap();
        assert_eq!(voice.phase(), 0.0);
        assert!((voice.start_time() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unplayable_frequencies_are_ignored() {
        let mut reg = registry(None);

        assert_eq!(reg.note_on(0.0), Trigger::Ignored);
        assert_eq!(reg.note_on(-220.0), Trigger::Ignored);
        assert_eq!(reg.note_on(f32::NAN), Trigger::Ignored);
        assert_eq!(reg.note_on(f32::INFINITY), Trigger::Ignored);
        assert!(reg.is_empty());
    }

    #[test]
    fn note_off_only_releases() {
        let mut reg = registry(None);
        reg.note_on(261.63);

        assert!(reg.note_off(261.63));
        assert!(!reg.note_off(523.25));
        assert_eq!(reg.len(), 1);
        assert!(!reg.voice(261.63).unwrap().is_held());
    }

    #[test]
    fn remove_decayed_drops_only_marked_voices() {
        let mut reg = registry(None);
        for f in [220.0, 440.0, 880.0] {
            reg.note_on(f);
        }
        assert_eq!(reg.remove_decayed(), 0);

        for voice in reg.voices_mut() {
            if voice.frequency() != 440.0 {
                voice.mark_decayed();
            }
        }
        assert_eq!(reg.remove_decayed(), 2);
        assert!(reg.contains(440.0));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn ceiling_steals_the_oldest_voice() {
        let mut reg = registry(Some(2));
        reg.note_on(220.0);
        reg.advance_clock(reg.now(), 100, 44_100.0);
        reg.note_on(330.0);
        reg.advance_clock(reg.now(), 100, 44_100.0);

        assert_eq!(reg.note_on(440.0), Trigger::Stole(VoiceKey::new(220.0)));
        assert_eq!(reg.len(), 2);
        assert!(!reg.contains(220.0));
        assert!(reg.contains(330.0) && reg.contains(440.0));

        // Retriggering a sounding pitch never steals
        assert_eq!(reg.note_on(330.0), Trigger::Retriggered);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn sustain_and_all_notes_off() {
        let mut reg = registry(None);
        reg.note_on(110.0);
        reg.note_on(220.0);

        reg.set_sustain(true);
        assert!(reg.sustain_active());

        reg.all_notes_off();
        assert!(reg.is_empty());
        assert!(reg.sustain_active());
    }

    #[test]
    fn snapshot_reports_ages() {
        let mut reg = registry(None);
        reg.note_on(440.0);
        reg.advance_clock(reg.now(), 22_050, 44_100.0);

        let snapshot = reg.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].frequency, 440.0);
        assert!((snapshot[0].age - 0.5).abs() < 1e-9);
        assert!(snapshot[0].held);
    }
}
