// Purpose - turn physical key events into synth control messages
//
// This is the only place that knows about the octave shift: the engine only
// ever sees frequencies.

use std::collections::HashMap;

use crate::{
    notes::{NoteName, PitchClass},
    synth::message::SynthMessage,
};

/// Furthest the octave shift may move from the home position.
pub const MAX_OCTAVE_SHIFT: i8 = 3;

/// A key as the translator sees it, independent of the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Space,
    Escape,
    Up,
    Down,
}

/// How the space bar drives the sustain pedal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SustainMode {
    /// Pedal down while space is held. Needs key release events.
    #[default]
    Hold,
    /// Each press flips the pedal. For terminals that only report presses.
    Toggle,
}

/// Result of a key event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    NoteOn(f32),
    NoteOff(f32),
    Sustain(bool),
    OctaveChanged(i8),
    Quit,
}

impl Action {
    /// The engine message for this action, if it has one.
    pub fn message(self) -> Option<SynthMessage> {
        match self {
            Action::NoteOn(frequency) => Some(SynthMessage::NoteOn { frequency }),
            Action::NoteOff(frequency) => Some(SynthMessage::NoteOff { frequency }),
            Action::Sustain(active) => Some(SynthMessage::Sustain(active)),
            Action::OctaveChanged(_) | Action::Quit => None,
        }
    }
}

/// Character → note assignments at octave shift 0.
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    keys: HashMap<char, NoteName>,
}

impl KeyboardLayout {
    /// Two-row piano layout.
    ///
    /// ```text
    ///   2 3 4   6 7        s d   g h j   l ;
    ///  q w e r t y u      z x c v b n m , . /
    ///  F4 ........ E5     C3 ............... E4
    /// ```
    pub fn piano() -> Self {
        use PitchClass::*;

        let rows: [(char, PitchClass, i8); 29] = [
            // Lower row: C3 to E4
            ('z', C, 3),
            ('s', Cs, 3),
            ('x', D, 3),
            ('d', Ds, 3),
            ('c', E, 3),
            ('v', F, 3),
            ('g', Fs, 3),
            ('b', G, 3),
            ('h', Gs, 3),
            ('n', A, 3),
            ('j', As, 3),
            ('m', B, 3),
            (',', C, 4),
            ('l', Cs, 4),
            ('.', D, 4),
            (';', Ds, 4),
            ('/', E, 4),
            // Upper row: F4 to E5
            ('q', F, 4),
            ('2', Fs, 4),
            ('w', G, 4),
            ('3', Gs, 4),
            ('e', A, 4),
            ('4', As, 4),
            ('r', B, 4),
            ('t', C, 5),
            ('6', Cs, 5),
            ('y', D, 5),
            ('7', Ds, 5),
            ('u', E, 5),
        ];

        let keys = rows
            .into_iter()
            .map(|(c, pitch, octave)| (c, NoteName::new(pitch, octave)))
            .collect();
        Self { keys }
    }

    pub fn note(&self, c: char) -> Option<NoteName> {
        self.keys.get(&c.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::piano()
    }
}

/// Stateful key → action translation.
///
/// Owns the octave shift and remembers which frequency each held key
/// started, so a release after an octave change still names the right voice.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    layout: KeyboardLayout,
    octave: i8,
    sustain_mode: SustainMode,
    sustain: bool,
    held: HashMap<char, f32>,
}

impl InputTranslator {
    pub fn new(layout: KeyboardLayout, sustain_mode: SustainMode) -> Self {
        Self {
            layout,
            octave: 0,
            sustain_mode,
            sustain: false,
            held: HashMap::new(),
        }
    }

    pub fn press(&mut self, key: Key) -> Option<Action> {
        match key {
            Key::Escape => Some(Action::Quit),
            Key::Space => {
                let active = match self.sustain_mode {
                    SustainMode::Hold => true,
                    SustainMode::Toggle => !self.sustain,
                };
                self.set_sustain(active)
            }
            Key::Up | Key::Char('=') => self.shift_octave(1),
            Key::Down | Key::Char('-') => self.shift_octave(-1),
            Key::Char(c) => {
                let c = c.to_ascii_lowercase();
                let frequency = self
                    .layout
                    .note(c)?
                    .transpose(self.octave)?
                    .frequency()?;
                self.held.insert(c, frequency);
                Some(Action::NoteOn(frequency))
            }
        }
    }

    pub fn release(&mut self, key: Key) -> Option<Action> {
        match key {
            Key::Space if self.sustain_mode == SustainMode::Hold => self.set_sustain(false),
            Key::Char(c) => self
                .held
                .remove(&c.to_ascii_lowercase())
                .map(Action::NoteOff),
            _ => None,
        }
    }

    fn set_sustain(&mut self, active: bool) -> Option<Action> {
        if self.sustain == active {
            return None;
        }
        self.sustain = active;
        Some(Action::Sustain(active))
    }

    fn shift_octave(&mut self, delta: i8) -> Option<Action> {
        let octave = (self.octave + delta).clamp(-MAX_OCTAVE_SHIFT, MAX_OCTAVE_SHIFT);
        if octave == self.octave {
            return None;
        }
        self.octave = octave;
        Some(Action::OctaveChanged(octave))
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn sustain(&self) -> bool {
        self.sustain
    }

    pub fn sustain_mode(&self) -> SustainMode {
        self.sustain_mode
    }
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::new(KeyboardLayout::piano(), SustainMode::default())
    }
}
