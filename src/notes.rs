/*
Piano Frequency Table
=====================

Equal-tempered pitches of the playable range, A0 (27.50 Hz) to C6
(1046.50 Hz), rounded to two decimals. A4 = 440 Hz is the tuning reference.

Names use sharps only: "C#4", never "Db4". The table is the single source
of playable pitches; a name that is not in it (A#0, or anything above C6)
has no frequency, and a key that maps to it produces no note.

The octave number follows scientific pitch notation, so it changes between
B and C: B3 → C4 is one semitone.
*/

use std::{fmt, str::FromStr};

/// The twelve pitch classes, sharps only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    pub fn as_str(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "C" => PitchClass::C,
            "C#" => PitchClass::Cs,
            "D" => PitchClass::D,
            "D#" => PitchClass::Ds,
            "E" => PitchClass::E,
            "F" => PitchClass::F,
            "F#" => PitchClass::Fs,
            "G" => PitchClass::G,
            "G#" => PitchClass::Gs,
            "A" => PitchClass::A,
            "A#" => PitchClass::As,
            "B" => PitchClass::B,
            _ => return None,
        })
    }
}

/// A pitch class in a specific octave, e.g. `C#4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteName {
    pub pitch: PitchClass,
    pub octave: i8,
}

impl NoteName {
    pub const fn new(pitch: PitchClass, octave: i8) -> Self {
        Self { pitch, octave }
    }

    /// Same pitch class, `octaves` higher (or lower if negative).
    pub fn transpose(self, octaves: i8) -> Option<Self> {
        Some(Self {
            pitch: self.pitch,
            octave: self.octave.checked_add(octaves)?,
        })
    }

    /// Frequency from the piano table, if the note is in range.
    pub fn frequency(self) -> Option<f32> {
        self.table_index()
            .and_then(|index| PIANO_FREQUENCIES.get(index))
            .map(|&(_, freq)| freq)
    }

    /// Position in `PIANO_FREQUENCIES`, computed from the semitone number
    /// (C0 = 0). The table starts with A0 and B0, then runs chromatically
    /// from C1 (semitone 12) to C6 (semitone 72).
    fn table_index(self) -> Option<usize> {
        let semitone = i32::from(self.octave) * 12 + self.pitch as i32;
        match semitone {
            9 => Some(0),
            11 => Some(1),
            12..=72 => Some((semitone - 10) as usize),
            _ => None,
        }
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch.as_str(), self.octave)
    }
}

/// Error for strings that are not a note name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a note name: {0:?}")]
pub struct ParseNoteError(pub String);

impl FromStr for NoteName {
    type Err = ParseNoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(|| ParseNoteError(s.to_string()))?;
        let (pitch, octave) = s.split_at(split);

        let pitch = PitchClass::parse(pitch).ok_or_else(|| ParseNoteError(s.to_string()))?;
        let octave = octave
            .parse::<i8>()
            .map_err(|_| ParseNoteError(s.to_string()))?;
        Ok(Self { pitch, octave })
    }
}

/// Look up a note by name, e.g. `frequency("A4") == Some(440.0)`.
pub fn frequency(name: &str) -> Option<f32> {
    name.parse::<NoteName>().ok()?.frequency()
}

pub const PIANO_FREQUENCIES: [(&str, f32); 63] = [
    ("A0", 27.50),
    ("B0", 30.87),
    // Octave 1
    ("C1", 32.70),
    ("C#1", 34.65),
    ("D1", 36.71),
    ("D#1", 38.89),
    ("E1", 41.20),
    ("F1", 43.65),
    ("F#1", 46.25),
    ("G1", 49.00),
    ("G#1", 51.91),
    ("A1", 55.00),
    ("A#1", 58.27),
    ("B1", 61.74),
    // Octave 2
    ("C2", 65.41),
    ("C#2", 69.30),
    ("D2", 73.42),
    ("D#2", 77.78),
    ("E2", 82.41),
    ("F2", 87.31),
    ("F#2", 92.50),
    ("G2", 98.00),
    ("G#2", 103.83),
    ("A2", 110.00),
    ("A#2", 116.54),
    ("B2", 123.47),
    // Octave 3
    ("C3", 130.81),
    ("C#3", 138.59),
    ("D3", 146.83),
    ("D#3", 155.56),
    ("E3", 164.81),
    ("F3", 174.61),
    ("F#3", 185.00),
    ("G3", 196.00),
    ("G#3", 207.65),
    ("A3", 220.00),
    ("A#3", 233.08),
    ("B3", 246.94),
    // Octave 4 (Middle C octave)
    ("C4", 261.63),
    ("C#4", 277.18),
    ("D4", 293.66),
    ("D#4", 311.13),
    ("E4", 329.63),
    ("F4", 349.23),
    ("F#4", 370.00),
    ("G4", 392.00),
    ("G#4", 415.30),
    ("A4", 440.00), // A440 tuning reference
    ("A#4", 466.16),
    ("B4", 493.88),
    // Octave 5
    ("C5", 523.25),
    ("C#5", 554.37),
    ("D5", 587.33),
    ("D#5", 622.25),
    ("E5", 659.26),
    ("F5", 698.46),
    ("F#5", 739.99),
    ("G5", 783.99),
    ("G#5", 830.61),
    ("A5", 880.00),
    ("A#5", 932.33),
    ("B5", 987.77),
    // Octave 6
    ("C6", 1046.50),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_entry_parses() {
        for (name, freq) in PIANO_FREQUENCIES {
            let note: NoteName = name.parse().unwrap();
            assert_eq!(note.to_string(), name);
            assert_eq!(note.frequency(), Some(freq));
        }
    }

    #[test]
    fn positional_lookup_agrees_with_table_names() {
        use PitchClass::*;
        let classes = [C, Cs, D, Ds, E, F, Fs, G, Gs, A, As, B];

        let mut found = 0;
        for octave in -1..=8 {
            for pitch in classes {
                let note = NoteName::new(pitch, octave);
                let by_name = PIANO_FREQUENCIES
                    .iter()
                    .find(|(name, _)| *name == note.to_string())
                    .map(|&(_, freq)| freq);
                assert_eq!(note.frequency(), by_name, "{note}");
                found += usize::from(by_name.is_some());
            }
        }
        assert_eq!(found, PIANO_FREQUENCIES.len());
    }

    #[test]
    fn reference_pitches() {
        assert_eq!(frequency("A4"), Some(440.0));
        assert_eq!(frequency("C4"), Some(261.63));
        assert_eq!(frequency("C6"), Some(1046.50));
    }

    #[test]
    fn out_of_table_notes_have_no_frequency() {
        assert_eq!(frequency("A#0"), None);
        assert_eq!(frequency("C#6"), None);
        assert_eq!(frequency("C-1"), None);
        assert_eq!(frequency("H4"), None);
        assert_eq!(frequency(""), None);
    }

    #[test]
    fn transpose_by_octaves() {
        let c3 = NoteName::new(PitchClass::C, 3);
        assert_eq!(c3.transpose(2).unwrap().frequency(), Some(523.25));
        assert_eq!(c3.transpose(-1).unwrap().to_string(), "C2");
        assert_eq!(NoteName::new(PitchClass::C, i8::MAX).transpose(1), None);
    }

    #[test]
    fn table_rises_monotonically() {
        for pair in PIANO_FREQUENCIES.windows(2) {
            assert!(pair[0].1 < pair[1].1, "{} !< {}", pair[0].0, pair[1].0);
        }
    }
}
