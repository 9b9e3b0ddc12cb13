//! Pitch identity for keys on the 88-key keyboard.
//!
//! A [`Pitch`] is a pure function of a MIDI note number. It accepts any note
//! number; consumers that only display the 88-key window check
//! [`is_on_keyboard`] themselves.

/// Lowest note on the keyboard (A0)
pub const LOWEST_NOTE: u8 = 21;
/// Highest note on the keyboard (C8)
pub const HIGHEST_NOTE: u8 = 108;
/// Number of keys on the keyboard
pub const KEY_COUNT: usize = 88;
/// Number of natural (white) keys on the keyboard
pub const NATURAL_KEY_COUNT: usize = 52;
/// Middle C
pub const MIDDLE_C: u8 = 60;

/// Pitch names for each chroma class
const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Natural keys preceding each chroma class within an octave
const NATURALS_BEFORE: [i32; 12] = [0, 1, 1, 2, 2, 3, 4, 4, 5, 5, 6, 6];

/// Classification of a note number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub note: i32,
    /// 0 = C, 11 = B
    pub chroma: u8,
    pub octave: i32,
    /// 0-based position among the 88 keys (may fall outside 0..88)
    pub key_index: i32,
    pub is_natural: bool,
}

impl Pitch {
    pub fn new(note: i32) -> Self {
        let chroma = note.rem_euclid(12) as u8;
        Self {
            note,
            chroma,
            octave: note.div_euclid(12),
            key_index: note - LOWEST_NOTE as i32,
            is_natural: is_natural_chroma(chroma),
        }
    }

    pub fn is_accidental(self) -> bool {
        !self.is_natural
    }

    /// Index of this key among the natural keys, counted from A0.
    ///
    /// For accidentals this is the index of the natural key directly above,
    /// so the accidental sits on the boundary at `natural_index * key_width`.
    pub fn natural_index(self) -> i32 {
        let absolute = self.octave * 7 + NATURALS_BEFORE[self.chroma as usize];
        // A0 is the 5th natural of octave 1 (C1 would be index 7)
        absolute - (7 + 5)
    }

    /// Display name, e.g. "C4" or "F#3" (scientific pitch notation)
    pub fn name(self) -> String {
        format!("{}{}", PITCH_NAMES[self.chroma as usize], self.octave - 1)
    }
}

impl From<u8> for Pitch {
    fn from(note: u8) -> Self {
        Self::new(note as i32)
    }
}

/// Whether a chroma class is a natural (white) key
pub fn is_natural_chroma(chroma: u8) -> bool {
    matches!(chroma % 12, 0 | 2 | 4 | 5 | 7 | 9 | 11)
}

/// Whether a note number is inside the displayable 88-key window
pub fn is_on_keyboard(note: i32) -> bool {
    (LOWEST_NOTE as i32..=HIGHEST_NOTE as i32).contains(&note)
}

/// Iterate over all keyboard notes, lowest first
pub fn keyboard_notes() -> impl DoubleEndedIterator<Item = u8> {
    LOWEST_NOTE..=HIGHEST_NOTE
}
