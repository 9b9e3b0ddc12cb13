//! Active note bookkeeping shared by the keyboard and the roll.
//!
//! Each note keeps an ordered list of presses, oldest first. Several sources
//! can hold the same note at once; the most recent press decides the color
//! shown, but every press is tracked until its own release.

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::pitch::{self, Pitch};

/// One hold of one note
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveKeyPress {
    pub pitch: Pitch,
    pub color: String,
    /// Source of the press; `None` presses are released last-in first-out
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ActiveNoteTracker {
    notes: BTreeMap<u8, Vec<ActiveKeyPress>>,
}

fn keyboard_note(note: i32) -> Result<u8, ValidationError> {
    if pitch::is_on_keyboard(note) {
        Ok(note as u8)
    } else {
        Err(ValidationError::NoteOutOfRange(note))
    }
}

impl ActiveNoteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note_on(
        &mut self,
        note: i32,
        color: &str,
        identifier: Option<&str>,
    ) -> Result<(), ValidationError> {
        let note = keyboard_note(note)?;
        self.notes.entry(note).or_default().push(ActiveKeyPress {
            pitch: Pitch::from(note),
            color: color.to_string(),
            identifier: identifier.map(str::to_string),
        });
        Ok(())
    }

    /// Release a press.
    ///
    /// With an identifier, the latest press carrying it is removed. Without
    /// one, the latest anonymous press is removed.
    pub fn note_off(&mut self, note: i32, identifier: Option<&str>) -> Result<(), ValidationError> {
        let key = keyboard_note(note)?;
        let unknown = || ValidationError::UnknownPress {
            note: key,
            identifier: identifier.map(str::to_string),
        };

        let presses = self.notes.get_mut(&key).ok_or_else(unknown)?;
        let index = presses
            .iter()
            .rposition(|p| p.identifier.as_deref() == identifier)
            .ok_or_else(unknown)?;
        presses.remove(index);
        if presses.is_empty() {
            self.notes.remove(&key);
        }
        Ok(())
    }

    /// Color of the most recent press of a note
    pub fn display_color_for(&self, note: u8) -> Option<&str> {
        self.notes
            .get(&note)
            .and_then(|presses| presses.last())
            .map(|p| p.color.as_str())
    }

    pub fn is_active(&self, note: u8) -> bool {
        self.notes.contains_key(&note)
    }

    pub fn presses(&self, note: u8) -> &[ActiveKeyPress] {
        self.notes.get(&note).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sounding notes, ascending
    pub fn active_notes(&self) -> impl Iterator<Item = u8> + '_ {
        self.notes.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }
}
