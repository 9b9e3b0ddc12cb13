//! Keyboard strip
//!
//! Each cell samples the key under its pixel center, so accidentals cover
//! the upper part of the strip exactly as they are hit-tested.

use ratatui::{layout::Rect, style::Color, Frame};

use super::colors;
use crate::input::terminal::CellScale;
use crate::pitch::Pitch;
use crate::view::PianoView;

pub fn render(frame: &mut Frame, area: Rect, view: &PianoView, scale: CellScale) {
    let layout = view.layout();
    let tracker = view.tracker();
    let first_row = (scale.row_at(layout.keyboard_top()).floor() as u16).min(area.height);
    let buf = frame.buffer_mut();

    for row in first_row..area.height {
        let y = (row as f64 + 0.5) * scale.cell_height;
        let mut previous: Option<u8> = None;

        for col in 0..area.width {
            let x = (col as f64 + 0.5) * scale.cell_width;
            let Some(note) = layout.key_at(x, y) else {
                previous = None;
                continue;
            };
            let pitch = Pitch::from(note);

            let bg = match tracker.display_color_for(note) {
                Some(color) => colors::parse(color),
                None if pitch.is_natural => colors::NATURAL_KEY,
                None => colors::ACCIDENTAL_KEY,
            };
            let boundary = previous.is_some_and(|p| p != note)
                && pitch.is_natural
                && previous.is_some_and(|p| Pitch::from(p).is_natural);
            previous = Some(note);

            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                cell.set_bg(bg);
                if boundary {
                    cell.set_char('▏').set_fg(colors::KEY_SEPARATOR);
                } else {
                    cell.set_char(' ');
                }
            }
        }
    }

    // Octave labels on the bottom row
    if area.height == 0 || first_row >= area.height {
        return;
    }
    let label_row = area.y + area.height - 1;
    for note in layout.visible_notes() {
        let pitch = Pitch::from(note);
        if pitch.chroma != 0 {
            continue;
        }
        let key = layout.key_geometry(note);
        let col = (scale.col_at(key.x).round() as i64) + 1;
        let name = pitch.name();
        if col < 0 || col as usize + name.len() > area.width as usize {
            continue;
        }
        for (i, ch) in name.chars().enumerate() {
            if let Some(cell) = buf.cell_mut((area.x + col as u16 + i as u16, label_row)) {
                cell.set_char(ch).set_fg(Color::DarkGray);
            }
        }
    }
}
