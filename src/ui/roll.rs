//! Note roll - blocks rising above the keyboard

use ratatui::{layout::Rect, Frame};

use super::{cell_span, colors};
use crate::input::terminal::CellScale;
use crate::pitch::Pitch;
use crate::view::PianoView;

pub fn render(frame: &mut Frame, area: Rect, view: &PianoView, scale: CellScale) {
    let layout = view.layout();
    let roll_rows = (scale.row_at(layout.keyboard_top()).floor() as u16).min(area.height);
    let buf = frame.buffer_mut();

    for row in 0..roll_rows {
        for col in 0..area.width {
            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                cell.set_char(' ').set_bg(colors::ROLL_BACKGROUND);
            }
        }
    }

    // Octave guides
    for note in layout.visible_notes() {
        if Pitch::from(note).chroma != 0 {
            continue;
        }
        let lane = layout.key_geometry(note);
        let col = scale.col_at(lane.x).round();
        if col < 0.0 || col >= area.width as f64 {
            continue;
        }
        for row in 0..roll_rows {
            if let Some(cell) = buf.cell_mut((area.x + col as u16, area.y + row)) {
                cell.set_char('│').set_fg(colors::OCTAVE_LINE);
            }
        }
    }

    for block in view.roll().rects(layout) {
        let Some((c0, c1)) = cell_span(block.x, block.width, scale.cell_width, area.width) else {
            continue;
        };
        let Some((r0, r1)) = cell_span(block.y, block.height, scale.cell_height, roll_rows) else {
            continue;
        };
        let color = colors::parse(&block.color);
        for row in r0..r1 {
            for col in c0..c1 {
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_char(' ').set_bg(color);
                }
            }
        }
    }
}
