//! UI rendering using ratatui
//!
//! A thin backend over the view: layout geometry is converted from pixels to
//! cells with the host's [`CellScale`], nothing here changes view state.

mod colors;
mod keyboard;
mod roll;
mod status;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::input::terminal::CellScale;
use crate::view::PianoView;

/// Split the terminal into status bar and piano view
fn split(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status bar
            Constraint::Min(1),    // Roll + keyboard
        ])
        .split(area);
    (chunks[0], chunks[1])
}

/// Area the piano view occupies; its size in pixels is the view's container size
pub fn view_area(area: Rect) -> Rect {
    split(area).1
}

/// Main render function - draws the entire UI
pub fn render(frame: &mut Frame, view: &PianoView, scale: CellScale) {
    let (status_area, view_area) = split(frame.area());

    status::render(frame, status_area, view);
    roll::render(frame, view_area, view, scale);
    keyboard::render(frame, view_area, view, scale);
}

/// Cell span [start, end) covering a pixel span, clipped to `limit` cells
fn cell_span(start_px: f64, len_px: f64, cell: f64, limit: u16) -> Option<(u16, u16)> {
    if cell <= 0.0 || len_px <= 0.0 {
        return None;
    }
    let start = (start_px / cell).round().max(0.0);
    let end = ((start_px + len_px) / cell).round().min(limit as f64);
    if end <= start {
        return None;
    }
    Some((start as u16, end as u16))
}
