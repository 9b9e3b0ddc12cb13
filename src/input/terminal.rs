//! Terminal mouse adapter
//!
//! Converts crossterm mouse events (in cells) into [`PointerEvent`]s (in
//! pixels). Each cell is treated as a `cell_width` x `cell_height` pixel box
//! and events land on the cell's center.

use crossterm::event::{KeyModifiers, MouseButton as TermButton, MouseEvent, MouseEventKind};

use super::event::{MouseButton, PointerEvent};

/// Pixels of wheel delta per scroll notch
const WHEEL_NOTCH_PX: f64 = 40.0;

/// Cell-to-pixel scale of the terminal host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellScale {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl Default for CellScale {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            cell_height: 16.0,
        }
    }
}

impl CellScale {
    /// Container size in pixels for a terminal area in cells
    pub fn pixel_size(&self, cols: u16, rows: u16) -> (f64, f64) {
        (cols as f64 * self.cell_width, rows as f64 * self.cell_height)
    }

    /// Pixel center of a cell, relative to an origin cell
    pub fn to_pixels(&self, col: u16, row: u16, origin: (u16, u16)) -> (f64, f64) {
        let col = col as f64 - origin.0 as f64;
        let row = row as f64 - origin.1 as f64;
        ((col + 0.5) * self.cell_width, (row + 0.5) * self.cell_height)
    }

    /// Cell column for a pixel x, relative to the origin
    pub fn col_at(&self, x: f64) -> f64 {
        x / self.cell_width
    }

    /// Cell row for a pixel y, relative to the origin
    pub fn row_at(&self, y: f64) -> f64 {
        y / self.cell_height
    }
}

fn button(button: TermButton) -> MouseButton {
    match button {
        TermButton::Left => MouseButton::Primary,
        TermButton::Right => MouseButton::Secondary,
        TermButton::Middle => MouseButton::Middle,
    }
}

/// Translate a terminal mouse event; `origin` is the top-left cell of the view
pub fn translate(event: MouseEvent, scale: CellScale, origin: (u16, u16)) -> Option<PointerEvent> {
    let (x, y) = scale.to_pixels(event.column, event.row, origin);
    // Shift turns vertical scrolling into horizontal panning
    let horizontal = event.modifiers.contains(KeyModifiers::SHIFT);
    let wheel = |delta: f64, sideways: bool| {
        if sideways {
            PointerEvent::Wheel { x, y, delta_x: delta, delta_y: 0.0 }
        } else {
            PointerEvent::Wheel { x, y, delta_x: 0.0, delta_y: delta }
        }
    };

    let translated = match event.kind {
        MouseEventKind::Down(b) => PointerEvent::MouseDown { x, y, button: button(b) },
        MouseEventKind::Up(b) => PointerEvent::MouseUp { x, y, button: button(b) },
        MouseEventKind::Drag(_) | MouseEventKind::Moved => PointerEvent::MouseMove { x, y },
        MouseEventKind::ScrollUp => wheel(-WHEEL_NOTCH_PX, horizontal),
        MouseEventKind::ScrollDown => wheel(WHEEL_NOTCH_PX, horizontal),
        MouseEventKind::ScrollLeft => wheel(-WHEEL_NOTCH_PX, true),
        MouseEventKind::ScrollRight => wheel(WHEEL_NOTCH_PX, true),
    };

    // Events above or left of the view's origin are outside the container
    if event.column < origin.0 || event.row < origin.1 {
        return match translated {
            PointerEvent::MouseMove { .. } | PointerEvent::MouseUp { .. } => {
                Some(PointerEvent::MouseLeave)
            }
            _ => None,
        };
    }
    Some(translated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_event(kind: MouseEventKind, x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column: x,
            row: y,
            modifiers: KeyModifiers::empty(),
        }
    }

    #[test]
    fn test_click_maps_to_cell_center() {
        let scale = CellScale::default();
        let event = translate(make_event(MouseEventKind::Down(TermButton::Left), 10, 2), scale, (0, 0));
        assert_eq!(
            event,
            Some(PointerEvent::MouseDown { x: 84.0, y: 40.0, button: MouseButton::Primary })
        );
    }

    #[test]
    fn test_origin_offset() {
        let scale = CellScale::default();
        let event = translate(make_event(MouseEventKind::Moved, 11, 3), scale, (1, 1));
        assert_eq!(event, Some(PointerEvent::MouseMove { x: 84.0, y: 40.0 }));
    }

    #[test]
    fn test_drag_is_move() {
        let scale = CellScale::default();
        let event = translate(make_event(MouseEventKind::Drag(TermButton::Left), 0, 0), scale, (0, 0));
        assert!(matches!(event, Some(PointerEvent::MouseMove { .. })));
    }

    #[test]
    fn test_scroll() {
        let scale = CellScale::default();
        let event = translate(make_event(MouseEventKind::ScrollDown, 0, 0), scale, (0, 0));
        assert!(matches!(event, Some(PointerEvent::Wheel { delta_x, delta_y, .. }) if delta_x == 0.0 && delta_y == 40.0));

        let mut shifted = make_event(MouseEventKind::ScrollUp, 0, 0);
        shifted.modifiers = KeyModifiers::SHIFT;
        let event = translate(shifted, scale, (0, 0));
        assert!(matches!(event, Some(PointerEvent::Wheel { delta_x, delta_y, .. }) if delta_x == -40.0 && delta_y == 0.0));
    }

    #[test]
    fn test_outside_origin_leaves() {
        let scale = CellScale::default();
        let event = translate(make_event(MouseEventKind::Moved, 0, 0), scale, (1, 1));
        assert_eq!(event, Some(PointerEvent::MouseLeave));
        let event = translate(make_event(MouseEventKind::Down(TermButton::Left), 0, 0), scale, (1, 1));
        assert_eq!(event, None);
    }

    #[test]
    fn test_pixel_size() {
        assert_eq!(CellScale::default().pixel_size(80, 24), (640.0, 384.0));
    }
}
