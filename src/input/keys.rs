//! Keyboard strip input - which key each pointer is holding
//!
//! Each input stream (the mouse, or one touch identifier) holds at most one
//! note. Streams are independent: releasing one never touches another.
//!
//! # Invariants
//!
//! 1. A glide onto a new key emits `KeyUp(old)` and `KeyDown(new)` from the
//!    same event, in that order, so a stream is never seen holding two notes.
//! 2. A stream whose pointer leaves the keyboard strip is released, even if
//!    the move skipped over every key edge.

use std::collections::HashMap;
use std::fmt;

use crate::context::HostContext;
use crate::layout::Layout;

use super::event::{MouseButton, PointerEvent};

/// A source of key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputStream {
    Mouse,
    Touch(u64),
}

impl fmt::Display for InputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputStream::Mouse => write!(f, "mouse"),
            InputStream::Touch(id) => write!(f, "touch-{}", id),
        }
    }
}

/// Key transitions for the host
#[derive(Debug, Clone, PartialEq)]
pub enum KeyAction {
    KeyDown {
        note: u8,
        stream: InputStream,
        /// Caller-supplied color for the press, if any
        color: Option<String>,
    },
    KeyUp {
        note: u8,
        stream: InputStream,
    },
}

impl KeyAction {
    pub fn note(&self) -> u8 {
        match self {
            KeyAction::KeyDown { note, .. } | KeyAction::KeyUp { note, .. } => *note,
        }
    }
}

#[derive(Debug)]
pub struct KeyInputController {
    ctx: HostContext,
    held: HashMap<InputStream, u8>,
    press_color: Option<String>,
}

impl KeyInputController {
    pub fn new(ctx: HostContext) -> Self {
        Self {
            ctx,
            held: HashMap::new(),
            press_color: None,
        }
    }

    /// Color to attach to key-down actions (None = host default)
    pub fn set_press_color(&mut self, color: Option<String>) {
        self.press_color = color;
    }

    pub fn held_note(&self, stream: InputStream) -> Option<u8> {
        self.held.get(&stream).copied()
    }

    /// All held notes, ascending
    pub fn held_notes(&self) -> Vec<u8> {
        let mut notes: Vec<u8> = self.held.values().copied().collect();
        notes.sort_unstable();
        notes
    }

    pub fn handle(&mut self, event: &PointerEvent, layout: &Layout) -> Vec<KeyAction> {
        let mut actions = Vec::new();
        if self.ctx.is_disposed() {
            return actions;
        }

        match *event {
            PointerEvent::MouseDown { x, y, button } if button == MouseButton::Primary => {
                self.press(InputStream::Mouse, x, y, layout, &mut actions);
            }
            PointerEvent::MouseMove { x, y } => {
                self.slide(InputStream::Mouse, x, y, layout, &mut actions);
            }
            PointerEvent::MouseUp { button, .. } if button == MouseButton::Primary => {
                self.release(InputStream::Mouse, &mut actions);
            }
            PointerEvent::MouseLeave => {
                self.release(InputStream::Mouse, &mut actions);
            }
            PointerEvent::TouchStart { id, x, y } => {
                self.press(InputStream::Touch(id), x, y, layout, &mut actions);
            }
            PointerEvent::TouchMove { id, x, y } => {
                self.slide(InputStream::Touch(id), x, y, layout, &mut actions);
            }
            PointerEvent::TouchEnd { id } | PointerEvent::TouchCancel { id } => {
                self.release(InputStream::Touch(id), &mut actions);
            }
            _ => {}
        }

        actions
    }

    /// Release every held key, e.g. when the view is torn down
    pub fn release_all(&mut self) -> Vec<KeyAction> {
        let mut held: Vec<(InputStream, u8)> = self.held.drain().collect();
        held.sort_by_key(|&(_, note)| note);
        held.into_iter()
            .map(|(stream, note)| KeyAction::KeyUp { note, stream })
            .collect()
    }

    fn press(
        &mut self,
        stream: InputStream,
        x: f64,
        y: f64,
        layout: &Layout,
        actions: &mut Vec<KeyAction>,
    ) {
        // A stale hold (missed release) is closed before the new press
        self.release(stream, actions);
        if let Some(note) = layout.key_at(x, y) {
            self.held.insert(stream, note);
            actions.push(KeyAction::KeyDown {
                note,
                stream,
                color: self.press_color.clone(),
            });
        }
    }

    fn slide(
        &mut self,
        stream: InputStream,
        x: f64,
        y: f64,
        layout: &Layout,
        actions: &mut Vec<KeyAction>,
    ) {
        let Some(&held) = self.held.get(&stream) else {
            return;
        };
        match layout.key_at(x, y) {
            Some(note) if note == held => {}
            Some(note) => {
                actions.push(KeyAction::KeyUp { note: held, stream });
                self.held.insert(stream, note);
                actions.push(KeyAction::KeyDown {
                    note,
                    stream,
                    color: self.press_color.clone(),
                });
            }
            None => {
                tracing::debug!(%stream, note = held, "pointer left keyboard");
                self.release(stream, actions);
            }
        }
    }

    fn release(&mut self, stream: InputStream, actions: &mut Vec<KeyAction>) {
        if let Some(note) = self.held.remove(&stream) {
            actions.push(KeyAction::KeyUp { note, stream });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;

    fn setup() -> (HostContext, KeyInputController, Layout) {
        let ctx = HostContext::new();
        let layout = Layout::new(LayoutConfig::default(), 640.0, 400.0);
        (ctx.clone(), KeyInputController::new(ctx), layout)
    }

    /// A point low on a natural key, below any accidental
    fn natural_point(layout: &Layout, note: u8) -> (f64, f64) {
        let key = layout.key_geometry(note);
        (key.x + key.width / 2.0, layout.height() - 2.0)
    }

    /// A point on an accidental key
    fn accidental_point(layout: &Layout, note: u8) -> (f64, f64) {
        let key = layout.key_geometry(note);
        (key.x + key.width / 2.0, layout.keyboard_top() + 2.0)
    }

    #[test]
    fn test_press_and_release() {
        let (_, mut keys, layout) = setup();
        let (x, y) = natural_point(&layout, 60);

        let actions = keys.handle(&PointerEvent::MouseDown { x, y, button: MouseButton::Primary }, &layout);
        assert_eq!(
            actions,
            vec![KeyAction::KeyDown { note: 60, stream: InputStream::Mouse, color: None }]
        );
        assert_eq!(keys.held_note(InputStream::Mouse), Some(60));

        let actions = keys.handle(&PointerEvent::MouseUp { x, y, button: MouseButton::Primary }, &layout);
        assert_eq!(actions, vec![KeyAction::KeyUp { note: 60, stream: InputStream::Mouse }]);
        assert_eq!(keys.held_note(InputStream::Mouse), None);
    }

    #[test]
    fn test_press_over_roll_does_nothing() {
        let (_, mut keys, layout) = setup();
        let actions = keys.handle(
            &PointerEvent::MouseDown { x: 100.0, y: 100.0, button: MouseButton::Primary },
            &layout,
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn test_glide_to_accidental() {
        let (_, mut keys, layout) = setup();
        let (x, y) = natural_point(&layout, 60);
        keys.handle(&PointerEvent::MouseDown { x, y, button: MouseButton::Primary }, &layout);

        let (x, y) = accidental_point(&layout, 61);
        let actions = keys.handle(&PointerEvent::MouseMove { x, y }, &layout);
        assert_eq!(
            actions,
            vec![
                KeyAction::KeyUp { note: 60, stream: InputStream::Mouse },
                KeyAction::KeyDown { note: 61, stream: InputStream::Mouse, color: None },
            ]
        );
    }

    #[test]
    fn test_move_within_key_is_quiet() {
        let (_, mut keys, layout) = setup();
        let (x, y) = natural_point(&layout, 60);
        keys.handle(&PointerEvent::MouseDown { x, y, button: MouseButton::Primary }, &layout);
        assert!(keys.handle(&PointerEvent::MouseMove { x: x + 1.0, y }, &layout).is_empty());
    }

    #[test]
    fn test_hover_without_press_is_quiet() {
        let (_, mut keys, layout) = setup();
        let (x, y) = natural_point(&layout, 60);
        assert!(keys.handle(&PointerEvent::MouseMove { x, y }, &layout).is_empty());
    }

    #[test]
    fn test_leaving_keyboard_releases() {
        let (_, mut keys, layout) = setup();
        let (x, y) = natural_point(&layout, 60);
        keys.handle(&PointerEvent::MouseDown { x, y, button: MouseButton::Primary }, &layout);

        // Jump straight up into the roll
        let actions = keys.handle(&PointerEvent::MouseMove { x, y: 10.0 }, &layout);
        assert_eq!(actions, vec![KeyAction::KeyUp { note: 60, stream: InputStream::Mouse }]);

        // Coming back does not re-press
        assert!(keys.handle(&PointerEvent::MouseMove { x, y }, &layout).is_empty());
    }

    #[test]
    fn test_mouse_leave_releases() {
        let (_, mut keys, layout) = setup();
        let (x, y) = natural_point(&layout, 62);
        keys.handle(&PointerEvent::MouseDown { x, y, button: MouseButton::Primary }, &layout);
        let actions = keys.handle(&PointerEvent::MouseLeave, &layout);
        assert_eq!(actions, vec![KeyAction::KeyUp { note: 62, stream: InputStream::Mouse }]);
    }

    #[test]
    fn test_touch_streams_are_independent() {
        let (_, mut keys, layout) = setup();
        let (x1, y1) = natural_point(&layout, 60);
        let (x2, y2) = natural_point(&layout, 64);
        keys.handle(&PointerEvent::TouchStart { id: 1, x: x1, y: y1 }, &layout);
        keys.handle(&PointerEvent::TouchStart { id: 2, x: x2, y: y2 }, &layout);
        assert_eq!(keys.held_notes(), vec![60, 64]);

        let actions = keys.handle(&PointerEvent::TouchEnd { id: 1 }, &layout);
        assert_eq!(actions, vec![KeyAction::KeyUp { note: 60, stream: InputStream::Touch(1) }]);
        assert_eq!(keys.held_notes(), vec![64]);
    }

    #[test]
    fn test_press_color_attached() {
        let (_, mut keys, layout) = setup();
        keys.set_press_color(Some("#ff0000".into()));
        let (x, y) = natural_point(&layout, 60);
        let actions = keys.handle(&PointerEvent::TouchStart { id: 9, x, y }, &layout);
        assert_eq!(
            actions,
            vec![KeyAction::KeyDown {
                note: 60,
                stream: InputStream::Touch(9),
                color: Some("#ff0000".into())
            }]
        );
    }

    #[test]
    fn test_release_all() {
        let (_, mut keys, layout) = setup();
        let (x, y) = natural_point(&layout, 64);
        keys.handle(&PointerEvent::TouchStart { id: 1, x, y }, &layout);
        let (x, y) = natural_point(&layout, 60);
        keys.handle(&PointerEvent::MouseDown { x, y, button: MouseButton::Primary }, &layout);

        let actions = keys.release_all();
        assert_eq!(actions.iter().map(KeyAction::note).collect::<Vec<_>>(), vec![60, 64]);
        assert!(keys.held_notes().is_empty());
    }

    #[test]
    fn test_disposed_ignores_input() {
        let (ctx, mut keys, layout) = setup();
        ctx.dispose();
        let (x, y) = natural_point(&layout, 60);
        let actions = keys.handle(&PointerEvent::MouseDown { x, y, button: MouseButton::Primary }, &layout);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_stream_display() {
        assert_eq!(InputStream::Mouse.to_string(), "mouse");
        assert_eq!(InputStream::Touch(4).to_string(), "touch-4");
    }
}
