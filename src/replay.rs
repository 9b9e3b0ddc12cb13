//! Headless event scripts
//!
//! A script is a JSON array of steps. Host steps (`tick`, `resize`,
//! `note_on`, ...) and raw [`PointerEvent`]s can be mixed freely:
//!
//! ```json
//! [
//!   {"type": "resize", "width": 1024, "height": 600},
//!   {"type": "mouse_down", "x": 300, "y": 100},
//!   {"type": "mouse_move", "x": 250, "y": 100},
//!   {"type": "mouse_up", "x": 250, "y": 100},
//!   {"type": "tick", "ms": 500}
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::input::PointerEvent;
use crate::view::{PianoView, DEFAULT_PRESS_COLOR};

fn default_color() -> String {
    DEFAULT_PRESS_COLOR.to_string()
}

/// A call a host would make on the view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostStep {
    Tick {
        #[serde(default)]
        ms: f64,
    },
    Resize {
        #[serde(default)]
        width: f64,
        #[serde(default)]
        height: f64,
    },
    NoteOn {
        note: i32,
        #[serde(default = "default_color")]
        color: String,
        #[serde(default)]
        identifier: Option<String>,
    },
    NoteOff {
        note: i32,
        #[serde(default)]
        identifier: Option<String>,
    },
    SetVisibleRange {
        center_note: f64,
        visible_keys: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Host(HostStep),
    Input(PointerEvent),
}

/// Viewport and note state after a script
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub width: f64,
    pub height: f64,
    pub pan_x: f64,
    pub pan_target: f64,
    pub visible_keys: f64,
    pub center_note: u8,
    pub active_notes: Vec<u8>,
    pub warnings: usize,
}

impl Summary {
    pub fn of(view: &PianoView) -> Self {
        let layout = view.layout();
        Self {
            width: layout.width(),
            height: layout.height(),
            pan_x: layout.x(),
            pan_target: view.animator().target(),
            visible_keys: layout.visible_keys(),
            center_note: layout.center_note(),
            active_notes: view.tracker().active_notes().collect(),
            warnings: view.warnings().len(),
        }
    }
}

/// Run steps against a view. Key presses are echoed into the tracker.
pub fn run(view: &mut PianoView, steps: &[Step]) {
    for step in steps {
        match step {
            Step::Host(HostStep::Tick { ms }) => {
                view.tick(*ms);
            }
            Step::Host(HostStep::Resize { width, height }) => {
                view.set_pixel_size(*width, *height);
            }
            Step::Host(HostStep::NoteOn { note, color, identifier }) => {
                let _ = view.note_on(*note, color, identifier.as_deref());
            }
            Step::Host(HostStep::NoteOff { note, identifier }) => {
                let _ = view.note_off(*note, identifier.as_deref());
            }
            Step::Host(HostStep::SetVisibleRange { center_note, visible_keys }) => {
                let _ = view.set_visible_range(*center_note, *visible_keys);
            }
            Step::Input(event) => {
                let dispatch = view.handle_event(event);
                view.apply_key_actions(&dispatch.keys);
            }
        }
    }
}

pub fn parse(text: &str) -> serde_json::Result<Vec<Step>> {
    serde_json::from_str(text)
}
