//! Host-neutral input events
//!
//! Coordinates are container-relative pixels. Every field has a safe default
//! so recorded event scripts with missing fields still deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

fn unit_scale() -> f64 {
    1.0
}

/// A raw pointer, touch, wheel or trackpad event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    MouseDown {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        button: MouseButton,
    },
    MouseMove {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    MouseUp {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        button: MouseButton,
    },
    /// Pointer left the container
    MouseLeave,

    /// A finger touched down; `id` is the platform touch identifier
    TouchStart {
        #[serde(default)]
        id: u64,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    TouchMove {
        #[serde(default)]
        id: u64,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    TouchEnd {
        #[serde(default)]
        id: u64,
    },
    TouchCancel {
        #[serde(default)]
        id: u64,
    },

    /// Wheel or trackpad scroll, in pixels
    Wheel {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        delta_x: f64,
        #[serde(default)]
        delta_y: f64,
    },

    /// Native trackpad pinch began at (x, y)
    PinchStart {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    /// Trackpad pinch update; `scale` is relative to the start of the pinch
    PinchChange {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default = "unit_scale")]
        scale: f64,
    },
    PinchEnd,
}

impl PointerEvent {
    /// Pointer position, for events that carry one
    pub fn position(&self) -> Option<(f64, f64)> {
        match *self {
            PointerEvent::MouseDown { x, y, .. }
            | PointerEvent::MouseMove { x, y }
            | PointerEvent::MouseUp { x, y, .. }
            | PointerEvent::TouchStart { x, y, .. }
            | PointerEvent::TouchMove { x, y, .. }
            | PointerEvent::Wheel { x, y, .. }
            | PointerEvent::PinchStart { x, y }
            | PointerEvent::PinchChange { x, y, .. } => Some((x, y)),
            PointerEvent::MouseLeave
            | PointerEvent::TouchEnd { .. }
            | PointerEvent::TouchCancel { .. }
            | PointerEvent::PinchEnd => None,
        }
    }
}
