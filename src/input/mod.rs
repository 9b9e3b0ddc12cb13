//! Input handling
//!
//! Raw events arrive as [`PointerEvent`]s (the terminal host converts them
//! in [`terminal`]). Two controllers consume the same stream:
//! - [`PointerGestureController`]: pan/zoom gestures over the note roll
//! - [`KeyInputController`]: presses on the keyboard strip
//!
//! Controllers never know about the view; they act on `Layout` and return
//! what they did for the caller to execute.

pub mod event;
pub mod keys;
pub mod pointer;
pub mod terminal;

pub use event::{MouseButton, PointerEvent};
pub use keys::{InputStream, KeyAction, KeyInputController};
pub use pointer::{PointerGestureController, ViewportChange};
