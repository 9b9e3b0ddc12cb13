//! Host-facing piano view
//!
//! `PianoView` wires the layout, the pan animator, both input controllers,
//! the active-note tracker and the note roll together. Hosts feed it sizes,
//! input events, note on/off calls and frame ticks; renderers read `layout()`,
//! `tracker()` and `roll()`.

use crate::animator::GestureAnimator;
use crate::config::Config;
use crate::context::HostContext;
use crate::diagnostics::WarningLog;
use crate::error::ValidationError;
use crate::input::{
    KeyAction, KeyInputController, PointerEvent, PointerGestureController, ViewportChange,
};
use crate::layout::{Layout, VisibleRange};
use crate::notes::ActiveNoteTracker;
use crate::roll::NoteRoll;

/// Color used for presses that bring none
pub const DEFAULT_PRESS_COLOR: &str = "#4fc3f7";

/// What one input event did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    pub keys: Vec<KeyAction>,
    pub viewport: Vec<ViewportChange>,
}

#[derive(Debug)]
pub struct PianoView {
    ctx: HostContext,
    layout: Layout,
    animator: GestureAnimator,
    pointer: PointerGestureController,
    keys: KeyInputController,
    tracker: ActiveNoteTracker,
    roll: NoteRoll,
    warnings: WarningLog,
}

impl PianoView {
    /// Build a view. A config that fails validation is replaced by defaults.
    pub fn new(config: Config, width: f64, height: f64) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(error) => {
                tracing::warn!(%error, "invalid config, using defaults");
                Config::default()
            }
        };
        let ctx = HostContext::new();
        let layout = Layout::new(config.layout, width, height);
        let mut animator = GestureAnimator::new(config.animator);
        animator.sync(layout.x());

        Self {
            pointer: PointerGestureController::new(ctx.clone(), config.gesture),
            keys: KeyInputController::new(ctx.clone()),
            ctx,
            layout,
            animator,
            tracker: ActiveNoteTracker::new(),
            roll: NoteRoll::default(),
            warnings: WarningLog::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn context(&self) -> &HostContext {
        &self.ctx
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn animator(&self) -> &GestureAnimator {
        &self.animator
    }

    pub fn tracker(&self) -> &ActiveNoteTracker {
        &self.tracker
    }

    pub fn roll(&self) -> &NoteRoll {
        &self.roll
    }

    pub fn warnings(&self) -> &WarningLog {
        &self.warnings
    }

    pub fn pointer(&self) -> &PointerGestureController {
        &self.pointer
    }

    pub fn keys(&self) -> &KeyInputController {
        &self.keys
    }

    // ========================================================================
    // Notes
    // ========================================================================

    pub fn note_on(
        &mut self,
        note: i32,
        color: &str,
        identifier: Option<&str>,
    ) -> Result<(), ValidationError> {
        let result = self.tracker.note_on(note, color, identifier);
        self.warnings.check("note_on", result)?;
        self.roll.start(note as u8, color, identifier);
        Ok(())
    }

    pub fn note_off(&mut self, note: i32, identifier: Option<&str>) -> Result<(), ValidationError> {
        let result = self.tracker.note_off(note, identifier);
        self.warnings.check("note_off", result)?;
        self.roll.end(note as u8, identifier);
        Ok(())
    }

    /// Echo key presses into the tracker, one identifier per input stream
    pub fn apply_key_actions(&mut self, actions: &[KeyAction]) {
        for action in actions {
            // Both sides were produced by the key controller, so they are in range
            let _ = match action {
                KeyAction::KeyDown { note, stream, color } => {
                    let color = color.as_deref().unwrap_or(DEFAULT_PRESS_COLOR);
                    self.note_on(*note as i32, color, Some(&stream.to_string()))
                }
                KeyAction::KeyUp { note, stream } => {
                    self.note_off(*note as i32, Some(&stream.to_string()))
                }
            };
        }
    }

    // ========================================================================
    // Viewport
    // ========================================================================

    /// Resize; pan and zoom are synced immediately with no easing, and live
    /// gestures are re-anchored to the new frame
    pub fn set_pixel_size(&mut self, width: f64, height: f64) {
        self.layout.set_pixel_size(width, height);
        self.animator.sync(self.layout.x());
        self.pointer.resync(&self.layout);
    }

    pub fn set_visible_range(
        &mut self,
        center_note: f64,
        visible_keys: f64,
    ) -> Result<(), ValidationError> {
        let result = self.layout.set_visible_range(center_note, visible_keys);
        self.warnings.check("set_visible_range", result)?;
        self.animator.sync(self.layout.x());
        Ok(())
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.layout.visible_range()
    }

    /// Zoom by whole keys about the center, committing immediately
    pub fn zoom_by(&mut self, keys: f64) {
        let target = self.layout.quantize_zoom(self.layout.visible_keys() + keys);
        self.layout.set_zoom_factor(target);
        self.settle_pan();
    }

    /// Restore the breakpoint default zoom for the current width
    pub fn reset_zoom(&mut self) {
        self.layout.set_zoom_factor(self.layout.default_visible_keys());
        self.settle_pan();
    }

    /// Ease the pan by a number of natural keys (positive reveals higher notes)
    pub fn pan_by_keys(&mut self, keys: f64) {
        let x = self.animator.target() - keys * self.layout.natural_width();
        self.animator.set_target(self.layout.quantize_pan_offset(x));
    }

    fn settle_pan(&mut self) {
        self.animator.set_position(self.layout.x());
        self.animator
            .set_target(self.layout.quantize_pan_offset(self.layout.x()));
    }

    pub fn set_press_color(&mut self, color: Option<String>) {
        self.keys.set_press_color(color);
    }

    // ========================================================================
    // Input and frames
    // ========================================================================

    /// Route one input event through both controllers
    pub fn handle_event(&mut self, event: &PointerEvent) -> Dispatch {
        if self.ctx.is_disposed() {
            return Dispatch::default();
        }
        let viewport = self
            .pointer
            .handle(event, &mut self.layout, &mut self.animator);
        let keys = self.keys.handle(event, &self.layout);
        Dispatch { keys, viewport }
    }

    /// Advance one frame
    pub fn tick(&mut self, delta_ms: f64) -> Option<ViewportChange> {
        if self.ctx.is_disposed() {
            return None;
        }
        let settled = self
            .pointer
            .tick(delta_ms, &mut self.layout, &mut self.animator);
        if let Some(x) = self.animator.tick(delta_ms) {
            // The animator may be easing back from a wheel overscroll
            self.layout.set_pan_offset_overscroll(x);
        }
        self.roll.tick(delta_ms, self.layout.keyboard_top());
        settled
    }

    /// Tear down: release held keys and stop handling input.
    ///
    /// Returns the key-up actions for keys that were still held.
    pub fn dispose(&mut self) -> Vec<KeyAction> {
        if self.ctx.is_disposed() {
            return Vec::new();
        }
        let released = self.keys.release_all();
        self.apply_key_actions(&released);
        self.pointer.reset();
        self.ctx.dispose();
        tracing::debug!(released = released.len(), "view disposed");
        released
    }
}


// Scenarios that cross several components
#[cfg(test)]
#[path = "view_tests.rs"]
mod scenario_tests;
