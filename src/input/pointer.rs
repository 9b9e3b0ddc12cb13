//! Viewport pan/zoom gestures - drag, touch pan, pinch and wheel
//!
//! `PointerGestureController` turns raw [`PointerEvent`]s into changes to
//! `Layout` (live pan and zoom) and to the pan animator (targets). It never
//! handles presses over the keyboard strip; those belong to the key
//! controller.
//!
//! # State machine
//!
//! - **Mouse**: Idle -> Dragging on a primary press over the roll. While
//!   dragging, pan follows the pointer exactly (no easing).
//! - **Touch**: each identifier is classified at touch-start as `Ignored`
//!   (started over the keyboard), `Pan`, or `Pinch` (second gesture finger).
//!   When a pinch finger lifts, the survivor is re-classified as a fresh pan.
//! - **Wheel**: discrete deltas, settled by a debounce counted down in `tick`.
//! - **Trackpad pinch**: one native stream scaled by the reported factor.
//!
//! # Invariants
//!
//! 1. Every gesture ends in [`PointerGestureController::complete_gesture`],
//!    which quantizes zoom before pan.
//! 2. While a gesture is live the animator's current and target equal the
//!    layout pan, so nothing eases under the user's finger.

use std::collections::HashMap;

use crate::animator::GestureAnimator;
use crate::config::GestureConfig;
use crate::context::{CursorHint, HostContext};
use crate::layout::{Layout, Region};

use super::event::{MouseButton, PointerEvent};

// ============================================================================
// Changes - what the controller did to the viewport
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportChange {
    /// Live pan offset (also the animator's target)
    Pan(f64),
    /// Live zoom, in visible keys
    Zoom(f64),
    /// Gesture committed: quantized zoom and the pan target to ease toward
    Settled { visible_keys: f64, pan_target: f64 },
}

// ============================================================================
// Per-pointer state
// ============================================================================

/// Where a drag started
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragOrigin {
    client_x: f64,
    pan: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ContactKind {
    /// Started over the keyboard (or a third finger)
    Ignored,
    Pan(DragOrigin),
    Pinch,
}

#[derive(Debug, Clone, Copy)]
struct Contact {
    x: f64,
    y: f64,
    kind: ContactKind,
}

/// Two-finger pinch snapshot
#[derive(Debug, Clone, Copy)]
struct TouchPinch {
    fingers: (u64, u64),
    initial_distance: f64,
    initial_keys: f64,
    /// Midpoint the pinch pan is measured from; re-anchored after each pan
    anchor_x: f64,
}

/// Native trackpad pinch snapshot
#[derive(Debug, Clone, Copy)]
struct TrackpadPinch {
    initial_keys: f64,
    anchor_x: f64,
    /// Most recent scale, relative to the pinch start
    last_scale: f64,
}

// ============================================================================
// Controller
// ============================================================================

#[derive(Debug)]
pub struct PointerGestureController {
    ctx: HostContext,
    config: GestureConfig,
    mouse_drag: Option<DragOrigin>,
    /// Last known mouse x
    mouse_x: f64,
    touches: HashMap<u64, Contact>,
    pinch: Option<TouchPinch>,
    trackpad: Option<TrackpadPinch>,
    /// Milliseconds until a wheel burst counts as finished
    wheel_settle: Option<f64>,
}

impl PointerGestureController {
    pub fn new(ctx: HostContext, config: GestureConfig) -> Self {
        Self {
            ctx,
            config,
            mouse_drag: None,
            mouse_x: 0.0,
            touches: HashMap::new(),
            pinch: None,
            trackpad: None,
            wheel_settle: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.mouse_drag.is_some()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some() || self.trackpad.is_some()
    }

    pub fn is_wheel_pending(&self) -> bool {
        self.wheel_settle.is_some()
    }

    /// Drop all gesture state without committing anything
    pub fn reset(&mut self) {
        self.mouse_drag = None;
        self.touches.clear();
        self.pinch = None;
        self.trackpad = None;
        self.wheel_settle = None;
    }

    /// Process one event against the viewport
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        layout: &mut Layout,
        animator: &mut GestureAnimator,
    ) -> Vec<ViewportChange> {
        let mut changes = Vec::new();
        if self.ctx.is_disposed() {
            return changes;
        }

        match *event {
            PointerEvent::MouseDown { x, y, button } => {
                self.mouse_down(x, y, button, layout);
            }
            PointerEvent::MouseMove { x, y } => {
                self.mouse_move(x, y, layout, animator, &mut changes);
            }
            PointerEvent::MouseUp { x, y, .. } => {
                if self.mouse_drag.take().is_some() {
                    self.update_hover(x, y, layout);
                    changes.push(self.complete_gesture(layout, animator));
                }
            }
            PointerEvent::MouseLeave => {
                self.ctx.set_cursor(CursorHint::Default);
                if self.mouse_drag.take().is_some() {
                    changes.push(self.complete_gesture(layout, animator));
                }
            }
            PointerEvent::TouchStart { id, x, y } => {
                self.touch_start(id, x, y, layout);
            }
            PointerEvent::TouchMove { id, x, y } => {
                self.touch_move(id, x, y, layout, animator, &mut changes);
            }
            PointerEvent::TouchEnd { id } | PointerEvent::TouchCancel { id } => {
                self.touch_end(id, layout, animator, &mut changes);
            }
            PointerEvent::Wheel {
                x,
                y,
                delta_x,
                delta_y,
            } => {
                self.wheel(x, y, delta_x, delta_y, layout, animator, &mut changes);
            }
            PointerEvent::PinchStart { x, .. } => {
                self.trackpad = Some(TrackpadPinch {
                    initial_keys: layout.visible_keys(),
                    anchor_x: x,
                    last_scale: 1.0,
                });
                tracing::debug!(x, "trackpad pinch start");
            }
            PointerEvent::PinchChange { x, scale, .. } => {
                self.trackpad_change(x, scale, layout, animator, &mut changes);
            }
            PointerEvent::PinchEnd => {
                if self.trackpad.take().is_some() {
                    changes.push(self.complete_gesture(layout, animator));
                }
            }
        }

        changes
    }

    /// Re-anchor live gestures to the current layout.
    ///
    /// Called after the layout changed under a gesture (a resize). Drags and
    /// pinches continue from the current pan and zoom at the pointers'
    /// current positions, so the next move is a small step.
    pub fn resync(&mut self, layout: &Layout) {
        let pan = layout.x();
        if let Some(origin) = self.mouse_drag.as_mut() {
            *origin = DragOrigin {
                client_x: self.mouse_x,
                pan,
            };
        }
        for contact in self.touches.values_mut() {
            if let ContactKind::Pan(_) = contact.kind {
                contact.kind = ContactKind::Pan(DragOrigin {
                    client_x: contact.x,
                    pan,
                });
            }
        }
        if let Some(pinch) = self.pinch.as_mut() {
            if let (Some(a), Some(b)) = (
                self.touches.get(&pinch.fingers.0),
                self.touches.get(&pinch.fingers.1),
            ) {
                pinch.initial_distance =
                    distance(a.x, a.y, b.x, b.y).max(self.config.min_pinch_distance);
                pinch.anchor_x = (a.x + b.x) / 2.0;
            }
            pinch.initial_keys = layout.visible_keys();
        }
        if let Some(trackpad) = self.trackpad.as_mut() {
            trackpad.initial_keys = layout.visible_keys() * trackpad.last_scale;
        }
    }

    /// Advance the wheel debounce; completes the gesture once input has been
    /// silent for `wheel_settle_ms`.
    pub fn tick(
        &mut self,
        delta_ms: f64,
        layout: &mut Layout,
        animator: &mut GestureAnimator,
    ) -> Option<ViewportChange> {
        if self.ctx.is_disposed() {
            return None;
        }
        let remaining = self.wheel_settle.as_mut()?;
        *remaining -= delta_ms.max(0.0);
        if *remaining > 0.0 {
            return None;
        }
        tracing::debug!("wheel settled");
        Some(self.complete_gesture(layout, animator))
    }

    /// Commit the current viewport: quantize zoom, apply it, then quantize pan
    /// against the new zoom and hand it to the animator as the target.
    ///
    /// Applying the zoom keeps any overscroll, so the animator eases it back.
    pub fn complete_gesture(
        &mut self,
        layout: &mut Layout,
        animator: &mut GestureAnimator,
    ) -> ViewportChange {
        self.wheel_settle = None;

        let visible_keys = layout.quantize_zoom(layout.visible_keys());
        if visible_keys != layout.visible_keys() {
            layout.zoom_about_overscroll(visible_keys, layout.width() / 2.0);
        }
        animator.set_position(layout.x());

        let pan_target = layout.quantize_pan_offset(layout.x());
        animator.set_target(pan_target);

        tracing::debug!(visible_keys, pan_target, "gesture complete");
        ViewportChange::Settled {
            visible_keys,
            pan_target,
        }
    }

    // ========================================================================
    // Shared pan path
    // ========================================================================

    /// Apply a live pan: layout and animator move together
    fn live_pan(
        x: f64,
        allow_overscroll: bool,
        layout: &mut Layout,
        animator: &mut GestureAnimator,
        changes: &mut Vec<ViewportChange>,
    ) {
        if allow_overscroll {
            layout.set_pan_offset_overscroll(x);
        } else {
            layout.set_pan_offset(x);
        }
        animator.sync(layout.x());
        changes.push(ViewportChange::Pan(layout.x()));
    }

    /// Apply a live zoom about a screen anchor
    fn live_zoom(
        visible_keys: f64,
        anchor_x: f64,
        allow_overscroll: bool,
        layout: &mut Layout,
        animator: &mut GestureAnimator,
        changes: &mut Vec<ViewportChange>,
    ) {
        if allow_overscroll {
            layout.zoom_about_overscroll(visible_keys, anchor_x);
        } else {
            layout.zoom_about(visible_keys, anchor_x);
        }
        animator.sync(layout.x());
        changes.push(ViewportChange::Zoom(layout.visible_keys()));
    }

    fn update_hover(&self, x: f64, y: f64, layout: &Layout) {
        let over_roll = x >= 0.0 && x < layout.width() && layout.region_at(y) == Region::Roll;
        self.ctx.set_cursor(if over_roll {
            CursorHint::Grab
        } else {
            CursorHint::Default
        });
    }

    // ========================================================================
    // Mouse
    // ========================================================================

    fn mouse_down(&mut self, x: f64, y: f64, button: MouseButton, layout: &Layout) {
        self.mouse_x = x;
        if button != MouseButton::Primary || layout.region_at(y) == Region::Keyboard {
            return;
        }
        self.mouse_drag = Some(DragOrigin {
            client_x: x,
            pan: layout.x(),
        });
        self.wheel_settle = None;
        self.ctx.set_cursor(CursorHint::Grabbing);
        tracing::debug!(x, y, "drag start");
    }

    fn mouse_move(
        &mut self,
        x: f64,
        y: f64,
        layout: &mut Layout,
        animator: &mut GestureAnimator,
        changes: &mut Vec<ViewportChange>,
    ) {
        self.mouse_x = x;
        match self.mouse_drag {
            Some(origin) => {
                Self::live_pan(origin.pan + (x - origin.client_x), false, layout, animator, changes);
            }
            None => self.update_hover(x, y, layout),
        }
    }

    // ========================================================================
    // Touch
    // ========================================================================

    fn gesture_fingers(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .touches
            .iter()
            .filter(|(_, c)| c.kind != ContactKind::Ignored)
            .map(|(&id, _)| id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn touch_start(&mut self, id: u64, x: f64, y: f64, layout: &Layout) {
        if self.touches.contains_key(&id) {
            return;
        }
        if layout.region_at(y) == Region::Keyboard || self.pinch.is_some() {
            self.touches.insert(id, Contact { x, y, kind: ContactKind::Ignored });
            return;
        }

        self.wheel_settle = None;
        let others = self.gesture_fingers();
        if let Some(&other) = others.first() {
            if let Some(contact) = self.touches.get_mut(&other) {
                contact.kind = ContactKind::Pinch;
                let (ox, oy) = (contact.x, contact.y);
                self.touches.insert(id, Contact { x, y, kind: ContactKind::Pinch });
                self.pinch = Some(TouchPinch {
                    fingers: (other, id),
                    initial_distance: distance(ox, oy, x, y).max(self.config.min_pinch_distance),
                    initial_keys: layout.visible_keys(),
                    anchor_x: (ox + x) / 2.0,
                });
                tracing::debug!(first = other, second = id, "pinch start");
            }
        } else {
            let origin = DragOrigin {
                client_x: x,
                pan: layout.x(),
            };
            self.touches.insert(id, Contact { x, y, kind: ContactKind::Pan(origin) });
            tracing::debug!(id, x, "touch pan start");
        }
    }

    fn touch_move(
        &mut self,
        id: u64,
        x: f64,
        y: f64,
        layout: &mut Layout,
        animator: &mut GestureAnimator,
        changes: &mut Vec<ViewportChange>,
    ) {
        let Some(contact) = self.touches.get_mut(&id) else {
            return;
        };
        contact.x = x;
        contact.y = y;

        match contact.kind {
            ContactKind::Ignored => {}
            ContactKind::Pan(origin) => {
                Self::live_pan(origin.pan + (x - origin.client_x), false, layout, animator, changes);
            }
            ContactKind::Pinch => self.update_pinch(layout, animator, changes),
        }
    }

    fn update_pinch(
        &mut self,
        layout: &mut Layout,
        animator: &mut GestureAnimator,
        changes: &mut Vec<ViewportChange>,
    ) {
        let Some(pinch) = self.pinch.as_mut() else {
            return;
        };
        let (Some(a), Some(b)) = (
            self.touches.get(&pinch.fingers.0),
            self.touches.get(&pinch.fingers.1),
        ) else {
            return;
        };

        let current = distance(a.x, a.y, b.x, b.y).max(self.config.min_pinch_distance);
        let mid_x = (a.x + b.x) / 2.0;

        // Spreading the fingers shows fewer, wider keys
        let keys = pinch.initial_keys * pinch.initial_distance / current;
        Self::live_zoom(keys, mid_x, false, layout, animator, changes);

        let drift = mid_x - pinch.anchor_x;
        if drift.abs() > self.config.pinch_dead_zone {
            pinch.anchor_x = mid_x;
            Self::live_pan(layout.x() + drift, false, layout, animator, changes);
        }
    }

    fn touch_end(
        &mut self,
        id: u64,
        layout: &mut Layout,
        animator: &mut GestureAnimator,
        changes: &mut Vec<ViewportChange>,
    ) {
        let Some(removed) = self.touches.remove(&id) else {
            return;
        };
        if removed.kind == ContactKind::Ignored {
            return;
        }

        if removed.kind == ContactKind::Pinch {
            self.pinch = None;
            // The remaining finger continues as a fresh one-finger pan
            let pan = layout.x();
            for contact in self.touches.values_mut() {
                if contact.kind == ContactKind::Pinch {
                    contact.kind = ContactKind::Pan(DragOrigin {
                        client_x: contact.x,
                        pan,
                    });
                }
            }
            tracing::debug!(id, "pinch end");
        }

        if self.gesture_fingers().is_empty() {
            changes.push(self.complete_gesture(layout, animator));
        }
    }

    // ========================================================================
    // Wheel and trackpad
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    fn wheel(
        &mut self,
        x: f64,
        y: f64,
        delta_x: f64,
        delta_y: f64,
        layout: &mut Layout,
        animator: &mut GestureAnimator,
        changes: &mut Vec<ViewportChange>,
    ) {
        let mut moved = false;
        if delta_x.is_finite() && delta_x != 0.0 {
            Self::live_pan(layout.x() - delta_x, true, layout, animator, changes);
            moved = true;
        }
        if delta_y.is_finite() && delta_y != 0.0 && layout.region_at(y) == Region::Roll {
            let keys = layout.visible_keys() + delta_y * self.config.wheel_zoom_rate;
            Self::live_zoom(keys, x, true, layout, animator, changes);
            moved = true;
        }
        if moved {
            self.wheel_settle = Some(self.config.wheel_settle_ms);
        }
    }

    fn trackpad_change(
        &mut self,
        x: f64,
        scale: f64,
        layout: &mut Layout,
        animator: &mut GestureAnimator,
        changes: &mut Vec<ViewportChange>,
    ) {
        let Some(pinch) = self.trackpad.as_mut() else {
            return;
        };
        if !(scale.is_finite() && scale > 0.0) {
            return;
        }
        pinch.last_scale = scale;

        Self::live_zoom(pinch.initial_keys / scale, x, false, layout, animator, changes);

        let drift = x - pinch.anchor_x;
        if drift.abs() > self.config.pinch_dead_zone {
            pinch.anchor_x = x;
            Self::live_pan(layout.x() + drift, false, layout, animator, changes);
        }
    }
}

fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnimatorConfig, LayoutConfig};

    struct Rig {
        ctx: HostContext,
        ctrl: PointerGestureController,
        layout: Layout,
        animator: GestureAnimator,
    }

    impl Rig {
        /// 640x400: 8 keys of 80px, keyboard strip from y = 320
        fn new() -> Self {
            let ctx = HostContext::new();
            let layout = Layout::new(LayoutConfig::default(), 640.0, 400.0);
            let mut animator = GestureAnimator::new(AnimatorConfig::default());
            animator.sync(layout.x());
            Self {
                ctrl: PointerGestureController::new(ctx.clone(), GestureConfig::default()),
                ctx,
                layout,
                animator,
            }
        }

        fn send(&mut self, event: PointerEvent) -> Vec<ViewportChange> {
            self.ctrl.handle(&event, &mut self.layout, &mut self.animator)
        }
    }

    #[test]
    fn test_mouse_drag_pans_live() {
        let mut rig = Rig::new();
        let start = rig.layout.x();

        rig.send(PointerEvent::MouseDown { x: 300.0, y: 100.0, button: MouseButton::Primary });
        assert!(rig.ctrl.is_dragging());
        assert_eq!(rig.ctx.cursor(), CursorHint::Grabbing);

        let changes = rig.send(PointerEvent::MouseMove { x: 270.0, y: 100.0 });
        assert_eq!(changes, vec![ViewportChange::Pan(start - 30.0)]);
        assert_eq!(rig.layout.x(), start - 30.0);
        assert_eq!(rig.animator.current(), start - 30.0);
        assert_eq!(rig.animator.target(), start - 30.0);
    }

    #[test]
    fn test_mouse_release_quantizes() {
        let mut rig = Rig::new();
        rig.layout.set_pan_offset(-1200.0);
        rig.animator.sync(-1200.0);

        rig.send(PointerEvent::MouseDown { x: 300.0, y: 100.0, button: MouseButton::Primary });
        rig.send(PointerEvent::MouseMove { x: 270.0, y: 100.0 });
        let changes = rig.send(PointerEvent::MouseUp { x: 270.0, y: 100.0, button: MouseButton::Primary });

        assert_eq!(
            changes,
            vec![ViewportChange::Settled { visible_keys: 8.0, pan_target: -1200.0 }]
        );
        assert_eq!(rig.animator.current(), -1230.0);
        assert_eq!(rig.animator.target(), -1200.0);
        assert!(!rig.ctrl.is_dragging());
        assert_eq!(rig.ctx.cursor(), CursorHint::Grab);
    }

    #[test]
    fn test_mouse_down_over_keyboard_does_not_drag() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::MouseDown { x: 300.0, y: 350.0, button: MouseButton::Primary });
        assert!(!rig.ctrl.is_dragging());
        assert!(rig.send(PointerEvent::MouseMove { x: 100.0, y: 350.0 }).is_empty());
    }

    #[test]
    fn test_secondary_button_ignored() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::MouseDown { x: 300.0, y: 100.0, button: MouseButton::Secondary });
        assert!(!rig.ctrl.is_dragging());
    }

    #[test]
    fn test_mouse_leave_completes_drag() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::MouseDown { x: 300.0, y: 100.0, button: MouseButton::Primary });
        let changes = rig.send(PointerEvent::MouseLeave);
        assert!(matches!(changes[..], [ViewportChange::Settled { .. }]));
        assert_eq!(rig.ctx.cursor(), CursorHint::Default);
    }

    #[test]
    fn test_hover_cursor() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::MouseMove { x: 10.0, y: 10.0 });
        assert_eq!(rig.ctx.cursor(), CursorHint::Grab);
        rig.send(PointerEvent::MouseMove { x: 10.0, y: 390.0 });
        assert_eq!(rig.ctx.cursor(), CursorHint::Default);
    }

    #[test]
    fn test_one_finger_pan() {
        let mut rig = Rig::new();
        let start = rig.layout.x();
        rig.send(PointerEvent::TouchStart { id: 7, x: 200.0, y: 100.0 });
        rig.send(PointerEvent::TouchMove { id: 7, x: 240.0, y: 120.0 });
        assert_eq!(rig.layout.x(), start + 40.0);

        let changes = rig.send(PointerEvent::TouchEnd { id: 7 });
        assert!(matches!(changes[..], [ViewportChange::Settled { .. }]));
    }

    #[test]
    fn test_touch_over_keyboard_ignored() {
        let mut rig = Rig::new();
        let start = rig.layout.x();
        rig.send(PointerEvent::TouchStart { id: 1, x: 200.0, y: 350.0 });
        assert!(rig.send(PointerEvent::TouchMove { id: 1, x: 300.0, y: 350.0 }).is_empty());
        assert!(rig.send(PointerEvent::TouchEnd { id: 1 }).is_empty());
        assert_eq!(rig.layout.x(), start);
    }

    #[test]
    fn test_pinch_spread_zooms_in() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::TouchStart { id: 1, x: 270.0, y: 100.0 });
        rig.send(PointerEvent::TouchStart { id: 2, x: 370.0, y: 100.0 });
        assert!(rig.ctrl.is_pinching());

        // Distance 100 -> 160 around the same midpoint
        rig.send(PointerEvent::TouchMove { id: 1, x: 240.0, y: 100.0 });
        let changes = rig.send(PointerEvent::TouchMove { id: 2, x: 400.0, y: 100.0 });
        assert_eq!(changes[0], ViewportChange::Zoom(5.0));
        assert_eq!(rig.layout.visible_keys(), 5.0);
    }

    #[test]
    fn test_pinch_keeps_midpoint_anchored() {
        let mut rig = Rig::new();
        rig.layout.set_pan_offset(-1200.0);
        // World position under the midpoint after the move (x = 325)
        let before = (325.0 - rig.layout.x()) / rig.layout.natural_width();

        rig.send(PointerEvent::TouchStart { id: 1, x: 270.0, y: 100.0 });
        rig.send(PointerEvent::TouchStart { id: 2, x: 370.0, y: 100.0 });
        // Distance 100 -> 90, midpoint drifts 5px (inside the dead zone)
        rig.send(PointerEvent::TouchMove { id: 1, x: 280.0, y: 100.0 });

        assert!((rig.layout.visible_keys() - 8.0 * 100.0 / 90.0).abs() < 1e-9);
        let after = (325.0 - rig.layout.x()) / rig.layout.natural_width();
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_pinch_midpoint_drift_pans_and_reanchors() {
        let mut rig = Rig::new();
        rig.layout.set_pan_offset(-1200.0);
        rig.send(PointerEvent::TouchStart { id: 1, x: 270.0, y: 100.0 });
        rig.send(PointerEvent::TouchStart { id: 2, x: 370.0, y: 100.0 });

        // Small drift stays inside the dead zone: zoom only
        let changes = rig.send(PointerEvent::TouchMove { id: 1, x: 276.0, y: 100.0 });
        assert!(changes.iter().all(|c| matches!(c, ViewportChange::Zoom(_))));

        // Moving both fingers 20px right drifts the midpoint past the dead zone
        rig.send(PointerEvent::TouchMove { id: 2, x: 390.0, y: 100.0 });
        let before = rig.layout.x();
        let changes = rig.send(PointerEvent::TouchMove { id: 1, x: 290.0, y: 100.0 });
        assert!(changes.iter().any(|c| matches!(c, ViewportChange::Pan(_))));
        assert!(rig.layout.x() > before);
    }

    #[test]
    fn test_pinch_survivor_continues_as_pan() {
        let mut rig = Rig::new();
        rig.layout.set_pan_offset(-1200.0);
        rig.send(PointerEvent::TouchStart { id: 1, x: 270.0, y: 100.0 });
        rig.send(PointerEvent::TouchStart { id: 2, x: 370.0, y: 100.0 });

        // Lifting one finger does not complete the gesture
        assert!(rig.send(PointerEvent::TouchEnd { id: 1 }).is_empty());
        assert!(!rig.ctrl.is_pinching());

        let before = rig.layout.x();
        rig.send(PointerEvent::TouchMove { id: 2, x: 350.0, y: 100.0 });
        assert_eq!(rig.layout.x(), before - 20.0);

        let changes = rig.send(PointerEvent::TouchCancel { id: 2 });
        assert!(matches!(changes[..], [ViewportChange::Settled { .. }]));
    }

    #[test]
    fn test_third_finger_ignored() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::TouchStart { id: 1, x: 270.0, y: 100.0 });
        rig.send(PointerEvent::TouchStart { id: 2, x: 370.0, y: 100.0 });
        rig.send(PointerEvent::TouchStart { id: 3, x: 100.0, y: 100.0 });
        assert!(rig.send(PointerEvent::TouchMove { id: 3, x: 10.0, y: 100.0 }).is_empty());
    }

    #[test]
    fn test_wheel_horizontal_allows_overscroll_then_settles() {
        let mut rig = Rig::new();
        rig.layout.set_pan_offset(0.0);
        rig.animator.sync(0.0);

        rig.send(PointerEvent::Wheel { x: 300.0, y: 100.0, delta_x: -40.0, delta_y: 0.0 });
        assert_eq!(rig.layout.x(), 40.0);
        assert!(rig.ctrl.is_wheel_pending());

        // Not yet silent long enough
        assert_eq!(rig.ctrl.tick(20.0, &mut rig.layout, &mut rig.animator), None);
        let settled = rig.ctrl.tick(20.0, &mut rig.layout, &mut rig.animator);
        assert_eq!(
            settled,
            Some(ViewportChange::Settled { visible_keys: 8.0, pan_target: 0.0 })
        );
        // Overscroll eases back instead of jumping
        assert_eq!(rig.animator.current(), 40.0);
        assert_eq!(rig.animator.target(), 0.0);
        assert!(!rig.ctrl.is_wheel_pending());
    }

    #[test]
    fn test_wheel_overscroll_survives_zoom_settle() {
        let mut rig = Rig::new();
        rig.layout.set_pan_offset(0.0);
        rig.animator.sync(0.0);

        rig.send(PointerEvent::Wheel { x: 320.0, y: 100.0, delta_x: -40.0, delta_y: 30.0 });
        assert!(rig.layout.x() > 0.0);

        let settled = rig.ctrl.tick(50.0, &mut rig.layout, &mut rig.animator);
        assert!(matches!(
            settled,
            Some(ViewportChange::Settled { visible_keys, pan_target }) if visible_keys == 8.0 && pan_target == 0.0
        ));
        // Still overscrolled: the animator eases it back
        assert!(rig.layout.x() > 0.0);
        assert_eq!(rig.animator.current(), rig.layout.x());
        assert_eq!(rig.animator.target(), 0.0);
    }

    #[test]
    fn test_wheel_vertical_zooms_over_roll_only() {
        let mut rig = Rig::new();
        let changes = rig.send(PointerEvent::Wheel { x: 320.0, y: 100.0, delta_x: 0.0, delta_y: 100.0 });
        assert_eq!(changes, vec![ViewportChange::Zoom(9.0)]);

        let changes = rig.send(PointerEvent::Wheel { x: 320.0, y: 350.0, delta_x: 0.0, delta_y: 100.0 });
        assert!(changes.is_empty());
    }

    #[test]
    fn test_wheel_settle_quantizes_zoom_then_pan() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::Wheel { x: 320.0, y: 100.0, delta_x: 0.0, delta_y: 130.0 });
        assert!((rig.layout.visible_keys() - 9.3).abs() < 1e-9);

        let settled = rig.ctrl.tick(50.0, &mut rig.layout, &mut rig.animator);
        let Some(ViewportChange::Settled { visible_keys, pan_target }) = settled else {
            panic!("expected settle, got {:?}", settled);
        };
        assert_eq!(visible_keys, 9.0);
        assert_eq!(rig.layout.visible_keys(), 9.0);
        let key = rig.layout.natural_width();
        assert!(((pan_target / key).round() - pan_target / key).abs() < 1e-9);
    }

    #[test]
    fn test_trackpad_pinch() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::PinchStart { x: 320.0, y: 100.0 });
        let changes = rig.send(PointerEvent::PinchChange { x: 320.0, y: 100.0, scale: 2.0 });
        assert_eq!(changes, vec![ViewportChange::Zoom(5.0)]);

        // Bad scale factors are ignored
        assert!(rig.send(PointerEvent::PinchChange { x: 320.0, y: 100.0, scale: 0.0 }).is_empty());

        let changes = rig.send(PointerEvent::PinchEnd);
        assert!(matches!(changes[..], [ViewportChange::Settled { visible_keys: 5.0, .. }]));
    }

    #[test]
    fn test_trackpad_anchor_drift_pans() {
        let mut rig = Rig::new();
        let start = rig.layout.x();
        rig.send(PointerEvent::PinchStart { x: 320.0, y: 100.0 });

        // Within the dead zone: zoom only
        let changes = rig.send(PointerEvent::PinchChange { x: 323.0, y: 100.0, scale: 1.0 });
        assert!(matches!(changes[..], [ViewportChange::Zoom(_)]));
        assert!((rig.layout.x() - start).abs() < 1e-9);

        // Past it: the drift also pans, and the anchor moves
        let changes = rig.send(PointerEvent::PinchChange { x: 340.0, y: 100.0, scale: 1.0 });
        let [ViewportChange::Zoom(keys), ViewportChange::Pan(pan)] = changes[..] else {
            panic!("expected zoom then pan, got {:?}", changes);
        };
        assert_eq!(keys, 8.0);
        assert!((pan - (start + 20.0)).abs() < 1e-9);

        let changes = rig.send(PointerEvent::PinchChange { x: 343.0, y: 100.0, scale: 1.0 });
        assert!(matches!(changes[..], [ViewportChange::Zoom(_)]));
        assert!((rig.layout.x() - pan).abs() < 1e-9);
    }

    #[test]
    fn test_resync_reanchors_drag() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::MouseDown { x: 300.0, y: 100.0, button: MouseButton::Primary });
        rig.send(PointerEvent::MouseMove { x: 290.0, y: 100.0 });

        rig.layout.set_pixel_size(1000.0, 400.0);
        rig.animator.sync(rig.layout.x());
        rig.ctrl.resync(&rig.layout);
        let pan = rig.layout.x();

        rig.send(PointerEvent::MouseMove { x: 289.0, y: 100.0 });
        assert_eq!(rig.layout.x(), pan - 1.0);
    }

    #[test]
    fn test_resync_rebases_pinch_zoom() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::TouchStart { id: 1, x: 200.0, y: 100.0 });
        rig.send(PointerEvent::TouchStart { id: 2, x: 300.0, y: 100.0 });

        // Zoom still at the tier default, so the resize snaps 8 -> 12 keys
        rig.layout.set_pixel_size(1000.0, 400.0);
        rig.ctrl.resync(&rig.layout);
        assert_eq!(rig.layout.visible_keys(), 12.0);

        rig.send(PointerEvent::TouchMove { id: 2, x: 301.0, y: 100.0 });
        assert!((rig.layout.visible_keys() - 12.0 * 100.0 / 101.0).abs() < 1e-9);
    }

    #[test]
    fn test_resync_reanchors_trackpad_pinch() {
        let mut rig = Rig::new();
        rig.send(PointerEvent::PinchStart { x: 320.0, y: 100.0 });
        rig.send(PointerEvent::PinchChange { x: 320.0, y: 100.0, scale: 1.25 });
        assert!((rig.layout.visible_keys() - 6.4).abs() < 1e-9);

        rig.layout.set_zoom_factor(10.0);
        rig.ctrl.resync(&rig.layout);
        rig.send(PointerEvent::PinchChange { x: 320.0, y: 100.0, scale: 1.25 });
        assert!((rig.layout.visible_keys() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_disposed_controller_ignores_input() {
        let mut rig = Rig::new();
        rig.ctx.dispose();
        rig.send(PointerEvent::MouseDown { x: 300.0, y: 100.0, button: MouseButton::Primary });
        assert!(!rig.ctrl.is_dragging());
        assert!(rig.send(PointerEvent::Wheel { x: 1.0, y: 1.0, delta_x: 5.0, delta_y: 0.0 }).is_empty());
    }
}
