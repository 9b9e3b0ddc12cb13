//! Single-axis easing toward a target.
//!
//! The step per tick grows with distance (`dt * distance^exponent / divisor`)
//! but never drops below one unit, so an animation always finishes.

use crate::config::AnimatorConfig;

/// Eases `current` toward `target` across frames
#[derive(Debug, Clone)]
pub struct GestureAnimator {
    config: AnimatorConfig,
    current: f64,
    target: f64,
}

impl GestureAnimator {
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            config,
            current: 0.0,
            target: 0.0,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Jump straight to `x`; the target is left alone.
    ///
    /// Returns the new current value for the observer.
    pub fn set_position(&mut self, x: f64) -> f64 {
        if x.is_finite() {
            self.current = x;
        }
        self.current
    }

    /// Set the destination; takes effect on the next tick
    pub fn set_target(&mut self, x: f64) {
        if x.is_finite() {
            self.target = x;
        }
    }

    /// Set both current and target, cancelling any animation in flight
    pub fn sync(&mut self, x: f64) -> f64 {
        self.set_target(x);
        self.set_position(self.target)
    }

    /// Advance one frame. Returns the new current value if it changed.
    pub fn tick(&mut self, delta_ms: f64) -> Option<f64> {
        if self.current == self.target {
            return None;
        }

        let diff = self.target - self.current;
        let distance = diff.abs();
        if distance <= self.config.snap_distance {
            self.current = self.target;
        } else {
            let dt = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
            let step = (dt * distance.powf(self.config.exponent) / self.config.divisor)
                .max(1.0)
                .min(distance);
            self.current += step * diff.signum();
        }

        tracing::trace!(current = self.current, target = self.target, "animator step");
        Some(self.current)
    }
}

impl Default for GestureAnimator {
    fn default() -> Self {
        Self::new(AnimatorConfig::default())
    }
}
