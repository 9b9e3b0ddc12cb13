//! Viewport geometry for the keyboard and the note roll.
//!
//! `Layout` is the single owner of viewport state and the only place where
//! note numbers become pixels (and back). Screen x for a world position `u`
//! (measured in natural-key widths from A0) is `pan_x + u * natural_width`.
//!
//! Pan is stored in one canonical form, the pixel offset `pan_x`. The
//! "center note + visible keys" form is derived on demand by
//! [`Layout::visible_range`] and applied by [`Layout::set_visible_range`].
//!
//! # Invariants
//!
//! After every mutating call:
//! 1. `visible_keys` is within `[min_visible_keys, max_visible_keys]`.
//! 2. `pan_x` is within [`Layout::pan_bounds`] for the current zoom and width.
//! 3. `keyboard_height()` is within `[min_keyboard_height, max_keyboard_fraction * height]`
//!    (the fraction wins when the two conflict).

use std::ops::RangeInclusive;

use crate::config::LayoutConfig;
use crate::error::ValidationError;
use crate::pitch::{self, Pitch, HIGHEST_NOTE, LOWEST_NOTE, NATURAL_KEY_COUNT};

/// Accidental placement relative to the boundary between its two naturals,
/// as a fraction of the accidental's width. Indexed by chroma class.
const ACCIDENTAL_OFFSETS: [f64; 12] = [0.0, -0.1, 0.0, 0.1, 0.0, 0.0, -0.15, 0.0, 0.0, 0.0, 0.15, 0.0];

const EPSILON: f64 = 1e-9;

/// Vertical region of the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Scrolling note blocks above the keyboard
    Roll,
    /// Piano strip at the bottom
    Keyboard,
}

/// Screen rectangle of a key, anchored at the top of the keyboard strip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyGeometry {
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub is_natural: bool,
}

impl KeyGeometry {
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.x && x < self.x + self.width
    }
}

/// Horizontal lane of a note block in the roll
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteBlockGeometry {
    pub x: f64,
    pub width: f64,
}

/// Alternate pan representation: which note is centered, at what zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleRange {
    pub center_note: f64,
    pub visible_keys: f64,
}

/// Viewport state and note <-> pixel conversions
#[derive(Debug, Clone)]
pub struct Layout {
    config: LayoutConfig,
    width: f64,
    height: f64,
    /// Explicit strip height, if the host set one
    keyboard_height_override: Option<f64>,
    visible_keys: f64,
    pan_x: f64,
    /// Breakpoint default for the last applied width
    breakpoint_keys: f64,
}

impl Layout {
    pub fn new(config: LayoutConfig, width: f64, height: f64) -> Self {
        let width = sanitize_length(width);
        let breakpoint_keys = config.breakpoint_keys(width);
        let mut layout = Self {
            width,
            height: sanitize_length(height),
            keyboard_height_override: None,
            visible_keys: breakpoint_keys,
            pan_x: 0.0,
            breakpoint_keys,
            config,
        };
        layout.visible_keys = layout.clamp_visible_keys(breakpoint_keys);
        layout.pan_x = layout.clamp_pan_offset(
            layout.screen_x_for_center_note(pitch::MIDDLE_C as f64),
            false,
        );
        layout
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Current pan offset (the x the animator drives)
    pub fn x(&self) -> f64 {
        self.pan_x
    }

    /// Current zoom, as a count of natural keys across the viewport
    pub fn visible_keys(&self) -> f64 {
        self.visible_keys
    }

    /// Width of one natural key in pixels
    pub fn natural_width(&self) -> f64 {
        if self.width <= 0.0 {
            return 0.0;
        }
        self.width / self.visible_keys
    }

    /// Width of the whole keyboard in pixels
    pub fn content_width(&self) -> f64 {
        NATURAL_KEY_COUNT as f64 * self.natural_width()
    }

    pub fn keyboard_height(&self) -> f64 {
        let max = self.config.max_keyboard_fraction * self.height;
        let wanted = self
            .keyboard_height_override
            .unwrap_or(self.config.keyboard_height_ratio * self.height);
        wanted.max(self.config.min_keyboard_height).min(max)
    }

    /// Top edge of the keyboard strip
    pub fn keyboard_top(&self) -> f64 {
        self.height - self.keyboard_height()
    }

    // ========================================================================
    // Sizing
    // ========================================================================

    /// Resize the container.
    ///
    /// If the width moves to a different breakpoint tier and the current zoom
    /// still equals the old tier's default, the zoom snaps to the new default.
    /// A zoom the user picked is kept, unless it happens to equal the old
    /// default, in which case it is indistinguishable and snaps too.
    /// The world point at the viewport center stays centered.
    pub fn set_pixel_size(&mut self, width: f64, height: f64) {
        let center = self.world_center();
        let width = sanitize_length(width);
        let new_default = self.config.breakpoint_keys(width);

        if (new_default - self.breakpoint_keys).abs() > EPSILON
            && (self.visible_keys - self.breakpoint_keys).abs() < EPSILON
        {
            tracing::debug!(
                from = self.breakpoint_keys,
                to = new_default,
                width,
                "breakpoint zoom snap"
            );
            self.visible_keys = self.clamp_visible_keys(new_default);
        }
        self.breakpoint_keys = new_default;
        self.width = width;
        self.height = sanitize_length(height);

        let target = match center {
            Some(u) => self.width / 2.0 - u * self.natural_width(),
            None => self.screen_x_for_center_note(pitch::MIDDLE_C as f64),
        };
        self.pan_x = self.clamp_pan_offset(target, false);
    }

    /// Override the keyboard strip height (None = proportional default)
    pub fn set_keyboard_height(&mut self, height: Option<f64>) {
        self.keyboard_height_override = height.filter(|h| h.is_finite());
    }

    // ========================================================================
    // Pan
    // ========================================================================

    /// Valid pan range for the current zoom and width
    pub fn pan_bounds(&self, allow_overscroll: bool) -> (f64, f64) {
        let content = self.content_width();
        // max() also maps a NaN margin to zero
        let margin = if allow_overscroll {
            (self.config.overscroll_fraction * self.width).max(0.0)
        } else {
            0.0
        };

        if content <= self.width {
            let centered = (self.width - content) / 2.0;
            (centered - margin, centered + margin)
        } else {
            (self.width - content - margin, margin)
        }
    }

    /// Bound a pan offset so the keyboard edges stay on screen.
    ///
    /// When the keyboard is narrower than the viewport it is centered, and the
    /// requested x only matters within the overscroll margin.
    pub fn clamp_pan_offset(&self, x: f64, allow_overscroll: bool) -> f64 {
        let (lo, hi) = self.pan_bounds(allow_overscroll);
        if x.is_nan() {
            return self.pan_x.clamp(lo, hi);
        }
        x.clamp(lo, hi)
    }

    pub fn set_pan_offset(&mut self, x: f64) {
        self.pan_x = self.clamp_pan_offset(x, false);
    }

    /// Set pan allowing the overscroll margin (wheel scrolling)
    pub fn set_pan_offset_overscroll(&mut self, x: f64) {
        self.pan_x = self.clamp_pan_offset(x, true);
    }

    /// Snap a pan offset to the nearest whole-key boundary inside the pan bounds
    pub fn quantize_pan_offset(&self, x: f64) -> f64 {
        let clamped = self.clamp_pan_offset(x, false);
        let key = self.natural_width();
        if key <= 0.0 {
            return clamped;
        }

        let (lo, hi) = self.pan_bounds(false);
        let lo_k = (lo / key - EPSILON).ceil();
        let hi_k = (hi / key + EPSILON).floor();
        if lo_k > hi_k {
            return clamped;
        }
        let k = (clamped / key).round().clamp(lo_k, hi_k);
        (k * key).clamp(lo, hi)
    }

    // ========================================================================
    // Zoom
    // ========================================================================

    /// Visible key window, ordered and positive even for an unchecked config
    fn key_window(&self) -> (f64, f64) {
        let (a, b) = (self.config.min_visible_keys, self.config.max_visible_keys);
        if a.is_finite() && b.is_finite() && a.min(b) > 0.0 {
            (a.min(b), a.max(b))
        } else {
            let fallback = LayoutConfig::default();
            (fallback.min_visible_keys, fallback.max_visible_keys)
        }
    }

    pub fn clamp_visible_keys(&self, keys: f64) -> f64 {
        let (min, max) = self.key_window();
        let keys = if keys.is_nan() { self.visible_keys } else { keys };
        if keys.is_nan() {
            return min;
        }
        keys.clamp(min, max)
    }

    /// Zoom about the viewport center
    pub fn set_zoom_factor(&mut self, visible_keys: f64) {
        self.zoom_about(visible_keys, self.width / 2.0);
    }

    /// Zoom so the world point under `anchor_x` stays under `anchor_x`
    pub fn zoom_about(&mut self, visible_keys: f64, anchor_x: f64) {
        self.zoom_about_within(visible_keys, anchor_x, false);
    }

    /// Like [`Layout::zoom_about`], but the pan may stay in the overscroll
    /// margin (wheel gestures)
    pub fn zoom_about_overscroll(&mut self, visible_keys: f64, anchor_x: f64) {
        self.zoom_about_within(visible_keys, anchor_x, true);
    }

    fn zoom_about_within(&mut self, visible_keys: f64, anchor_x: f64, allow_overscroll: bool) {
        let anchor = self.world_at(anchor_x);
        self.visible_keys = self.clamp_visible_keys(visible_keys);
        let target = match anchor {
            Some(u) => anchor_x - u * self.natural_width(),
            None => self.pan_x,
        };
        self.pan_x = self.clamp_pan_offset(target, allow_overscroll);
    }

    /// Round a zoom to a whole number of visible natural keys
    pub fn quantize_zoom(&self, visible_keys: f64) -> f64 {
        let keys = self.clamp_visible_keys(visible_keys);
        self.clamp_visible_keys(keys.round())
    }

    /// Breakpoint default for the current width
    pub fn default_visible_keys(&self) -> f64 {
        self.clamp_visible_keys(self.breakpoint_keys)
    }

    // ========================================================================
    // World <-> screen
    // ========================================================================

    /// World position (natural-key units from A0) under a screen x
    fn world_at(&self, screen_x: f64) -> Option<f64> {
        let key = self.natural_width();
        if key <= 0.0 || !screen_x.is_finite() {
            return None;
        }
        Some((screen_x - self.pan_x) / key)
    }

    fn world_center(&self) -> Option<f64> {
        self.world_at(self.width / 2.0)
    }

    /// Center of a key in world units
    fn note_center(note: i32, width_ratio: f64) -> f64 {
        let pitch = Pitch::new(note);
        let boundary = pitch.natural_index() as f64;
        if pitch.is_natural {
            boundary + 0.5
        } else {
            boundary + ACCIDENTAL_OFFSETS[pitch.chroma as usize] * width_ratio
        }
    }

    /// Key center in world units, interpolated for fractional notes
    fn fractional_note_center(&self, note: f64) -> f64 {
        let ratio = self.config.accidental_width_ratio;
        let low = note.floor();
        let t = note - low;
        let a = Self::note_center(low as i32, ratio);
        if t < EPSILON {
            return a;
        }
        let b = Self::note_center(low as i32 + 1, ratio);
        a + (b - a) * t
    }

    /// Pan offset that puts a note's key center at the viewport center
    pub fn screen_x_for_center_note(&self, note: f64) -> f64 {
        let u = self.fractional_note_center(note);
        self.width / 2.0 - u * self.natural_width()
    }

    /// Keyboard note whose key center is nearest the viewport center at pan `x`
    pub fn center_note_for_screen_x(&self, x: f64) -> u8 {
        let key = self.natural_width();
        if key <= 0.0 || !x.is_finite() {
            return pitch::MIDDLE_C;
        }
        let u = (self.width / 2.0 - x) / key;
        let ratio = self.config.accidental_width_ratio;

        pitch::keyboard_notes()
            .min_by(|&a, &b| {
                let da = (Self::note_center(a as i32, ratio) - u).abs();
                let db = (Self::note_center(b as i32, ratio) - u).abs();
                da.total_cmp(&db)
            })
            .unwrap_or(pitch::MIDDLE_C)
    }

    /// Note currently at the viewport center
    pub fn center_note(&self) -> u8 {
        self.center_note_for_screen_x(self.pan_x)
    }

    pub fn set_center_note(&mut self, note: f64) -> Result<(), ValidationError> {
        if !(note >= LOWEST_NOTE as f64 && note <= HIGHEST_NOTE as f64) {
            return Err(ValidationError::CenterOutOfRange(note));
        }
        self.pan_x = self.clamp_pan_offset(self.screen_x_for_center_note(note), false);
        Ok(())
    }

    pub fn visible_range(&self) -> VisibleRange {
        VisibleRange {
            center_note: self.center_note() as f64,
            visible_keys: self.visible_keys,
        }
    }

    /// Zoom to `visible_keys` and center `center_note`; both are validated first
    pub fn set_visible_range(
        &mut self,
        center_note: f64,
        visible_keys: f64,
    ) -> Result<(), ValidationError> {
        let (min, max) = (self.config.min_visible_keys, self.config.max_visible_keys);
        if !(visible_keys >= min && visible_keys <= max) {
            return Err(ValidationError::VisibleKeysOutOfRange {
                count: visible_keys,
                min,
                max,
            });
        }
        if !(center_note >= LOWEST_NOTE as f64 && center_note <= HIGHEST_NOTE as f64) {
            return Err(ValidationError::CenterOutOfRange(center_note));
        }
        self.visible_keys = visible_keys;
        self.set_center_note(center_note)
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Screen rectangle of a key (x and size; y is the keyboard top)
    pub fn key_geometry(&self, note: u8) -> KeyGeometry {
        let pitch = Pitch::from(note);
        let key = self.natural_width();
        let boundary = self.pan_x + pitch.natural_index() as f64 * key;
        let strip = self.keyboard_height();

        if pitch.is_natural {
            KeyGeometry {
                x: boundary,
                width: key,
                height: strip,
                is_natural: true,
            }
        } else {
            let width = key * self.config.accidental_width_ratio;
            let offset = ACCIDENTAL_OFFSETS[pitch.chroma as usize] * width;
            KeyGeometry {
                x: boundary - width / 2.0 + offset,
                width,
                height: strip * self.config.accidental_height_ratio,
                is_natural: false,
            }
        }
    }

    /// Horizontal lane for a note's blocks in the roll.
    ///
    /// Accidental blocks are wider than their key and lean the same way the
    /// key leans off the boundary between its neighbors.
    pub fn note_block_geometry(&self, note: u8) -> NoteBlockGeometry {
        let pitch = Pitch::from(note);
        let key = self.natural_width();
        let boundary = self.pan_x + pitch.natural_index() as f64 * key;

        if pitch.is_natural {
            NoteBlockGeometry { x: boundary, width: key }
        } else {
            let width = key * self.config.accidental_block_ratio;
            let offset = ACCIDENTAL_OFFSETS[pitch.chroma as usize] * width;
            NoteBlockGeometry {
                x: boundary - width / 2.0 + offset,
                width,
            }
        }
    }

    pub fn region_at(&self, y: f64) -> Region {
        if y >= self.keyboard_top() {
            Region::Keyboard
        } else {
            Region::Roll
        }
    }

    /// Whether a point lies within the keyboard strip
    pub fn in_keyboard(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x < self.width && y >= self.keyboard_top() && y < self.height
    }

    /// The key under a point, accidentals first since they are drawn on top
    pub fn key_at(&self, x: f64, y: f64) -> Option<u8> {
        if !self.in_keyboard(x, y) {
            return None;
        }
        let depth = y - self.keyboard_top();
        let accidental = pitch::keyboard_notes()
            .filter(|&n| !Pitch::from(n).is_natural)
            .find(|&n| {
                let key = self.key_geometry(n);
                key.contains_x(x) && depth < key.height
            });
        accidental.or_else(|| {
            pitch::keyboard_notes()
                .filter(|&n| Pitch::from(n).is_natural)
                .find(|&n| self.key_geometry(n).contains_x(x))
        })
    }

    /// Notes whose keys intersect the viewport
    pub fn visible_notes(&self) -> RangeInclusive<u8> {
        let on_screen = |&n: &u8| {
            let key = self.key_geometry(n);
            key.x + key.width > 0.0 && key.x < self.width
        };
        let first = pitch::keyboard_notes().find(on_screen);
        let last = pitch::keyboard_notes().rev().find(on_screen);
        match (first, last) {
            (Some(first), Some(last)) => first..=last,
            #[allow(clippy::reversed_empty_ranges)]
            _ => HIGHEST_NOTE..=LOWEST_NOTE,
        }
    }
}

fn sanitize_length(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
