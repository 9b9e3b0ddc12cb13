//! Note blocks scrolling up from the keyboard.
//!
//! A block is born at the keyboard's top edge when a note starts and grows
//! upward while the note is held. After release it detaches and keeps
//! rising until it leaves the roll, at which point it is dropped.
//!
//! Expired blocks are removed in one `retain` pass per tick; the block list
//! is never shortened while an index into it is live.

use crate::layout::Layout;

/// Default rise speed in pixels per millisecond
pub const DEFAULT_SPEED: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct NoteBlock {
    pub note: u8,
    pub color: String,
    pub identifier: Option<String>,
    /// Roll clock at note start (ms)
    pub start_ms: f64,
    /// Roll clock at note end, if released
    pub end_ms: Option<f64>,
}

/// Screen rectangle of a block, clipped to the roll
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRect {
    pub note: u8,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct NoteRoll {
    blocks: Vec<NoteBlock>,
    now_ms: f64,
    speed: f64,
}

impl Default for NoteRoll {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED)
    }
}

impl NoteRoll {
    pub fn new(speed: f64) -> Self {
        Self {
            blocks: Vec::new(),
            now_ms: 0.0,
            speed: if speed.is_finite() && speed > 0.0 { speed } else { DEFAULT_SPEED },
        }
    }

    pub fn blocks(&self) -> &[NoteBlock] {
        &self.blocks
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn start(&mut self, note: u8, color: &str, identifier: Option<&str>) {
        self.blocks.push(NoteBlock {
            note,
            color: color.to_string(),
            identifier: identifier.map(str::to_string),
            start_ms: self.now_ms,
            end_ms: None,
        });
    }

    /// End the latest open block of `note` with a matching identifier
    pub fn end(&mut self, note: u8, identifier: Option<&str>) {
        let now = self.now_ms;
        if let Some(block) = self
            .blocks
            .iter_mut()
            .rev()
            .find(|b| b.note == note && b.end_ms.is_none() && b.identifier.as_deref() == identifier)
        {
            block.end_ms = Some(now);
        }
    }

    /// End every open block
    pub fn end_all(&mut self) {
        let now = self.now_ms;
        for block in self.blocks.iter_mut().filter(|b| b.end_ms.is_none()) {
            block.end_ms = Some(now);
        }
    }

    /// Advance the clock and drop blocks that have risen past the top
    pub fn tick(&mut self, delta_ms: f64, roll_height: f64) {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.now_ms += delta_ms;
        }
        let now = self.now_ms;
        let speed = self.speed;
        let before = self.blocks.len();
        self.blocks.retain(|b| match b.end_ms {
            Some(end) => (now - end) * speed <= roll_height,
            None => true,
        });
        let dropped = before - self.blocks.len();
        if dropped > 0 {
            tracing::trace!(dropped, "expired note blocks");
        }
    }

    /// Block rectangles in screen space, for blocks inside the roll
    pub fn rects(&self, layout: &Layout) -> Vec<BlockRect> {
        let bottom = layout.keyboard_top();
        self.blocks
            .iter()
            .filter_map(|b| {
                let top = bottom - (self.now_ms - b.start_ms) * self.speed;
                let lower = match b.end_ms {
                    Some(end) => bottom - (self.now_ms - end) * self.speed,
                    None => bottom,
                };
                let top = top.max(0.0);
                if lower <= 0.0 || lower <= top {
                    return None;
                }
                let lane = layout.note_block_geometry(b.note);
                if lane.x + lane.width <= 0.0 || lane.x >= layout.width() {
                    return None;
                }
                Some(BlockRect {
                    note: b.note,
                    color: b.color.clone(),
                    x: lane.x,
                    y: top,
                    width: lane.width,
                    height: lower - top,
                })
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }
}
