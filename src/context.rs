//! Host context shared by the input controllers.
//!
//! Holds the two pieces of state that cut across controllers: the cursor
//! hint the host should show, and a single disposal flag. Controllers get a
//! handle at construction, so there is no global registry to initialize.

use std::cell::Cell;
use std::rc::Rc;

/// Cursor the host should display over the roll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    /// Hovering a draggable area
    Grab,
    /// Dragging
    Grabbing,
}

#[derive(Debug, Default)]
struct Shared {
    cursor: Cell<CursorHint>,
    disposed: Cell<bool>,
}

/// Cheaply clonable handle to the shared host state
#[derive(Debug, Clone, Default)]
pub struct HostContext {
    shared: Rc<Shared>,
}

impl HostContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> CursorHint {
        self.shared.cursor.get()
    }

    pub fn set_cursor(&self, hint: CursorHint) {
        if !self.is_disposed() {
            self.shared.cursor.set(hint);
        }
    }

    /// Stop every controller holding this context from handling input
    pub fn dispose(&self) {
        self.shared.disposed.set(true);
        self.shared.cursor.set(CursorHint::Default);
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let a = HostContext::new();
        let b = a.clone();
        a.set_cursor(CursorHint::Grab);
        assert_eq!(b.cursor(), CursorHint::Grab);

        b.dispose();
        assert!(a.is_disposed());
        assert_eq!(a.cursor(), CursorHint::Default);
    }

    #[test]
    fn test_cursor_frozen_after_dispose() {
        let ctx = HostContext::new();
        ctx.dispose();
        ctx.set_cursor(CursorHint::Grabbing);
        assert_eq!(ctx.cursor(), CursorHint::Default);
    }
}
