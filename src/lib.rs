//! keyroll - A piano keyboard and note roll viewport
//!
//! This library exposes the layout engine, gesture controllers and note
//! bookkeeping behind the terminal app, for testing and embedding in other
//! hosts.

pub mod animator;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod input;
pub mod layout;
pub mod notes;
pub mod pitch;
pub mod replay;
pub mod roll;
pub mod ui;
pub mod view;

pub use config::Config;
pub use error::{ConfigError, ValidationError};
pub use layout::Layout;
pub use view::PianoView;
