//! Minima - a touch-friendly PDF reader library
//!
//! Pages are decoded up front, arranged into single pages or two-page spreads
//! in the chosen reading direction, and shown under a pan/zoom transform
//! driven by touch, mouse and keyboard input.

pub mod config;
pub mod error;
pub mod input;
pub mod pdf;
pub mod reader;
pub mod spread;
pub mod ui;
pub mod zoom;

pub use config::{ReaderSettings, SettingsStore, ViewerConfig};
pub use error::{Error, Result};
pub use pdf::{Document, PageSource};
pub use reader::Reader;
pub use ui::ViewerApp;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ReaderSettings, SettingsStore, ViewerConfig};
    pub use crate::input::{Gesture, GestureTracker, KeyHandler, PointerInput, ReaderAction};
    pub use crate::pdf::{Document, PageSource};
    pub use crate::reader::{GestureEffect, Reader};
    pub use crate::spread::{PageLayout, ReadingDirection, Side, Slot};
    pub use crate::ui::ViewerApp;
    pub use crate::zoom::{FitMode, ZoomController};
}
