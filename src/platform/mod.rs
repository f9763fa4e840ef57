//! Platform abstraction layer
//!
//! The engine only talks to its host through three narrow seams:
//! - `Surface`: fixed-size 2D immediate-mode drawing context
//! - `KeyValueStore`: string-keyed durable storage (LocalStorage on web)
//! - `Notifier`: fire-and-forget toast/achievement callouts
//!
//! In-memory implementations live in `memory` and back the native build and
//! the tests; browser implementations live in `web`.

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use memory::{DrawCall, LogNotifier, MemoryStore, RecordingNotifier, RecordingSurface};

use crate::error::EngineError;

/// Horizontal anchor for text drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// A 2D immediate-mode drawing context with a fixed pixel size.
///
/// Colors are CSS color strings. The engine never reads pixels back.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: &str, align: TextAlign);

    /// Paint the whole surface a single color
    fn clear(&mut self, color: &str) {
        let (w, h) = (self.width(), self.height());
        self.fill_rect(0.0, 0.0, w, h, color);
    }
}

/// Durable string-keyed storage shared by every session.
///
/// Writes are last-writer-wins; no cross-session coordination is attempted.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), EngineError>;
}

/// Fire-and-forget notification sink
pub trait Notifier {
    fn notify(&self, message: &str, kind: &str, duration_ms: u32);
}
