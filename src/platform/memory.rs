//! In-memory host implementations (native builds and tests)

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{KeyValueStore, Notifier, Surface, TextAlign};
use crate::error::EngineError;

/// HashMap-backed store with a switch to simulate a full/disabled storage
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail (quota exceeded, private mode)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Write a raw value, bypassing the failure switch
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EngineError> {
        if self.fail_writes.get() {
            return Err(EngineError::Storage(format!("quota exceeded writing '{key}'")));
        }
        self.insert_raw(key, value);
        Ok(())
    }
}

/// Notifier that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, kind: &str, duration_ms: u32) {
        log::info!("[{kind}] {message} ({duration_ms} ms)");
    }
}

/// Notifier that keeps every message (for assertions)
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub messages: RefCell<Vec<(String, String, u32)>>,
}

impl RecordingNotifier {
    pub fn count(&self) -> usize {
        self.messages.borrow().len()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, kind: &str, duration_ms: u32) {
        self.messages
            .borrow_mut()
            .push((message.to_string(), kind.to_string(), duration_ms));
    }
}

/// A single recorded drawing command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Rect { x: f32, y: f32, w: f32, h: f32, color: String },
    Circle { x: f32, y: f32, radius: f32, color: String },
    Text { text: String, x: f32, y: f32, size: f32 },
}

/// Headless surface that records draw calls from the latest frame
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: f32,
    height: f32,
    pub calls: Vec<DrawCall>,
    pub frames: u64,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
            frames: 0,
        }
    }

    /// All text drawn in the latest frame
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
        self.calls.push(DrawCall::Rect {
            x,
            y,
            w,
            h,
            color: color.to_string(),
        });
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str) {
        self.calls.push(DrawCall::Circle {
            x,
            y,
            radius,
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, _color: &str, _align: TextAlign) {
        self.calls.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            size,
        });
    }

    /// A clear starts a new frame
    fn clear(&mut self, color: &str) {
        self.calls.clear();
        self.frames += 1;
        let (w, h) = (self.width, self.height);
        self.fill_rect(0.0, 0.0, w, h, color);
    }
}
