//! Browser implementations: LocalStorage and the 2D canvas

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Storage};

use super::{KeyValueStore, Surface, TextAlign};
use crate::error::EngineError;

/// `window.localStorage`
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    /// Storage may be unavailable (privacy mode, sandboxed iframe); reads then
    /// return nothing and writes fail.
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable - high scores will not persist");
        }
        Self { storage }
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EngineError> {
        let Some(storage) = &self.storage else {
            return Err(EngineError::Storage("localStorage unavailable".to_string()));
        };
        storage
            .set_item(key, value)
            .map_err(|e| EngineError::Storage(format!("{e:?}")))
    }
}

/// A `<canvas>` element's 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Look up the canvas by element id. A missing element or context is a
    /// session creation failure.
    pub fn from_element_id(id: &str) -> Result<Self, EngineError> {
        let missing = || EngineError::SurfaceMissing {
            session: id.to_string(),
        };
        let canvas: HtmlCanvasElement = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .ok_or_else(missing)?
            .dyn_into()
            .map_err(|_| missing())?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .ok_or_else(missing)?
            .dyn_into()
            .map_err(|_| missing())?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> f32 {
        self.canvas.width() as f32
    }

    fn height(&self) -> f32 {
        self.canvas.height() as f32
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(x as f64, y as f64, w as f64, h as f64);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(x as f64, y as f64, radius as f64, 0.0, std::f64::consts::TAU);
        self.ctx.fill();
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: &str, align: TextAlign) {
        self.ctx.set_fill_style_str(color);
        self.ctx.set_font(&format!("{}px monospace", size.round()));
        self.ctx.set_text_align(align.as_str());
        let _ = self.ctx.fill_text(text, x as f64, y as f64);
    }
}
