//! Arcade Core entry point
//!
//! On the web: binds a `<canvas id="canvas">` to a session of the game named
//! by its `data-game` attribute and runs it from `requestAnimationFrame`.
//! Natively: runs a headless session and prints its final snapshot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_host {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use arcade_core::input::RawInput;
    use arcade_core::platform::web::{CanvasSurface, LocalStorageStore};
    use arcade_core::platform::{LogNotifier, Surface};
    use arcade_core::{EngineError, SessionConfig, SessionHandle, SessionRegistry, VariantKind};

    const CANVAS_ID: &str = "canvas";

    struct App {
        registry: SessionRegistry,
        handle: SessionHandle,
        last_time: f64,
    }

    impl App {
        fn input(&mut self, raw: RawInput) {
            self.registry.handle_input(self.handle, &raw);
        }
    }

    pub fn run() -> Result<(), EngineError> {
        let surface = CanvasSurface::from_element_id(CANVAS_ID)?;
        let canvas = surface.canvas().clone();
        let kind: VariantKind = canvas
            .get_attribute("data-game")
            .unwrap_or_else(|| "snake".to_string())
            .parse()?;

        let mut registry = SessionRegistry::new(Rc::new(LocalStorageStore::new()), Rc::new(LogNotifier));
        let seed = js_sys::Date::now() as u64;
        let config = SessionConfig::new(kind)
            .with_seed(seed)
            .with_settings(registry.settings().clone());
        let surface: Box<dyn Surface> = Box::new(surface);
        let handle = registry.create_with(config, Some(surface))?;
        log::info!("{} ready on #{} (seed {})", kind.title(), CANVAS_ID, seed);

        let app = Rc::new(RefCell::new(App {
            registry,
            handle,
            last_time: 0.0,
        }));
        setup_input_handlers(&canvas, app.clone());
        setup_auto_pause(app.clone());
        request_animation_frame(app);
        Ok(())
    }

    /// Pointer position in canvas pixels
    fn canvas_point(canvas: &HtmlCanvasElement, client_x: f64, client_y: f64) -> (f32, f32) {
        let rect = canvas.get_bounding_client_rect();
        let sx = if rect.width() > 0.0 {
            canvas.width() as f64 / rect.width()
        } else {
            1.0
        };
        let sy = if rect.height() > 0.0 {
            canvas.height() as f64 / rect.height()
        } else {
            1.0
        };
        (
            ((client_x - rect.left()) * sx) as f32,
            ((client_y - rect.top()) * sy) as f32,
        )
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                // Keep arrows and space from scrolling the page
                if matches!(key.as_str(), " " | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight") {
                    event.prevent_default();
                }
                app.borrow_mut().input(RawInput::KeyDown(key));
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                app.borrow_mut().input(RawInput::KeyUp(event.key()));
            });
            let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let (x, y) = canvas_point(&canvas_clone, event.client_x() as f64, event.client_y() as f64);
                app.borrow_mut().input(RawInput::PointerDown { x, y });
            });
            let _ = canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().input(RawInput::PointerUp);
            });
            let _ = window.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch (swipes)
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.changed_touches().get(0) {
                    let (x, y) = canvas_point(&canvas_clone, touch.client_x() as f64, touch.client_y() as f64);
                    app.borrow_mut().input(RawInput::TouchStart { x, y });
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.changed_touches().get(0) {
                    let (x, y) = canvas_point(&canvas_clone, touch.client_x() as f64, touch.client_y() as f64);
                    app.borrow_mut().input(RawInput::TouchEnd { x, y });
                }
            });
            let _ = canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Pause and drop held input when the tab is hidden or the window blurs
    fn setup_auto_pause(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        {
            let app = app.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if doc.hidden() {
                    log::info!("Page hidden, releasing input");
                    app.borrow_mut().registry.focus_lost();
                }
            });
            let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().registry.focus_lost();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            let elapsed = if a.last_time > 0.0 { time - a.last_time } else { 0.0 };
            a.last_time = time;
            a.registry.frame(elapsed);
            if a.registry.is_empty() {
                log::info!("No live sessions, stopping the frame loop");
                return;
            }
        }
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
    if let Err(e) = web_host::run() {
        log::error!("Arcade failed to start: {}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Entry point is wasm_main
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = headless::run() {
        log::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Headless demo: `arcade-core [game] [frames] [seed]`
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::rc::Rc;

    use arcade_core::input::RawInput;
    use arcade_core::platform::{LogNotifier, MemoryStore, RecordingSurface, Surface};
    use arcade_core::{EngineError, SessionConfig, SessionRegistry, VariantKind};

    /// ~60 Hz render opportunities
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Tap the action key this often (frames)
    const TAP_EVERY: u64 = 45;

    pub fn run() -> Result<(), EngineError> {
        let mut args = std::env::args().skip(1);
        let kind: VariantKind = args.next().unwrap_or_else(|| "snake".to_string()).parse()?;
        let frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(600);
        let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);

        log::info!("Arcade Core (native) running {} for {} frames", kind.title(), frames);

        let mut registry = SessionRegistry::new(Rc::new(MemoryStore::new()), Rc::new(LogNotifier));
        let config = SessionConfig::new(kind)
            .with_seed(seed)
            .with_settings(registry.settings().clone());
        let surface: Box<dyn Surface> = Box::new(RecordingSurface::new(400.0, 400.0));
        let handle = registry.create_with(config, Some(surface))?;

        registry.handle_input(handle, &RawInput::KeyDown("Enter".to_string()));
        registry.handle_input(handle, &RawInput::KeyUp("Enter".to_string()));
        for frame in 0..frames {
            if frame % TAP_EVERY == 0 {
                registry.handle_input(handle, &RawInput::KeyDown(" ".to_string()));
                registry.handle_input(handle, &RawInput::KeyUp(" ".to_string()));
            }
            registry.frame(FRAME_MS);
        }

        if let Some(session) = registry.get(handle) {
            match serde_json::to_string_pretty(&session.snapshot()) {
                Ok(json) => println!("{json}"),
                Err(e) => log::warn!("Snapshot not serializable: {}", e),
            }
        }
        registry.destroy(handle);
        Ok(())
    }
}
