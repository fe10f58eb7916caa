//! # Slidebook WASM Application
//!
//! Browser host for the Slidebook viewer: forwards pointer, key and button
//! input to `SlideViewer`, preloads slide images as `<img>` elements and
//! paints each frame onto a 2D canvas.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web slidebook-web
//! ```
//!
//! Then import in JavaScript:
//! ```javascript
//! import init, { SlideBookApp } from './pkg/slidebook_web.js';
//!
//! await init();
//! const app = new SlideBookApp('slides', await (await fetch('deck.json')).text());
//!
//! canvas.addEventListener('pointerdown', e => app.pointerDown(e.pointerId, e.clientX, e.clientY, e.timeStamp));
//! window.addEventListener('keydown', e => app.keyDown(e.key));
//!
//! function frame(now) {
//!     app.tick(now);
//!     requestAnimationFrame(frame);
//! }
//! requestAnimationFrame(frame);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use slidebook_core::{
    Deck, Frame, InputEvent, Key, LayerTransform, NavButton, PointerEvent, PointerPhase, Slide,
    SlideError, SlideLoader, SlideResult, SlideViewer, ViewerConfig, Viewport,
};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Slidebook WASM initialized");
}

type ImageCache = Rc<RefCell<HashMap<String, HtmlImageElement>>>;

/// Creates `<img>` elements so the browser fetches and decodes ahead of time.
struct DomImageLoader {
    cache: ImageCache,
}

impl DomImageLoader {
    fn ensure(cache: &ImageCache, slide: &Slide) -> Result<(), JsValue> {
        let locator = slide.image.as_str();
        if cache.borrow().contains_key(locator) {
            return Ok(());
        }
        let image = HtmlImageElement::new()?;
        image.set_alt(&slide.alt_text);
        image.set_src(locator);
        cache.borrow_mut().insert(locator.to_string(), image);
        Ok(())
    }
}

impl SlideLoader for DomImageLoader {
    fn request(&mut self, slide: &Slide) -> SlideResult<()> {
        Self::ensure(&self.cache, slide).map_err(|e| SlideError::Preload {
            index: slide.index,
            reason: e.as_string().unwrap_or_else(|| "image element rejected".to_string()),
        })
    }
}

/// Rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Largest rectangle with the image's aspect ratio that fits the view, centered.
fn fit_contain(image_width: f64, image_height: f64, view_width: f64, view_height: f64) -> Rect {
    if image_width <= 0.0 || image_height <= 0.0 {
        return Rect {
            x: 0.0,
            y: 0.0,
            width: view_width,
            height: view_height,
        };
    }
    let scale = (view_width / image_width).min(view_height / image_height);
    let width = image_width * scale;
    let height = image_height * scale;
    Rect {
        x: (view_width - width) / 2.0,
        y: (view_height - height) / 2.0,
        width,
        height,
    }
}

/// Map a DOM pointer event type to a phase.
fn parse_phase(name: &str) -> Option<PointerPhase> {
    match name {
        "down" | "pointerdown" | "touchstart" => Some(PointerPhase::Down),
        "move" | "pointermove" | "touchmove" => Some(PointerPhase::Move),
        "up" | "pointerup" | "touchend" => Some(PointerPhase::Up),
        "cancel" | "pointercancel" | "touchcancel" => Some(PointerPhase::Cancel),
        _ => None,
    }
}

/// DOM timestamps are fractional milliseconds; the viewer clock is whole ones.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_millis(timestamp: f64) -> u64 {
    if timestamp.is_finite() && timestamp > 0.0 {
        timestamp as u64
    } else {
        0
    }
}

struct CanvasPainter {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    images: ImageCache,
    background_color: String,
}

impl CanvasPainter {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn paint(&self, frame: &Frame, deck: &Deck) -> Result<(), JsValue> {
        let (width, height) = self.size();
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style_str(&self.background_color);
        self.ctx.fill_rect(0.0, 0.0, width, height);

        if let Some(outgoing) = &frame.outgoing {
            self.paint_layer(outgoing.image.as_str(), &outgoing.transform)?;
        }
        if let Some(slide) = deck.get(frame.page) {
            DomImageLoader::ensure(&self.images, slide)?;
        }
        self.paint_layer(frame.image.as_str(), &frame.current)?;

        if frame.counter.visible {
            self.ctx.set_global_alpha(f64::from(frame.counter.opacity));
            self.ctx.set_fill_style_str("#ffffff");
            self.ctx.set_font("16px sans-serif");
            self.ctx.set_text_align("center");
            self.ctx
                .fill_text(&frame.counter.label, width / 2.0, height - 40.0)?;
        }
        self.paint_dots(&frame.dots, width, height)?;
        self.ctx.set_global_alpha(1.0);
        Ok(())
    }

    fn paint_layer(&self, locator: &str, layer: &LayerTransform) -> Result<(), JsValue> {
        let images = self.images.borrow();
        let Some(image) = images.get(locator) else {
            return Ok(());
        };
        if !image.complete() || layer.opacity <= 0.0 {
            return Ok(());
        }

        let (width, height) = self.size();
        let rect = fit_contain(
            f64::from(image.natural_width()),
            f64::from(image.natural_height()),
            width,
            height,
        );

        self.ctx.save();
        self.ctx.set_global_alpha(f64::from(layer.opacity.clamp(0.0, 1.0)));
        self.ctx.translate(
            width / 2.0 + f64::from(layer.translate_x),
            height / 2.0 + f64::from(layer.translate_y),
        )?;
        self.ctx
            .scale(f64::from(layer.scale), f64::from(layer.scale))?;
        let drawn = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            image,
            rect.x - width / 2.0,
            rect.y - height / 2.0,
            rect.width,
            rect.height,
        );
        self.ctx.restore();
        drawn
    }

    #[allow(clippy::cast_precision_loss)] // Dot counts are small
    fn paint_dots(&self, dots: &[bool], width: f64, height: f64) -> Result<(), JsValue> {
        const SPACING: f64 = 12.0;
        const RADIUS: f64 = 3.0;
        let start = width / 2.0 - SPACING * (dots.len().saturating_sub(1) as f64) / 2.0;
        for (i, active) in dots.iter().enumerate() {
            self.ctx
                .set_global_alpha(if *active { 0.9 } else { 0.35 });
            self.ctx.set_fill_style_str("#ffffff");
            self.ctx.begin_path();
            self.ctx.arc(
                start + SPACING * i as f64,
                height - 16.0,
                RADIUS,
                0.0,
                std::f64::consts::TAU,
            )?;
            self.ctx.fill();
        }
        Ok(())
    }
}

/// The slide viewer application for WASM.
#[wasm_bindgen]
pub struct SlideBookApp {
    viewer: SlideViewer<DomImageLoader>,
    painter: CanvasPainter,
    frame_count: u64,
}

#[wasm_bindgen]
impl SlideBookApp {
    /// Create a viewer over `manifest_json` attached to the given canvas element ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas element is not found, the 2D context
    /// fails or the manifest is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, manifest_json: &str) -> Result<SlideBookApp, JsValue> {
        Self::with_config(canvas_id, manifest_json, None)
    }

    /// Like the constructor, with a viewer configuration JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas, manifest or configuration is invalid.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        canvas_id: &str,
        manifest_json: &str,
        config_json: Option<String>,
    ) -> Result<SlideBookApp, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("No document object"))?;

        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("Canvas element '{canvas_id}' not found")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("Element is not a canvas"))?;

        let ctx = canvas
            .get_context("2d")
            .map_err(|_| JsValue::from_str("Failed to get 2D context"))?
            .ok_or_else(|| JsValue::from_str("2D context not available"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| JsValue::from_str("Failed to cast to 2D context"))?;

        let deck = Deck::from_manifest_json(manifest_json).map_err(|e| to_js_error(&e))?;
        let config = match config_json {
            Some(json) => ViewerConfig::from_json(&json).map_err(|e| to_js_error(&e))?,
            None => ViewerConfig::default(),
        };

        #[allow(clippy::cast_precision_loss)]
        let viewport = Viewport::new(canvas.width() as f32, canvas.height() as f32);

        let images: ImageCache = Rc::new(RefCell::new(HashMap::new()));
        let loader = DomImageLoader {
            cache: Rc::clone(&images),
        };
        let viewer =
            SlideViewer::new(deck, config, viewport, loader).map_err(|e| to_js_error(&e))?;

        Ok(Self {
            viewer,
            painter: CanvasPainter {
                canvas,
                ctx,
                images,
                background_color: "#000000".to_string(),
            },
            frame_count: 0,
        })
    }

    /// Advance animations to `now` (DOM milliseconds) and paint.
    pub fn tick(&mut self, now: f64) {
        let frame = self.viewer.tick(to_millis(now));
        if let Err(err) = self.painter.paint(&frame, self.viewer.deck()) {
            tracing::error!("Paint error: {:?}", err);
        }
        self.frame_count += 1;
    }

    /// Feed a pointer event. `phase` is `down`, `move`, `up` or `cancel`
    /// (DOM event type names are accepted too). Unknown phases are ignored.
    pub fn pointer(&mut self, phase: &str, pointer_id: u32, x: f32, y: f32, timestamp: f64) {
        let Some(phase) = parse_phase(phase) else {
            tracing::warn!("Ignoring unknown pointer phase: {}", phase);
            return;
        };
        let event = PointerEvent::new(pointer_id, phase, x, y, to_millis(timestamp));
        self.viewer.handle_input(&InputEvent::Pointer(event));
    }

    /// Pointer pressed.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, pointer_id: u32, x: f32, y: f32, timestamp: f64) {
        self.pointer("down", pointer_id, x, y, timestamp);
    }

    /// Pointer moved.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, pointer_id: u32, x: f32, y: f32, timestamp: f64) {
        self.pointer("move", pointer_id, x, y, timestamp);
    }

    /// Pointer released.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, pointer_id: u32, x: f32, y: f32, timestamp: f64) {
        self.pointer("up", pointer_id, x, y, timestamp);
    }

    /// Pointer stream cancelled by the browser.
    #[wasm_bindgen(js_name = pointerCancel)]
    pub fn pointer_cancel(&mut self, pointer_id: u32, x: f32, y: f32, timestamp: f64) {
        self.pointer("cancel", pointer_id, x, y, timestamp);
    }

    /// Keyboard input (`KeyboardEvent.key`). Returns whether the key was used.
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str) -> bool {
        let key = Key::from_name(key);
        if key == Key::Other {
            return false;
        }
        self.viewer.handle_input(&InputEvent::Key(key));
        true
    }

    /// "Previous" control.
    #[wasm_bindgen(js_name = prev)]
    pub fn prev_page(&mut self) {
        self.viewer.handle_input(&InputEvent::Button(NavButton::Prev));
    }

    /// "Next" control.
    #[wasm_bindgen(js_name = next)]
    pub fn next_page(&mut self) {
        self.viewer.handle_input(&InputEvent::Button(NavButton::Next));
    }

    /// Resize the canvas and tell the viewer where it sits on the page.
    pub fn resize(&mut self, width: u32, height: u32, left: f32, top: f32) {
        self.painter.canvas.set_width(width);
        self.painter.canvas.set_height(height);
        #[allow(clippy::cast_precision_loss)]
        let viewport = Viewport::new(width as f32, height as f32).with_origin(left, top);
        self.viewer.handle_input(&InputEvent::Resize(viewport));
    }

    /// Set the letterbox color.
    #[wasm_bindgen(js_name = setBackgroundColor)]
    pub fn set_background_color(&mut self, color: &str) {
        self.painter.background_color = color.to_string();
    }

    /// Current page, 1-based.
    #[wasm_bindgen(js_name = currentPage)]
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.viewer.page() + 1
    }

    /// Number of slides.
    #[wasm_bindgen(js_name = pageCount)]
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.viewer.deck().len()
    }

    /// Alt text of the current slide, for an ARIA live region.
    #[wasm_bindgen(js_name = altText)]
    #[must_use]
    pub fn alt_text(&self) -> String {
        self.viewer
            .deck()
            .get(self.viewer.page())
            .map(|s| s.alt_text.clone())
            .unwrap_or_default()
    }

    /// Whether a double-tap zoom is active.
    #[wasm_bindgen(js_name = isZoomed)]
    #[must_use]
    pub fn is_zoomed(&self) -> bool {
        self.viewer.view().is_zoomed()
    }

    /// Whether animations are still running (skip `tick` when idle).
    #[wasm_bindgen(js_name = isAnimating)]
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.viewer.is_animating()
    }

    /// Frames painted so far.
    #[wasm_bindgen(js_name = frameCount)]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The latest frame as JSON, for debugging overlays.
    #[wasm_bindgen(js_name = frameJson)]
    #[must_use]
    pub fn frame_json(&self) -> String {
        serde_json::to_string(&self.viewer.frame()).unwrap_or_else(|_| "{}".to_string())
    }
}

fn to_js_error(error: &SlideError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_contain_letterboxes_wide_image() {
        let rect = fit_contain(1600.0, 900.0, 400.0, 800.0);
        assert!((rect.width - 400.0).abs() < 1e-9);
        assert!((rect.height - 225.0).abs() < 1e-9);
        assert!(rect.x.abs() < 1e-9);
        assert!((rect.y - 287.5).abs() < 1e-9);
    }

    #[test]
    fn test_fit_contain_pillarboxes_tall_image() {
        let rect = fit_contain(900.0, 1600.0, 800.0, 400.0);
        assert!((rect.height - 400.0).abs() < 1e-9);
        assert!((rect.x - 287.5).abs() < 1e-9);
    }

    #[test]
    fn test_fit_contain_unknown_size_fills() {
        let rect = fit_contain(0.0, 0.0, 300.0, 500.0);
        assert_eq!(
            rect,
            Rect {
                x: 0.0,
                y: 0.0,
                width: 300.0,
                height: 500.0
            }
        );
    }

    #[test]
    fn test_parse_phase() {
        assert_eq!(parse_phase("pointerdown"), Some(PointerPhase::Down));
        assert_eq!(parse_phase("move"), Some(PointerPhase::Move));
        assert_eq!(parse_phase("touchend"), Some(PointerPhase::Up));
        assert_eq!(parse_phase("pointercancel"), Some(PointerPhase::Cancel));
        assert_eq!(parse_phase("hover"), None);
    }

    #[test]
    fn test_to_millis() {
        assert_eq!(to_millis(1234.9), 1234);
        assert_eq!(to_millis(-5.0), 0);
        assert_eq!(to_millis(f64::NAN), 0);
    }
}
