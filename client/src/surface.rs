use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Render scale for supersampling: at least 2x for crisp text and polygon
/// edges, or the native device pixel ratio if higher.
pub fn render_scale() -> f64 {
    let dpr = web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0);
    dpr.max(2.0)
}

/// CSS width of the canvas's container, used to size each chart.
pub fn container_width(canvas: &HtmlCanvasElement, fallback: f64) -> f64 {
    canvas
        .parent_element()
        .map(|p| p.client_width() as f64)
        .filter(|w| *w > 0.0)
        .unwrap_or(fallback)
}

/// A chart's drawing surface: caches the 2D context and keeps the backing
/// store sized to the CSS dimensions times the render scale. Resizing resets
/// canvas state, so the cache is invalidated whenever dimensions change.
pub struct CanvasSurface {
    cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>>,
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self {
            cached_ctx: Rc::new(RefCell::new(None)),
        }
    }

    /// Context scaled so drawing uses CSS-pixel coordinates.
    pub fn context(
        &self,
        canvas: &HtmlCanvasElement,
        css_width: f64,
        css_height: f64,
    ) -> Option<CanvasRenderingContext2d> {
        let scale = render_scale();
        let expected_w = (css_width * scale).round().max(1.0) as u32;
        let expected_h = (css_height * scale).round().max(1.0) as u32;
        if canvas.width() != expected_w || canvas.height() != expected_h {
            canvas.set_width(expected_w);
            canvas.set_height(expected_h);
            *self.cached_ctx.borrow_mut() = None;
        }

        let mut cache = self.cached_ctx.borrow_mut();
        if cache.is_none() {
            let ctx = canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())?;
            ctx.scale(scale, scale).ok();
            *cache = Some(ctx);
        }
        cache.clone()
    }
}
