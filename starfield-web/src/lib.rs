/// Starfield Web - canvas backdrop for browsers
///
/// The host page owns the animation loop: it calls `frame` from
/// `requestAnimationFrame` and `free` when the backdrop is torn down.
/// Pointer parallax follows window `mousemove` events while the instance lives.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use starfield_core::{
    Camera, FrameClock, InputBus, InputEvent, Layer, PointerParallaxTracker, StarField,
    StarFieldConfig, Viewport,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

pub mod canvas;
pub mod listener;

pub use canvas::CanvasSurface;
use listener::EventListener;

#[wasm_bindgen]
pub struct WebStarField {
    field: StarField,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    surface: CanvasSurface,
    camera: Camera,
    clock: FrameClock,
    window: Window,
    resized: Rc<Cell<bool>>,
    // Detached from the window when dropped
    _listeners: Vec<EventListener>,
    tracker: PointerParallaxTracker,
    _input: InputBus,
}

#[wasm_bindgen]
impl WebStarField {
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        count: u32,
        shooting_star_count: u32,
        seed: Option<u32>,
    ) -> Result<WebStarField, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id `{canvas_id}`")))?
            .dyn_into::<HtmlCanvasElement>()?;
        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let mut config = StarFieldConfig::new(count as usize, shooting_star_count as usize);
        if let Some(seed) = seed {
            config = config.with_seed(seed as u64);
        }
        let field = StarField::new(config);

        let viewport = window_viewport(&window)?;
        let input = InputBus::new();
        let tracker = field.track_pointer(&input, viewport);
        let resized = Rc::new(Cell::new(true));

        let pointer_input = input.clone();
        let on_move = EventListener::new(&window, "mousemove", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                pointer_input.publish(InputEvent::PointerMove {
                    client_x: event.client_x() as f32,
                    client_y: event.client_y() as f32,
                });
            }
        })?;

        let resize_input = input.clone();
        let resize_window = window.clone();
        let resize_flag = Rc::clone(&resized);
        let on_resize = EventListener::new(&window, "resize", move |_| {
            match window_viewport(&resize_window) {
                Ok(viewport) => resize_input.publish(InputEvent::Resize(viewport)),
                Err(_) => log::warn!("could not read window size"),
            }
            resize_flag.set(true);
        })?;

        log::debug!(
            "web star field on #{canvas_id}: {count} stars, {shooting_star_count} shooting stars"
        );

        Ok(WebStarField {
            field,
            canvas,
            context,
            surface: CanvasSurface::new(),
            camera: Camera::new(viewport.width as u32, viewport.height as u32),
            clock: FrameClock::new(),
            window,
            resized,
            _listeners: vec![on_move, on_resize],
            tracker,
            _input: input,
        })
    }

    /// Advance to `timestamp_ms` (a `requestAnimationFrame` timestamp) and draw
    pub fn frame(&mut self, timestamp_ms: f64) -> Result<(), JsValue> {
        if self.resized.replace(false) {
            self.fit_canvas()?;
        }

        self.clock.drive(host_time(timestamp_ms), &mut self.field);

        self.field.present(&mut self.surface);
        self.surface.draw(
            &self.context,
            &self.camera,
            self.canvas.width(),
            self.canvas.height(),
        )
    }

    #[wasm_bindgen(js_name = setCount)]
    pub fn set_count(&mut self, count: u32) -> bool {
        self.field.set_count(count as usize)
    }

    #[wasm_bindgen(js_name = setShootingStarCount)]
    pub fn set_shooting_star_count(&mut self, shooting_star_count: u32) -> bool {
        self.field.set_shooting_star_count(shooting_star_count as usize)
    }

    pub fn reseed(&mut self, seed: u32) {
        self.field.reseed(seed as u64);
    }

    /// Packed sky positions, for hosts that draw with their own renderer
    #[wasm_bindgen(js_name = skyPositions)]
    pub fn sky_positions(&self) -> Vec<f32> {
        self.field.layer(Layer::Sky).points().to_flat()
    }

    #[wasm_bindgen(js_name = shootingStarPositions)]
    pub fn shooting_star_positions(&self) -> Vec<f32> {
        self.field.layer(Layer::ShootingStars).points().to_flat()
    }

    /// Sky rotation as `[x, y, z]` radians
    #[wasm_bindgen(js_name = skyRotation)]
    pub fn sky_rotation(&self) -> Vec<f32> {
        let rotation = self.field.sky_transform().rotation;
        vec![rotation.x, rotation.y, rotation.z]
    }

    #[wasm_bindgen(js_name = shootingStarRotation)]
    pub fn shooting_star_rotation(&self) -> Vec<f32> {
        let rotation = self.field.shooting_star_transform().rotation;
        vec![rotation.x, rotation.y, rotation.z]
    }

    #[wasm_bindgen(js_name = shootingStarPosition)]
    pub fn shooting_star_position(&self) -> Vec<f32> {
        let position = self.field.shooting_star_transform().position;
        vec![position.x, position.y, position.z]
    }

    /// Whether pointer parallax is still subscribed
    #[wasm_bindgen(js_name = isTracking)]
    pub fn is_tracking(&self) -> bool {
        self.tracker.is_active()
    }
}

impl WebStarField {
    fn fit_canvas(&mut self) -> Result<(), JsValue> {
        let viewport = window_viewport(&self.window)?;
        let width = viewport.width.max(1.0) as u32;
        let height = viewport.height.max(1.0) as u32;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.camera.resize(width, height);
        Ok(())
    }
}

/// Host timestamp in milliseconds as a duration. Values that cannot be
/// represented map to zero, which the frame clock treats as a stale frame.
fn host_time(timestamp_ms: f64) -> Duration {
    Duration::try_from_secs_f64(timestamp_ms / 1000.0).unwrap_or(Duration::ZERO)
}

fn window_viewport(window: &Window) -> Result<Viewport, JsValue> {
    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let height = window.inner_height()?.as_f64().unwrap_or(0.0);
    Ok(Viewport::new(width as f32, height as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_time_conversion() {
        assert_eq!(host_time(1500.0), Duration::from_millis(1500));
        assert_eq!(host_time(0.0), Duration::ZERO);
    }

    #[test]
    fn test_host_time_rejects_unrepresentable() {
        for timestamp in [-5.0, f64::NAN, f64::INFINITY, 1.0e23, f64::MAX] {
            assert_eq!(host_time(timestamp), Duration::ZERO, "{timestamp}");
        }
    }
}
