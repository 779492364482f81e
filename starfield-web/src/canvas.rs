/// Canvas 2D drawing of the star layers
use starfield_core::{
    projection::project_with, Camera, Layer, PointSet, PointStyle, RenderSurface, RetainedLayers,
    Transform,
};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Backdrop gradient stops, top to bottom
const BACKGROUND: [(f32, &str); 3] = [(0.0, "#0a0a0a"), (0.5, "#1a1a2e"), (1.0, "#16213e")];

/// Smallest square drawn for a point, in pixels
const MIN_POINT_SIZE: f64 = 0.5;

/// Draws retained star layers onto a 2D canvas context
#[derive(Default)]
pub struct CanvasSurface {
    layers: RetainedLayers,
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn point_count(&self, layer: Layer) -> usize {
        self.layers.get(layer).points.len()
    }

    pub fn draw(
        &self,
        context: &CanvasRenderingContext2d,
        camera: &Camera,
        width: u32,
        height: u32,
    ) -> Result<(), JsValue> {
        let gradient = context.create_linear_gradient(0.0, 0.0, 0.0, height as f64);
        for (offset, color) in BACKGROUND {
            gradient.add_color_stop(offset, color)?;
        }
        context.set_fill_style_canvas_gradient(&gradient);
        context.fill_rect(0.0, 0.0, width as f64, height as f64);

        let view_projection = camera.view_projection();
        let pixels_per_unit = camera.pixels_per_unit(height);
        let reference = (camera.position - camera.target).norm();

        for (_, snapshot) in self.layers.iter() {
            context.set_fill_style_str(&snapshot.style.hex());
            let model = snapshot.transform.model_matrix();
            let mvp = view_projection * model;

            for point in &snapshot.points {
                let Some(screen) = project_with(&mvp, point, width, height) else {
                    continue;
                };
                let distance = (camera.position - model.transform_point(point)).norm();
                let size = point_size(&snapshot.style, pixels_per_unit, reference, distance);
                context.fill_rect(
                    screen.x as f64 - size / 2.0,
                    screen.y as f64 - size / 2.0,
                    size,
                    size,
                );
            }
        }

        Ok(())
    }
}

impl RenderSurface for CanvasSurface {
    fn set_points(&mut self, layer: Layer, points: &PointSet, style: &PointStyle) {
        self.layers.set_points(layer, points, style);
    }

    fn set_transform(&mut self, layer: Layer, transform: &Transform) {
        self.layers.set_transform(layer, transform);
    }
}

/// On-screen size of a point, shrinking with distance from the camera
///
/// `reference` is the distance at which a point is drawn at its style size.
pub fn point_size(style: &PointStyle, pixels_per_unit: f32, reference: f32, distance: f32) -> f64 {
    if distance <= 0.0 {
        return MIN_POINT_SIZE;
    }
    let size = style.scaled_size(pixels_per_unit) * reference / distance;
    (size as f64).max(MIN_POINT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use starfield_core::{StarField, StarFieldConfig};

    #[test]
    fn test_point_size_attenuates() {
        let near = point_size(&PointStyle::SKY, 1.0, 1000.0, 500.0);
        let far = point_size(&PointStyle::SKY, 1.0, 1000.0, 2000.0);
        assert!((near - 4.0).abs() < 1e-6);
        assert!((far - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_point_size_floor() {
        assert_eq!(point_size(&PointStyle::SKY, 0.01, 1000.0, 1000.0), MIN_POINT_SIZE);
        assert_eq!(point_size(&PointStyle::SKY, 1.0, 1000.0, 0.0), MIN_POINT_SIZE);
    }

    #[test]
    fn test_surface_receives_presented_layers() {
        let mut field = StarField::new(StarFieldConfig::new(64, 4).with_seed(2));
        let mut surface = CanvasSurface::new();
        field.present(&mut surface);

        assert_eq!(surface.point_count(Layer::Sky), 64);
        assert_eq!(surface.point_count(Layer::ShootingStars), 4);
    }
}
