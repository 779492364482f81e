/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

/// A point projected onto the screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
    /// Normalized depth in [-1, 1], nearest first
    pub depth: f32,
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Backdrop camera: 1000 units out on z, 75 degree vertical fov
    ///
    /// The far plane reaches past the back of the sky cube.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 1000.0),
            target: Point3::new(0.0, 0.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: 75f32.to_radians(),
            aspect: aspect_of(width, height),
            near: 0.1,
            far: 3000.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_of(width, height);
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the perspective projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Combined projection and view, for projecting many points with one model
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Screen pixels per world unit at the camera target's depth
    pub fn pixels_per_unit(&self, height: u32) -> f32 {
        let visible = 2.0 * (self.position - self.target).norm() * (self.fov / 2.0).tan();
        if visible > 0.0 {
            height as f32 / visible
        } else {
            0.0
        }
    }

    /// Project a 3D point to 2D screen space
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<ScreenPoint> {
        project_with(&(self.view_projection() * model_matrix), point, width, height)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

/// Project `point` through a precomputed model-view-projection matrix
///
/// Points behind the camera or outside the view volume give `None`.
pub fn project_with(
    mvp: &Matrix4<f32>,
    point: &Point3<f32>,
    width: u32,
    height: u32,
) -> Option<ScreenPoint> {
    let clip = mvp * point.to_homogeneous();

    if clip.w <= 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let depth = clip.z / clip.w;

    // Clip test
    if !(-1.0..=1.0).contains(&ndc_x)
        || !(-1.0..=1.0).contains(&ndc_y)
        || !(-1.0..=1.0).contains(&depth)
    {
        return None;
    }

    // Convert to screen space
    Some(ScreenPoint {
        x: (ndc_x + 1.0) * 0.5 * width as f32,
        y: (1.0 - ndc_y) * 0.5 * height as f32,
        depth,
    })
}

fn aspect_of(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new(800, 600);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert!((camera.fov - 75f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_view_matrix() {
        let camera = Camera::new(800, 600);
        let view = camera.view_matrix();
        // View matrix should be non-zero
        assert!(view.norm() > 0.0);
    }

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::new(800, 600);
        let screen = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 800, 600)
            .unwrap();
        assert!((screen.x - 400.0).abs() < 1e-3);
        assert!((screen.y - 300.0).abs() < 1e-3);
        assert!(screen.depth > -1.0 && screen.depth < 1.0);
    }

    #[test]
    fn test_up_is_up_on_screen() {
        let camera = Camera::new(800, 600);
        let screen = camera
            .project_to_screen(&Point3::new(0.0, 100.0, 0.0), &Matrix4::identity(), 800, 600)
            .unwrap();
        assert!(screen.y < 300.0);
    }

    #[test]
    fn test_culls_behind_and_beyond() {
        let camera = Camera::new(800, 600);
        let model = Matrix4::identity();
        // Behind the camera
        assert!(camera
            .project_to_screen(&Point3::new(0.0, 0.0, 1500.0), &model, 800, 600)
            .is_none());
        // Past the far plane
        assert!(camera
            .project_to_screen(&Point3::new(0.0, 0.0, -2500.0), &model, 800, 600)
            .is_none());
    }

    #[test]
    fn test_pixels_per_unit_matches_projection() {
        let camera = Camera::new(800, 600);
        let per_unit = camera.pixels_per_unit(600);
        let screen = camera
            .project_to_screen(&Point3::new(0.0, 10.0, 0.0), &Matrix4::identity(), 800, 600)
            .unwrap();
        assert!(((300.0 - screen.y) - 10.0 * per_unit).abs() < 1e-2);
    }
}
