/// Rotation and position of a rendered point layer
use nalgebra::{Matrix4, Vector3};

/// Rotation state around three axes (in radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Rotation matrix with Euler order XYZ
    pub fn matrix(&self) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(self.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, self.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, self.z));

        rx * ry * rz
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Per-layer transform handed to a render surface each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotation: RotationState,
    pub position: Vector3<f32>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            rotation: RotationState::zero(),
            position: Vector3::zeros(),
        }
    }

    /// Model matrix: rotate about the layer origin, then translate
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position) * self.rotation.matrix()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
