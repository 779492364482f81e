/// The contract between a star field and whatever draws it
use nalgebra::Point3;

use crate::points::PointSet;
use crate::transform::Transform;

/// The two point layers of a star field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Sky,
    ShootingStars,
}

impl Layer {
    pub const ALL: [Layer; 2] = [Layer::Sky, Layer::ShootingStars];

    pub fn index(self) -> usize {
        match self {
            Layer::Sky => 0,
            Layer::ShootingStars => 1,
        }
    }
}

/// How a layer's points are drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointStyle {
    pub color: [u8; 3],
    /// Point size per unit of surface aspect
    pub size: f32,
}

impl PointStyle {
    pub const SKY: PointStyle = PointStyle {
        color: [0xff, 0xff, 0xff],
        size: 2.0,
    };

    pub const SHOOTING_STAR: PointStyle = PointStyle {
        color: [0x60, 0xa5, 0xfa],
        size: 4.0,
    };

    pub fn for_layer(layer: Layer) -> Self {
        match layer {
            Layer::Sky => Self::SKY,
            Layer::ShootingStars => Self::SHOOTING_STAR,
        }
    }

    /// CSS hex notation, e.g. `#60a5fa`
    pub fn hex(&self) -> String {
        let [r, g, b] = self.color;
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Size in surface pixels given the surface's pixels per world unit
    pub fn scaled_size(&self, aspect: f32) -> f32 {
        self.size * aspect
    }
}

/// Receives point positions and per-frame transforms
///
/// Positions arrive only when a layer has been regenerated. Transforms
/// arrive on every presented frame.
pub trait RenderSurface {
    fn set_points(&mut self, layer: Layer, points: &PointSet, style: &PointStyle);
    fn set_transform(&mut self, layer: Layer, transform: &Transform);
}

/// Latest points, style and transform handed over for one layer
#[derive(Debug, Clone)]
pub struct LayerSnapshot {
    pub points: Vec<Point3<f32>>,
    pub style: PointStyle,
    pub transform: Transform,
}

impl LayerSnapshot {
    fn new(layer: Layer) -> Self {
        Self {
            points: Vec::new(),
            style: PointStyle::for_layer(layer),
            transform: Transform::identity(),
        }
    }
}

/// A surface that only retains what it was last given, for renderers to draw from
#[derive(Debug, Clone)]
pub struct RetainedLayers {
    layers: [LayerSnapshot; 2],
}

impl RetainedLayers {
    pub fn new() -> Self {
        Self {
            layers: Layer::ALL.map(LayerSnapshot::new),
        }
    }

    pub fn get(&self, layer: Layer) -> &LayerSnapshot {
        &self.layers[layer.index()]
    }

    /// Layers in drawing order, sky first
    pub fn iter(&self) -> impl Iterator<Item = (Layer, &LayerSnapshot)> {
        Layer::ALL.into_iter().zip(self.layers.iter())
    }
}

impl Default for RetainedLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for RetainedLayers {
    fn set_points(&mut self, layer: Layer, points: &PointSet, style: &PointStyle) {
        let snapshot = &mut self.layers[layer.index()];
        snapshot.points.clear();
        snapshot.points.extend_from_slice(points.points());
        snapshot.style = *style;
    }

    fn set_transform(&mut self, layer: Layer, transform: &Transform) {
        self.layers[layer.index()].transform = *transform;
    }
}
