/// ASCII point renderer for terminal output
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use starfield_core::{
    points::SKY_HALF_EXTENT, projection::project_with, Camera, Layer, PointSet, PointStyle,
    RenderSurface, RetainedLayers, Transform,
};

/// Star glyphs from farthest to nearest
const STAR_RAMP: &[char] = &['.', '.', ':', '+', '*'];

const SHOOTING_STAR_GLYPH: char = '@';

/// Terminal cells are roughly twice as tall as they are wide
pub const CELL_ASPECT: f32 = 0.5;

/// A projected point waiting to be written into the cell buffers
struct Splat {
    x: usize,
    y: usize,
    distance: f32,
    glyph: char,
    color: Color,
}

/// ASCII renderer that plots star layers as terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    layers: RetainedLayers,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            layers: RetainedLayers::new(),
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.char_buffer = vec![' '; size];
        self.color_buffer = vec![Color::Reset; size];
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Character at a cell, for inspection
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        if x < self.width && y < self.height {
            Some(self.char_buffer[y * self.width + x])
        } else {
            None
        }
    }

    /// Number of cells holding a star
    pub fn lit_cells(&self) -> usize {
        self.char_buffer.iter().filter(|&&c| c != ' ').count()
    }

    /// Rows of the character buffer without colors
    pub fn lines(&self) -> Vec<String> {
        self.char_buffer
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }

    /// Project every layer through `camera` into the cell buffers
    pub fn render(&mut self, camera: &Camera) {
        self.clear();
        if self.width == 0 || self.height == 0 {
            return;
        }

        let view_projection = camera.view_projection();
        let width = self.width as u32;
        let height = self.height as u32;

        let mut splats = Vec::new();
        for (layer, snapshot) in self.layers.iter() {
            let model = snapshot.transform.model_matrix();
            let mvp = view_projection * model;

            for point in &snapshot.points {
                let Some(screen) = project_with(&mvp, point, width, height) else {
                    continue;
                };
                let distance = (camera.position - model.transform_point(point)).norm();
                let (glyph, color) = match layer {
                    Layer::Sky => star_glyph(distance),
                    Layer::ShootingStars => {
                        let [r, g, b] = snapshot.style.color;
                        (SHOOTING_STAR_GLYPH, Color::Rgb { r, g, b })
                    }
                };

                splats.push(Splat {
                    x: (screen.x as usize).min(self.width.saturating_sub(1)),
                    y: (screen.y as usize).min(self.height.saturating_sub(1)),
                    distance,
                    glyph,
                    color,
                });
            }
        }

        for splat in splats {
            let idx = splat.y * self.width + splat.x;
            if splat.distance < self.depth_buffer[idx] {
                self.depth_buffer[idx] = splat.distance;
                self.char_buffer[idx] = splat.glyph;
                self.color_buffer[idx] = splat.color;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderSurface for AsciiRenderer {
    fn set_points(&mut self, layer: Layer, points: &PointSet, style: &PointStyle) {
        self.layers.set_points(layer, points, style);
    }

    fn set_transform(&mut self, layer: Layer, transform: &Transform) {
        self.layers.set_transform(layer, transform);
    }
}

/// Nearer stars get heavier glyphs and brighter colors
fn star_glyph(distance: f32) -> (char, Color) {
    let nearness = 1.0 - (distance / (2.0 * SKY_HALF_EXTENT)).clamp(0.0, 1.0);
    let index = (nearness * (STAR_RAMP.len() - 1) as f32).round() as usize;
    let index = index.min(STAR_RAMP.len() - 1);

    let color = match index {
        0 | 1 => Color::DarkGrey,
        2 => Color::Grey,
        _ => Color::White,
    };
    (STAR_RAMP[index], color)
}
