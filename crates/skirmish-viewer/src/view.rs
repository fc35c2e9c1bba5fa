//! World-to-screen mapping. The origin sits at the window centre, y up.

use bevy::prelude::*;
use skirmish_core::prelude::Position;

const EXTENT_PADDING: f64 = 1.1;

pub const HEALTH_BAR_SIZE: Vec2 = Vec2::new(16.0, 2.0);

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ViewScale {
    pub pixels_per_unit: f32,
}

impl ViewScale {
    /// Fit every starting position inside a window whose half-size is
    /// `half_window` pixels.
    pub fn fit<'a>(positions: impl IntoIterator<Item = &'a Position>, half_window: f32) -> Self {
        let extent = positions
            .into_iter()
            .fold(0.0_f64, |acc, p| acc.max(p.x.abs()).max(p.y.abs()))
            * EXTENT_PADDING;
        let extent = if extent > 0.0 && extent.is_finite() { extent } else { 1.0 };
        Self {
            pixels_per_unit: half_window / extent as f32,
        }
    }

    pub fn to_screen(&self, position: Position) -> Vec2 {
        Vec2::new(position.x as f32, position.y as f32) * self.pixels_per_unit
    }
}

/// Size of the green part of a health bar, left-aligned over the grey one
pub fn health_fill_size(ratio: f64) -> Vec2 {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
    Vec2::new(HEALTH_BAR_SIZE.x * ratio as f32, HEALTH_BAR_SIZE.y)
}
