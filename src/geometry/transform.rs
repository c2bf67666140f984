// SPDX-License-Identifier: Apache-2.0

use nalgebra::{Matrix3, Vector3};

use crate::geometry::Rect;

/// Affine transform in homogeneous coordinates. Results are snapped back to
/// the integer grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform(Matrix3<f64>);

impl Transform {
    /// Uniform scaling about the origin.
    pub fn scale(factor: f64) -> Self {
        Transform(Matrix3::new(
            factor, 0.0, 0.0, //
            0.0, factor, 0.0, //
            0.0, 0.0, 1.0,
        ))
    }

    pub fn apply_point(&self, (x, y): (i64, i64)) -> (i64, i64) {
        let v = self.0 * Vector3::new(x as f64, y as f64, 1.0);
        (v.x.round() as i64, v.y.round() as i64)
    }

    pub fn apply_rect(&self, rect: &Rect) -> Rect {
        let (x0, y0) = self.apply_point((rect.min_x, rect.min_y));
        let (x1, y1) = self.apply_point((rect.max_x, rect.max_y));
        Rect::new(x0, y0, x1, y1)
    }
}
