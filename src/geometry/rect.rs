// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::geometry::Axis;
use crate::units::Grid;

/// Axis-aligned rectangle in database units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl Rect {
    /// Creates a rectangle from two opposite corners in any order.
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Rect {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Creates a rectangle from its extent along `axis` and across it.
    pub fn from_spans(axis: Axis, along: (i64, i64), across: (i64, i64)) -> Self {
        match axis {
            Axis::X => Rect::new(along.0, across.0, along.1, across.1),
            Axis::Y => Rect::new(across.0, along.0, across.1, along.1),
        }
    }

    pub fn width(&self) -> i64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i64 {
        self.max_y - self.min_y
    }

    /// Returns `(min, max)` along `axis`.
    pub fn span(&self, axis: Axis) -> (i64, i64) {
        match axis {
            Axis::X => (self.min_x, self.max_x),
            Axis::Y => (self.min_y, self.max_y),
        }
    }

    pub fn extent(&self, axis: Axis) -> i64 {
        let (lo, hi) = self.span(axis);
        hi - lo
    }

    /// Twice the center coordinate along `axis`, kept exact on the grid.
    pub fn center2(&self, axis: Axis) -> i64 {
        let (lo, hi) = self.span(axis);
        lo + hi
    }

    /// Center point, rounded down to the grid.
    pub fn center(&self) -> (i64, i64) {
        (
            self.center2(Axis::X).div_euclid(2),
            self.center2(Axis::Y).div_euclid(2),
        )
    }

    /// Returns `true` if the two rectangles share a region of non-zero
    /// area. Rectangles that only abut do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    /// Returns `true` if `other` lies entirely within this rectangle,
    /// boundary included.
    pub fn covers(&self, other: &Rect) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Grows the rectangle by `amount` on both ends of `axis`.
    pub fn expand(&self, axis: Axis, amount: i64) -> Rect {
        match axis {
            Axis::X => Rect {
                min_x: self.min_x - amount,
                max_x: self.max_x + amount,
                ..*self
            },
            Axis::Y => Rect {
                min_y: self.min_y - amount,
                max_y: self.max_y + amount,
                ..*self
            },
        }
    }

    pub fn translate(&self, dx: i64, dy: i64) -> Rect {
        Rect {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Corners as `[left, bottom, right, top]` in microns.
    pub fn to_microns(&self, grid: &Grid) -> [f64; 4] {
        [
            grid.to_microns(self.min_x),
            grid.to_microns(self.min_y),
            grid.to_microns(self.max_x),
            grid.to_microns(self.max_y),
        ]
    }

    pub(crate) fn to_geo_polygon_f64(self) -> geo::Polygon<f64> {
        geo::Rect::new(
            (self.min_x as f64, self.min_y as f64),
            (self.max_x as f64, self.max_y as f64),
        )
        .to_polygon()
    }
}
