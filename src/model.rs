// SPDX-License-Identifier: Apache-2.0

//! Format-agnostic abstract view handed to the LEF, GDS and Liberty writers.

use serde::Serialize;

use crate::catalog::{Pin, PinUse};
use crate::error::{Error, Result};
use crate::geometry::{Rect, Side, SideMap, Transform};
use crate::ports::PortDirection;
use crate::units::Grid;

/// Boxes describing the macro outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundaryBox {
    /// Region inside the pin band, where blockages are drawn.
    pub internal_box: Rect,
    /// Full outline, including the pins, with its lower-left corner at the
    /// coordinate origin.
    pub design_boundary: Rect,
    /// `design_boundary` shifted by the configured origin.
    pub bound_box: Rect,
}

impl BoundaryBox {
    fn transform(&self, t: &Transform) -> BoundaryBox {
        BoundaryBox {
            internal_box: t.apply_rect(&self.internal_box),
            design_boundary: t.apply_rect(&self.design_boundary),
            bound_box: t.apply_rect(&self.bound_box),
        }
    }
}

/// Text label of a pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub x: i64,
    pub y: i64,
    pub layer: String,
}

/// A placed pin or strap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedPin {
    pub name: String,
    pub direction: PortDirection,
    #[serde(rename = "use")]
    pub pin_use: PinUse,
    pub side: Side,
    pub layer: String,
    pub rects: Vec<Rect>,
    pub label: Option<Label>,
}

impl PlacedPin {
    pub(crate) fn from_pin(pin: &Pin) -> PlacedPin {
        PlacedPin {
            name: pin.name.clone(),
            direction: pin.direction,
            pin_use: pin.pin_use,
            side: pin.side,
            layer: pin.layer.clone(),
            rects: pin.rects.clone(),
            label: pin.label().map(|(x, y)| Label {
                x,
                y,
                layer: pin.layer.clone(),
            }),
        }
    }

    fn transform(&self, t: &Transform) -> PlacedPin {
        PlacedPin {
            rects: self.rects.iter().map(|r| t.apply_rect(r)).collect(),
            label: self.label.as_ref().map(|label| {
                let (x, y) = t.apply_point((label.x, label.y));
                Label {
                    x,
                    y,
                    layer: label.layer.clone(),
                }
            }),
            ..self.clone()
        }
    }
}

/// Obstruction drawn over the internal box on one layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Blockage {
    pub layer: String,
    pub rect: Rect,
}

/// Physical abstract of one black-boxed macro. Coordinates are in database
/// units of `grid`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbstractView {
    pub name: String,
    pub grid: Grid,
    pub symmetry: String,
    pub site: String,
    pub boundary: BoundaryBox,
    pub pins: Vec<PlacedPin>,
    pub straps: Vec<PlacedPin>,
    pub blockages: Vec<Blockage>,
    /// Names of the shapes owned by each side, in order along the side.
    pub sides: SideMap<Vec<String>>,
    pub n_inputs: usize,
    pub n_outputs: usize,
}

impl AbstractView {
    pub fn pin(&self, name: &str) -> Option<&PlacedPin> {
        self.pins
            .iter()
            .chain(self.straps.iter())
            .find(|p| p.name == name)
    }

    /// Outline size in microns.
    pub fn size_microns(&self) -> (f64, f64) {
        let outline = &self.boundary.design_boundary;
        (
            self.grid.to_microns(outline.width()),
            self.grid.to_microns(outline.height()),
        )
    }

    /// Returns a copy with every coordinate scaled by `factor` about the
    /// origin. Placement is not re-run.
    pub fn scaled(&self, factor: f64) -> Result<AbstractView> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(Error::invalid(
                "scale",
                format!("{factor} is not a positive factor"),
            ));
        }
        Ok(self.transformed(&Transform::scale(factor)))
    }

    pub fn transformed(&self, t: &Transform) -> AbstractView {
        AbstractView {
            boundary: self.boundary.transform(t),
            pins: self.pins.iter().map(|p| p.transform(t)).collect(),
            straps: self.straps.iter().map(|p| p.transform(t)).collect(),
            blockages: self
                .blockages
                .iter()
                .map(|b| Blockage {
                    layer: b.layer.clone(),
                    rect: t.apply_rect(&b.rect),
                })
                .collect(),
            ..self.clone()
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::parse("abstract view", e))
    }
}
