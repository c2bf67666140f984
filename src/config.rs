// SPDX-License-Identifier: Apache-2.0

//! Resolved placement configuration.

mod builder;
mod raw;

pub use builder::PlacementSpecBuilder;
pub use raw::{PgPinsLayer, PinOverrideLayer, PinsLayer, PortSidesLayer, SpecLayer};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::{Axis, RoutingDirection, Side};
use crate::ports::PortDirection;
use crate::units::Grid;

/// Whether an explicitly given dimension may grow to fit its pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    #[default]
    Flexible,
    Strict,
}

/// Strategy used to place pins that have no explicit location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinSpacing {
    #[default]
    MinPitch,
    Distributed,
}

/// How power and ground terminals are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PgPlacement {
    #[default]
    SmallPins,
    Straps,
    Interlaced,
}

/// Target ratio between the internal box width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectRatio {
    pub x: f64,
    pub y: f64,
}

impl AspectRatio {
    /// Factor converting a length along `from` into the matching length
    /// along the other axis.
    pub fn factor(&self, from: Axis) -> f64 {
        match from {
            Axis::Y => self.x / self.y,
            Axis::X => self.y / self.x,
        }
    }
}

/// Per-pin placement override, with the side already resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinOverride {
    pub side: Option<Side>,
    pub layer: Option<String>,
    pub center: Option<f64>,
    pub x_width: Option<f64>,
    pub y_width: Option<f64>,
}

/// Default side for each port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSides {
    pub input: Side,
    pub output: Side,
    pub inout: Side,
}

impl PortSides {
    pub fn side_for(&self, direction: PortDirection) -> Side {
        match direction {
            PortDirection::Input => self.input,
            PortDirection::Output => self.output,
            PortDirection::Inout => self.inout,
        }
    }
}

impl Default for PortSides {
    fn default() -> Self {
        PortSides {
            input: Side::Left,
            output: Side::Right,
            inout: Side::Right,
        }
    }
}

/// Power and ground configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PgSpec {
    pub placement: PgPlacement,
    pub interlace_interval: usize,
    pub strap_orientation: RoutingDirection,
    pub strap_width: Option<f64>,
    pub strap_spacing: Option<f64>,
    pub h_layer: String,
    pub v_layer: String,
    pub pwr: PinOverride,
    pub gnd: PinOverride,
}

impl PgSpec {
    /// Layer carrying straps of the configured orientation.
    pub fn strap_layer(&self) -> &str {
        match self.strap_orientation {
            RoutingDirection::Horizontal => &self.h_layer,
            RoutingDirection::Vertical => &self.v_layer,
        }
    }
}

impl Default for PgSpec {
    fn default() -> Self {
        let top = PinOverride {
            side: Some(Side::Top),
            ..PinOverride::default()
        };
        PgSpec {
            placement: PgPlacement::SmallPins,
            interlace_interval: 4,
            strap_orientation: RoutingDirection::Horizontal,
            strap_width: None,
            strap_spacing: None,
            h_layer: "M2".to_string(),
            v_layer: "M3".to_string(),
            pwr: top.clone(),
            gnd: top,
        }
    }
}

/// Immutable placement configuration. Built with [`PlacementSpecBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementSpec {
    pub grid: Grid,
    pub origin: (f64, f64),
    pub pin_margin: bool,
    pub aspect_ratio: Option<AspectRatio>,
    pub x_width: Option<f64>,
    pub y_width: Option<f64>,
    pub x_strictness: Strictness,
    pub y_strictness: Strictness,
    pub port_sides: PortSides,
    pub pin_spacing: PinSpacing,
    pub h_layer: String,
    pub v_layer: String,
    pub pin_length: f64,
    pub overrides: IndexMap<String, PinOverride>,
    pub pg: PgSpec,
    pub exclude_layers: Vec<String>,
    pub symmetry: String,
    pub site: String,
    pub max_attempts: usize,
    pub auto_resize: bool,
}

impl Default for PlacementSpec {
    fn default() -> Self {
        PlacementSpec {
            grid: Grid::default(),
            origin: (0.0, 0.0),
            pin_margin: false,
            aspect_ratio: None,
            x_width: None,
            y_width: None,
            x_strictness: Strictness::Flexible,
            y_strictness: Strictness::Flexible,
            port_sides: PortSides::default(),
            pin_spacing: PinSpacing::MinPitch,
            h_layer: "M2".to_string(),
            v_layer: "M3".to_string(),
            pin_length: 1.0,
            overrides: IndexMap::new(),
            pg: PgSpec::default(),
            exclude_layers: Vec::new(),
            symmetry: "X Y".to_string(),
            site: "core".to_string(),
            max_attempts: 8,
            auto_resize: true,
        }
    }
}

impl PlacementSpec {
    pub fn builder() -> PlacementSpecBuilder {
        PlacementSpecBuilder::new()
    }

    pub fn strictness(&self, axis: Axis) -> Strictness {
        match axis {
            Axis::X => self.x_strictness,
            Axis::Y => self.y_strictness,
        }
    }

    /// Explicit internal box dimension along `axis`, in microns.
    pub fn explicit_width(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::X => self.x_width,
            Axis::Y => self.y_width,
        }
    }

    /// Default layer for pins on `side`.
    pub fn default_layer(&self, side: Side) -> &str {
        match side.routing_direction() {
            RoutingDirection::Horizontal => &self.h_layer,
            RoutingDirection::Vertical => &self.v_layer,
        }
    }

    /// Override for a pin, looked up by its full name first and then by
    /// the name of the bus it belongs to.
    pub fn pin_override(&self, name: &str, base_name: &str) -> Option<&PinOverride> {
        self.overrides
            .get(name)
            .or_else(|| self.overrides.get(base_name))
    }
}
