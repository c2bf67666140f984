// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Error;

pub const LEFT_SIDE_INDEX: usize = 0;
pub const TOP_SIDE_INDEX: usize = 1;
pub const RIGHT_SIDE_INDEX: usize = 2;
pub const BOTTOM_SIDE_INDEX: usize = 3;

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Preferred routing direction of a metal layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingDirection {
    Horizontal,
    Vertical,
}

impl RoutingDirection {
    /// Axis along which wires on this layer run.
    pub fn axis(self) -> Axis {
        match self {
            RoutingDirection::Horizontal => Axis::X,
            RoutingDirection::Vertical => Axis::Y,
        }
    }

    /// Axis across which consecutive wires on this layer are stacked.
    pub fn stacking_axis(self) -> Axis {
        self.axis().other()
    }
}

impl FromStr for RoutingDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Ok(RoutingDirection::Horizontal),
            "vertical" | "v" => Ok(RoutingDirection::Vertical),
            other => Err(format!(
                "'{other}' is not a routing direction (expected horizontal or vertical)"
            )),
        }
    }
}

/// One of the four sides of a rectangular macro boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Top,
    Right,
    Bottom,
}

impl Side {
    /// All sides, in clockwise order starting from the left side.
    pub const ALL: [Side; 4] = [Side::Left, Side::Top, Side::Right, Side::Bottom];

    pub fn index(self) -> usize {
        match self {
            Side::Left => LEFT_SIDE_INDEX,
            Side::Top => TOP_SIDE_INDEX,
            Side::Right => RIGHT_SIDE_INDEX,
            Side::Bottom => BOTTOM_SIDE_INDEX,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }

    /// Axis along which pins on this side are lined up.
    pub fn free_axis(self) -> Axis {
        match self {
            Side::Left | Side::Right => Axis::Y,
            Side::Top | Side::Bottom => Axis::X,
        }
    }

    /// Routing direction of wires that leave the macro through this side.
    pub fn routing_direction(self) -> RoutingDirection {
        match self {
            Side::Left | Side::Right => RoutingDirection::Horizontal,
            Side::Top | Side::Bottom => RoutingDirection::Vertical,
        }
    }

    /// Returns `true` for the sides whose outline edge sits at coordinate 0.
    pub fn is_low(self) -> bool {
        matches!(self, Side::Left | Side::Bottom)
    }

    /// Parses a side name, reporting `key` as the offending configuration key.
    pub fn parse(name: &str, key: impl AsRef<str>) -> Result<Side, Error> {
        match name.to_ascii_lowercase().as_str() {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            "top" => Ok(Side::Top),
            "bottom" => Ok(Side::Bottom),
            _ => Err(Error::UnknownSide {
                key: key.as_ref().to_string(),
                side: name.to_string(),
            }),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-size map with one entry per [`Side`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SideMap<T>([T; 4]);

impl<T> SideMap<T> {
    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        SideMap(Side::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::ALL.into_iter().zip(self.0.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Side, &mut T)> {
        Side::ALL.into_iter().zip(self.0.iter_mut())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(Side, &T) -> U) -> SideMap<U> {
        SideMap::from_fn(|side| f(side, &self[side]))
    }
}

impl<T> Index<Side> for SideMap<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        &self.0[side.index()]
    }
}

impl<T> IndexMut<Side> for SideMap<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        &mut self.0[side.index()]
    }
}

impl<T: Serialize> Serialize for SideMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        for (side, value) in self.iter() {
            map.serialize_entry(side.name(), value)?;
        }
        map.end()
    }
}
