// SPDX-License-Identifier: Apache-2.0

//! Integer geometry shared by the placement engine and the produced view.

mod interval;
mod rect;
mod side;
mod transform;

pub use interval::Interval;
pub use rect::Rect;
pub use side::{
    Axis, BOTTOM_SIDE_INDEX, LEFT_SIDE_INDEX, RIGHT_SIDE_INDEX, RoutingDirection, Side, SideMap,
    TOP_SIDE_INDEX,
};
pub use transform::Transform;
