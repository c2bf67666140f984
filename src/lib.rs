// SPDX-License-Identifier: Apache-2.0

//! Pin, strap and blockage geometry for black-boxed macros.
//!
//! A [`PortList`] and a layered [`PlacementSpec`] are turned into a
//! [`Catalog`] of pins, which [`PinPlacer`] sizes and places on the
//! boundary of the macro. The result is an [`AbstractView`] that
//! downstream writers can serialize.

pub mod catalog;
pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod place;
pub mod ports;
pub mod tech;
pub mod units;
pub mod validate;

pub use catalog::{Catalog, Pin, PinUse};
pub use config::{
    AspectRatio, PgPlacement, PinOverride, PinSpacing, PlacementSpec, PlacementSpecBuilder,
    Strictness,
};
pub use error::{Error, Result};
pub use geometry::{Axis, Interval, Rect, RoutingDirection, Side, SideMap, Transform};
pub use model::{AbstractView, Blockage, BoundaryBox, Label, PlacedPin};
pub use place::{PinPlacer, SpacingStrategy};
pub use ports::{BusRange, PortDirection, PortList, PortSpec, PowerNets};
pub use tech::{LayerRule, LayerRules, Technology};
pub use units::Grid;

/// Builds the pin catalog for `ports` and places it according to `spec`
/// using the layers of `tech`.
pub fn generate(tech: &Technology, ports: &PortList, spec: &PlacementSpec) -> Result<AbstractView> {
    let rules = tech.layer_rules(spec.grid);
    let catalog = Catalog::build(ports, spec, &rules)?;
    PinPlacer::new(&catalog, spec, &rules).run()
}
