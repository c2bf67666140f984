// SPDX-License-Identifier: Apache-2.0

//! Conversion of logical ports into typed placement records.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{PgPlacement, PinOverride, PlacementSpec};
use crate::error::{Error, Result};
use crate::geometry::{Axis, Rect, RoutingDirection, Side};
use crate::ports::{PortDirection, PortList};
use crate::tech::{LayerRule, LayerRules};

/// Electrical use of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinUse {
    Signal,
    Power,
    Ground,
}

impl PinUse {
    pub fn as_lef_str(&self) -> &'static str {
        match self {
            PinUse::Signal => "SIGNAL",
            PinUse::Power => "POWER",
            PinUse::Ground => "GROUND",
        }
    }
}

/// Placement record for one pin or strap. Lengths are in database units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pin {
    pub name: String,
    /// Position in the catalog; used to keep output order stable.
    pub index: usize,
    pub direction: PortDirection,
    pub pin_use: PinUse,
    pub side: Side,
    pub layer: String,
    pub x_width: i64,
    pub y_width: i64,
    pub pitch: i64,
    /// Pinned center along the side's free axis.
    pub center: Option<i64>,
    pub rects: Vec<Rect>,
}

impl Pin {
    /// Footprint along the side the pin sits on.
    pub fn along(&self) -> i64 {
        match self.side.free_axis() {
            Axis::X => self.x_width,
            Axis::Y => self.y_width,
        }
    }

    /// Footprint perpendicular to the side, i.e. the pin length.
    pub fn across(&self) -> i64 {
        match self.side.free_axis() {
            Axis::X => self.y_width,
            Axis::Y => self.x_width,
        }
    }

    pub fn add_rect(&mut self, rect: Rect) {
        self.rects.push(rect);
    }

    pub fn is_placed(&self) -> bool {
        !self.rects.is_empty()
    }

    /// Label position: the center of the first rectangle.
    pub fn label(&self) -> Option<(i64, i64)> {
        self.rects.first().map(|r| r.center())
    }
}

/// All placement records derived from one port list.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub name: String,
    /// Signal pins, followed by power/ground pins when those are drawn as
    /// ordinary pins.
    pub pins: Vec<Pin>,
    /// Power and ground strap templates; empty unless straps are drawn.
    pub straps: Vec<Pin>,
    pub n_inputs: usize,
    pub n_outputs: usize,
}

struct Footprint<'a> {
    layer: &'a LayerRule,
    x_width: i64,
    y_width: i64,
}

impl Catalog {
    pub fn build(ports: &PortList, spec: &PlacementSpec, rules: &LayerRules) -> Result<Catalog> {
        let mut pins: IndexMap<String, Pin> = IndexMap::new();
        // Configuration key behind each pinned center.
        let mut center_keys: IndexMap<String, String> = IndexMap::new();
        let mut n_inputs = 0;
        let mut n_outputs = 0;

        for port in &ports.ports {
            for bit_name in port.bit_names() {
                let pin_override = spec.pin_override(&bit_name, &port.name);
                let side = pin_override
                    .and_then(|o| o.side)
                    .unwrap_or_else(|| spec.port_sides.side_for(port.direction));
                let layer_key = match pin_override.and_then(|o| o.layer.as_ref()) {
                    Some(_) if spec.overrides.contains_key(&bit_name) => {
                        format!("pins.{bit_name}.layer")
                    }
                    Some(_) => format!("pins.{}.layer", port.name),
                    None => default_layer_key("pins", side),
                };
                let layer_name = pin_override
                    .and_then(|o| o.layer.as_deref())
                    .unwrap_or_else(|| spec.default_layer(side));
                let footprint = footprint(spec, rules, side, layer_name, &layer_key, pin_override)?;
                let center = pin_override
                    .and_then(|o| o.center)
                    .map(|c| spec.grid.to_dbu(c));

                match port.direction {
                    PortDirection::Input => n_inputs += 1,
                    PortDirection::Output => n_outputs += 1,
                    PortDirection::Inout => {}
                }
                if center.is_some() {
                    let key = if spec.overrides.contains_key(&bit_name) {
                        &bit_name
                    } else {
                        &port.name
                    };
                    center_keys.insert(bit_name.clone(), format!("pins.{key}.center"));
                }
                insert_unique(
                    &mut pins,
                    Pin {
                        name: bit_name,
                        index: 0,
                        direction: port.direction,
                        pin_use: PinUse::Signal,
                        side,
                        layer: footprint.layer.name.clone(),
                        x_width: footprint.x_width,
                        y_width: footprint.y_width,
                        pitch: footprint.layer.pitch,
                        center,
                        rects: Vec::new(),
                    },
                )?;
            }
        }

        let pg_terminals = [
            (
                &ports.power_nets.power,
                PinUse::Power,
                &spec.pg.pwr,
                "pg_pins.pwr_pin",
            ),
            (
                &ports.power_nets.ground,
                PinUse::Ground,
                &spec.pg.gnd,
                "pg_pins.gnd_pin",
            ),
        ];

        let mut straps = Vec::new();
        match spec.pg.placement {
            PgPlacement::SmallPins => {
                for (name, pin_use, terminal, key) in pg_terminals {
                    let side = terminal.side.unwrap_or(Side::Top);
                    let layer_key = match &terminal.layer {
                        Some(_) => format!("{key}.layer"),
                        None => default_layer_key("pg_pins", side),
                    };
                    let layer_name = terminal.layer.as_deref().unwrap_or(
                        match side.routing_direction() {
                            RoutingDirection::Horizontal => spec.pg.h_layer.as_str(),
                            RoutingDirection::Vertical => spec.pg.v_layer.as_str(),
                        },
                    );
                    let footprint =
                        footprint(spec, rules, side, layer_name, &layer_key, Some(terminal))?;
                    if terminal.center.is_some() {
                        center_keys.insert(name.clone(), format!("{key}.center"));
                    }
                    insert_unique(
                        &mut pins,
                        Pin {
                            name: name.clone(),
                            index: 0,
                            direction: PortDirection::Inout,
                            pin_use,
                            side,
                            layer: footprint.layer.name.clone(),
                            x_width: footprint.x_width,
                            y_width: footprint.y_width,
                            pitch: footprint.layer.pitch,
                            center: terminal.center.map(|c| spec.grid.to_dbu(c)),
                            rects: Vec::new(),
                        },
                    )?;
                }
            }
            PgPlacement::Straps | PgPlacement::Interlaced => {
                let orientation = spec.pg.strap_orientation;
                let layer_key = match orientation {
                    RoutingDirection::Horizontal => "pg_pins.h_layer",
                    RoutingDirection::Vertical => "pg_pins.v_layer",
                };
                let rule = rules.get(spec.pg.strap_layer(), layer_key)?;
                let width = spec
                    .pg
                    .strap_width
                    .map(|w| spec.grid.to_dbu(w))
                    .unwrap_or(rule.min_width);
                if let Some(spacing) = spec.pg.strap_spacing {
                    if spec.grid.to_dbu(spacing) < rule.pitch {
                        return Err(Error::invalid(
                            "pg_pins.strap_spacing",
                            format!(
                                "{spacing} um is below the {} um pitch of {}",
                                spec.grid.to_microns(rule.pitch),
                                rule.name
                            ),
                        ));
                    }
                }
                // Straps run along their routing direction and are listed on
                // the low side they cross.
                let side = match orientation {
                    RoutingDirection::Horizontal => Side::Left,
                    RoutingDirection::Vertical => Side::Bottom,
                };
                for (name, pin_use, terminal, _) in pg_terminals {
                    if pins.contains_key(name.as_str()) {
                        return Err(Error::DuplicatePin(name.clone()));
                    }
                    let (x_width, y_width) = match side.free_axis() {
                        Axis::X => (width, 0),
                        Axis::Y => (0, width),
                    };
                    straps.push(Pin {
                        name: name.clone(),
                        index: 0,
                        direction: PortDirection::Inout,
                        pin_use,
                        side,
                        layer: rule.name.clone(),
                        x_width,
                        y_width,
                        pitch: rule.pitch,
                        center: terminal.center.map(|c| spec.grid.to_dbu(c)),
                        rects: Vec::new(),
                    });
                }
                if straps[0].name == straps[1].name {
                    return Err(Error::DuplicatePin(straps[0].name.clone()));
                }
            }
        }

        let mut pins: Vec<Pin> = pins.into_values().collect();
        for (index, pin) in pins.iter_mut().chain(straps.iter_mut()).enumerate() {
            pin.index = index;
        }
        check_pinned(&pins, &center_keys, spec)?;
        debug!(
            "Catalog for {}: {} pin(s), {} strap net(s), {} input(s), {} output(s)",
            ports.name,
            pins.len(),
            straps.len(),
            n_inputs,
            n_outputs
        );
        Ok(Catalog {
            name: ports.name.clone(),
            pins,
            straps,
            n_inputs,
            n_outputs,
        })
    }
}

fn default_layer_key(table: &str, side: Side) -> String {
    match side.routing_direction() {
        RoutingDirection::Horizontal => format!("{table}.h_layer"),
        RoutingDirection::Vertical => format!("{table}.v_layer"),
    }
}

/// Resolves the layer and footprint of a pin. Along the side the default
/// width is the layer minimum width; across it the default is the pin
/// length.
fn footprint<'a>(
    spec: &PlacementSpec,
    rules: &'a LayerRules,
    side: Side,
    layer: &str,
    layer_key: &str,
    pin_override: Option<&PinOverride>,
) -> Result<Footprint<'a>> {
    let rule = rules.get(layer, layer_key)?;
    let pin_length = spec.grid.to_dbu(spec.pin_length);
    let (default_x, default_y) = match side.free_axis() {
        Axis::X => (rule.min_width, pin_length),
        Axis::Y => (pin_length, rule.min_width),
    };
    let x_width = pin_override
        .and_then(|o| o.x_width)
        .map(|w| spec.grid.to_dbu(w))
        .unwrap_or(default_x);
    let y_width = pin_override
        .and_then(|o| o.y_width)
        .map(|w| spec.grid.to_dbu(w))
        .unwrap_or(default_y);
    if x_width <= 0 || y_width <= 0 {
        return Err(Error::invalid(
            layer_key,
            "pin footprint rounds to zero on the manufacturing grid",
        ));
    }
    Ok(Footprint {
        layer: rule,
        x_width,
        y_width,
    })
}

/// Rejects pinned pins whose footprint starts below coordinate 0, or that
/// come within a pitch of another pinned pin on the same side and layer.
fn check_pinned(
    pins: &[Pin],
    center_keys: &IndexMap<String, String>,
    spec: &PlacementSpec,
) -> Result<()> {
    let key_of = |pin: &Pin| {
        center_keys
            .get(&pin.name)
            .cloned()
            .unwrap_or_else(|| format!("pins.{}.center", pin.name))
    };
    let pinned: Vec<(&Pin, i64, i64)> = pins
        .iter()
        .filter_map(|p| {
            let lo = p.center? - p.along().div_euclid(2);
            Some((p, lo, lo + p.along()))
        })
        .collect();

    for &(pin, lo, _) in &pinned {
        if lo < 0 {
            return Err(Error::invalid(
                key_of(pin),
                format!(
                    "{} would start at {} um, before the start of the {} side",
                    pin.name,
                    spec.grid.to_microns(lo),
                    pin.side
                ),
            ));
        }
    }

    for (i, &(first, first_lo, first_hi)) in pinned.iter().enumerate() {
        for &(second, second_lo, second_hi) in &pinned[i + 1..] {
            if first.side != second.side || first.layer != second.layer {
                continue;
            }
            let keep = first.pitch.max(second.pitch);
            if second_lo < first_hi + keep && first_lo < second_hi + keep {
                return Err(Error::invalid(
                    key_of(second),
                    format!(
                        "{} is closer than the {} pitch to {}",
                        second.name, second.layer, first.name
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn insert_unique(pins: &mut IndexMap<String, Pin>, pin: Pin) -> Result<()> {
    if pins.contains_key(&pin.name) {
        return Err(Error::DuplicatePin(pin.name));
    }
    pins.insert(pin.name.clone(), pin);
    Ok(())
}
