// SPDX-License-Identifier: Apache-2.0

//! Partially specified configuration layers, as read from TOML or JSON.
//! Every field is optional so that layers can be stacked; a later layer
//! wins field by field.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::config::{PgPlacement, PinSpacing, Strictness};
use crate::error::{Error, Result};
use crate::geometry::RoutingDirection;

/// One layer of placement configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpecLayer {
    pub origin: Option<[f64; 2]>,
    pub units: Option<f64>,
    pub precision: Option<f64>,
    pub pin_margin: Option<bool>,
    pub aspect_ratio: Option<[f64; 2]>,
    #[serde(alias = "xwidth")]
    pub x_width: Option<f64>,
    #[serde(alias = "ywidth")]
    pub y_width: Option<f64>,
    pub x_strictness: Option<Strictness>,
    pub y_strictness: Option<Strictness>,
    pub input_side: Option<String>,
    pub output_side: Option<String>,
    pub inout_side: Option<String>,
    pub port_sides: Option<PortSidesLayer>,
    pub pin_spacing: Option<PinSpacing>,
    pub pins: Option<PinsLayer>,
    pub pg_pins: Option<PgPinsLayer>,
    pub exclude_layers: Option<Vec<String>>,
    pub symmetry: Option<String>,
    pub site: Option<String>,
    pub max_attempts: Option<usize>,
    pub auto_resize: Option<bool>,
}

/// Default side per port direction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PortSidesLayer {
    pub input: Option<String>,
    pub output: Option<String>,
    pub inout: Option<String>,
}

/// The `pins` table: default layers and pin length, plus per-pin tables
/// keyed by pin name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PinsLayer {
    pub h_layer: Option<String>,
    pub v_layer: Option<String>,
    pub pin_length: Option<f64>,
    #[serde(flatten)]
    pub overrides: IndexMap<String, Value>,
}

/// Per-pin placement override.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PinOverrideLayer {
    pub side: Option<String>,
    pub layer: Option<String>,
    pub center: Option<f64>,
    #[serde(alias = "xwidth")]
    pub x_width: Option<f64>,
    #[serde(alias = "ywidth")]
    pub y_width: Option<f64>,
}

/// The `pg_pins` table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PgPinsLayer {
    pub pg_pin_placement: Option<PgPlacement>,
    pub interlace_interval: Option<usize>,
    #[serde(alias = "interlace_orientation")]
    pub strap_orientation: Option<RoutingDirection>,
    pub strap_width: Option<f64>,
    pub strap_spacing: Option<f64>,
    pub h_layer: Option<String>,
    pub v_layer: Option<String>,
    pub pwr_pin: Option<PinOverrideLayer>,
    pub gnd_pin: Option<PinOverrideLayer>,
}

fn merge_nested<T>(base: Option<T>, over: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (base, over) {
        (Some(base), Some(over)) => Some(merge(base, over)),
        (base, over) => over.or(base),
    }
}

/// Merges two JSON values; objects merge key by key, anything else is
/// replaced by `over`.
fn merge_values(base: Value, over: Value) -> Value {
    match (base, over) {
        (Value::Object(mut base), Value::Object(over)) => {
            for (key, value) in over {
                let merged = match base.remove(&key) {
                    Some(old) => merge_values(old, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, over) => over,
    }
}

impl SpecLayer {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::parse("placement spec (TOML)", e))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::parse("placement spec (JSON)", e))
    }

    /// Overlays `over` on top of `self`.
    pub fn merge(self, over: SpecLayer) -> SpecLayer {
        SpecLayer {
            origin: over.origin.or(self.origin),
            units: over.units.or(self.units),
            precision: over.precision.or(self.precision),
            pin_margin: over.pin_margin.or(self.pin_margin),
            aspect_ratio: over.aspect_ratio.or(self.aspect_ratio),
            x_width: over.x_width.or(self.x_width),
            y_width: over.y_width.or(self.y_width),
            x_strictness: over.x_strictness.or(self.x_strictness),
            y_strictness: over.y_strictness.or(self.y_strictness),
            input_side: over.input_side.or(self.input_side),
            output_side: over.output_side.or(self.output_side),
            inout_side: over.inout_side.or(self.inout_side),
            port_sides: merge_nested(self.port_sides, over.port_sides, PortSidesLayer::merge),
            pin_spacing: over.pin_spacing.or(self.pin_spacing),
            pins: merge_nested(self.pins, over.pins, PinsLayer::merge),
            pg_pins: merge_nested(self.pg_pins, over.pg_pins, PgPinsLayer::merge),
            exclude_layers: over.exclude_layers.or(self.exclude_layers),
            symmetry: over.symmetry.or(self.symmetry),
            site: over.site.or(self.site),
            max_attempts: over.max_attempts.or(self.max_attempts),
            auto_resize: over.auto_resize.or(self.auto_resize),
        }
    }
}

impl PortSidesLayer {
    fn merge(self, over: PortSidesLayer) -> PortSidesLayer {
        PortSidesLayer {
            input: over.input.or(self.input),
            output: over.output.or(self.output),
            inout: over.inout.or(self.inout),
        }
    }
}

impl PinsLayer {
    fn merge(mut self, over: PinsLayer) -> PinsLayer {
        for (name, value) in over.overrides {
            let merged = match self.overrides.shift_remove(&name) {
                Some(old) => merge_values(old, value),
                None => value,
            };
            self.overrides.insert(name, merged);
        }
        PinsLayer {
            h_layer: over.h_layer.or(self.h_layer),
            v_layer: over.v_layer.or(self.v_layer),
            pin_length: over.pin_length.or(self.pin_length),
            overrides: self.overrides,
        }
    }

    /// Per-pin tables of this layer. Entries that are not tables are not
    /// pin overrides and are skipped.
    pub fn pin_overrides(&self) -> Result<IndexMap<String, PinOverrideLayer>> {
        let mut overrides = IndexMap::new();
        for (name, value) in &self.overrides {
            if !value.is_object() {
                continue;
            }
            let entry: PinOverrideLayer = serde_json::from_value(value.clone())
                .map_err(|e| Error::invalid(format!("pins.{name}"), e))?;
            overrides.insert(name.clone(), entry);
        }
        Ok(overrides)
    }
}

impl PinOverrideLayer {
    fn merge(self, over: PinOverrideLayer) -> PinOverrideLayer {
        PinOverrideLayer {
            side: over.side.or(self.side),
            layer: over.layer.or(self.layer),
            center: over.center.or(self.center),
            x_width: over.x_width.or(self.x_width),
            y_width: over.y_width.or(self.y_width),
        }
    }
}

impl PgPinsLayer {
    fn merge(self, over: PgPinsLayer) -> PgPinsLayer {
        PgPinsLayer {
            pg_pin_placement: over.pg_pin_placement.or(self.pg_pin_placement),
            interlace_interval: over.interlace_interval.or(self.interlace_interval),
            strap_orientation: over.strap_orientation.or(self.strap_orientation),
            strap_width: over.strap_width.or(self.strap_width),
            strap_spacing: over.strap_spacing.or(self.strap_spacing),
            h_layer: over.h_layer.or(self.h_layer),
            v_layer: over.v_layer.or(self.v_layer),
            pwr_pin: merge_nested(self.pwr_pin, over.pwr_pin, PinOverrideLayer::merge),
            gnd_pin: merge_nested(self.gnd_pin, over.gnd_pin, PinOverrideLayer::merge),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_pin_tables_and_unknown_keys() {
        let layer = SpecLayer::from_toml_str(
            r#"
            x_width = 10
            future_option = "ignored"

            [pins]
            h_layer = "M4"
            comment = "not a pin"

            [pins.clk]
            side = "bottom"
            center = 2.5
            "#,
        )
        .unwrap();
        assert_eq!(layer.x_width, Some(10.0));
        let pins = layer.pins.unwrap();
        assert_eq!(pins.h_layer.as_deref(), Some("M4"));
        let overrides = pins.pin_overrides().unwrap();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides["clk"].side.as_deref(), Some("bottom"));
        assert_eq!(overrides["clk"].center, Some(2.5));
    }

    #[test]
    fn later_layer_wins_field_by_field() {
        let base = SpecLayer::from_json_str(
            r#"{"y_width": 5.0, "pins": {"pin_length": 2.0, "a": {"side": "top", "center": 1.0}},
                "pg_pins": {"pwr_pin": {"side": "left", "layer": "M2"}}}"#,
        )
        .unwrap();
        let over = SpecLayer::from_json_str(
            r#"{"y_width": 7.0, "pins": {"a": {"center": 3.0}},
                "pg_pins": {"pwr_pin": {"side": "right"}}}"#,
        )
        .unwrap();
        let merged = base.merge(over);
        assert_eq!(merged.y_width, Some(7.0));
        let pins = merged.pins.unwrap();
        assert_eq!(pins.pin_length, Some(2.0));
        let a = &pins.pin_overrides().unwrap()["a"];
        assert_eq!(a.side.as_deref(), Some("top"));
        assert_eq!(a.center, Some(3.0));
        let pwr = merged.pg_pins.unwrap().pwr_pin.unwrap();
        assert_eq!(pwr.side.as_deref(), Some("right"));
        assert_eq!(pwr.layer.as_deref(), Some("M2"));
    }

    #[test]
    fn malformed_pin_table_names_the_pin() {
        let layer =
            SpecLayer::from_json_str(r#"{"pins": {"clk": {"center": "middle"}}}"#).unwrap();
        let err = layer.pins.unwrap().pin_overrides().unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ref key, .. } if key == "pins.clk"));
    }
}
