// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;

use crate::config::{
    AspectRatio, PgSpec, PinOverride, PinOverrideLayer, PlacementSpec, PortSides, SpecLayer,
};
use crate::error::{Error, Result};
use crate::geometry::Side;
use crate::units::Grid;

/// Stacks configuration layers on top of the built-in defaults and
/// resolves them into a [`PlacementSpec`].
#[derive(Debug, Clone, Default)]
pub struct PlacementSpecBuilder {
    merged: SpecLayer,
}

impl PlacementSpecBuilder {
    pub fn new() -> Self {
        PlacementSpecBuilder::default()
    }

    pub fn layer(mut self, layer: SpecLayer) -> Self {
        self.merged = self.merged.merge(layer);
        self
    }

    pub fn toml_str(self, text: &str) -> Result<Self> {
        Ok(self.layer(SpecLayer::from_toml_str(text)?))
    }

    pub fn json_str(self, text: &str) -> Result<Self> {
        Ok(self.layer(SpecLayer::from_json_str(text)?))
    }

    /// Adds a layer read from a `.toml` or `.json` file.
    pub fn file(self, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        debug!("Adding placement spec layer {}", path.display());
        match extension.as_str() {
            "toml" => self.toml_str(&text),
            "json" => self.json_str(&text),
            _ => Err(Error::parse(
                format!("placement spec {}", path.display()),
                format!("unsupported file type '.{extension}' (expected .toml or .json)"),
            )),
        }
    }

    pub fn build(&self) -> Result<PlacementSpec> {
        let layer = &self.merged;
        let defaults = PlacementSpec::default();

        let grid = match (layer.units, layer.precision) {
            (None, None) => defaults.grid,
            (units, precision) => Grid::new(units.unwrap_or(1e-6), precision.unwrap_or(1e-9))?,
        };

        let aspect_ratio = match layer.aspect_ratio {
            Some([x, y]) => {
                if !(x > 0.0 && y > 0.0) {
                    return Err(Error::invalid(
                        "aspect_ratio",
                        format!("[{x}, {y}] must have positive components"),
                    ));
                }
                Some(AspectRatio { x, y })
            }
            None => None,
        };

        let x_width = positive_or_zero("x_width", layer.x_width)?;
        let y_width = positive_or_zero("y_width", layer.y_width)?;

        let port_sides = resolve_port_sides(layer, defaults.port_sides)?;

        let pins = layer.pins.clone().unwrap_or_default();
        let h_layer = pins.h_layer.clone().unwrap_or(defaults.h_layer);
        let v_layer = pins.v_layer.clone().unwrap_or(defaults.v_layer);
        let pin_length = pins.pin_length.unwrap_or(defaults.pin_length);
        if !(pin_length > 0.0) {
            return Err(Error::invalid(
                "pins.pin_length",
                format!("{pin_length} is not positive"),
            ));
        }
        let mut overrides = IndexMap::new();
        for (name, entry) in pins.pin_overrides()? {
            let resolved = resolve_override(&format!("pins.{name}"), &entry)?;
            overrides.insert(name, resolved);
        }

        let pg = resolve_pg(layer, &h_layer, &v_layer)?;

        let max_attempts = layer.max_attempts.unwrap_or(defaults.max_attempts);
        if max_attempts == 0 {
            return Err(Error::invalid("max_attempts", "must be at least 1"));
        }

        let spec = PlacementSpec {
            grid,
            origin: layer
                .origin
                .map(|[x, y]| (x, y))
                .unwrap_or(defaults.origin),
            pin_margin: layer.pin_margin.unwrap_or(defaults.pin_margin),
            aspect_ratio,
            x_width,
            y_width,
            x_strictness: layer.x_strictness.unwrap_or(defaults.x_strictness),
            y_strictness: layer.y_strictness.unwrap_or(defaults.y_strictness),
            port_sides,
            pin_spacing: layer.pin_spacing.unwrap_or(defaults.pin_spacing),
            h_layer,
            v_layer,
            pin_length,
            overrides,
            pg,
            exclude_layers: layer
                .exclude_layers
                .clone()
                .unwrap_or(defaults.exclude_layers),
            symmetry: layer.symmetry.clone().unwrap_or(defaults.symmetry),
            site: layer.site.clone().unwrap_or(defaults.site),
            max_attempts,
            auto_resize: layer.auto_resize.unwrap_or(defaults.auto_resize),
        };
        debug!(
            "Resolved placement spec: {} pin override(s), pg placement {:?}, spacing {:?}",
            spec.overrides.len(),
            spec.pg.placement,
            spec.pin_spacing
        );
        Ok(spec)
    }
}

fn positive_or_zero(key: &str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !(v.is_finite() && v >= 0.0) => {
            Err(Error::invalid(key, format!("{v} is not a non-negative length")))
        }
        other => Ok(other),
    }
}

fn positive(key: &str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => {
            Err(Error::invalid(key, format!("{v} is not a positive length")))
        }
        other => Ok(other),
    }
}

/// `<direction>_side` wins over `port_sides.<direction>`.
fn resolve_port_sides(layer: &SpecLayer, defaults: PortSides) -> Result<PortSides> {
    let table = layer.port_sides.clone().unwrap_or_default();
    let pick = |flat_key: &str,
                flat: &Option<String>,
                nested_key: &str,
                nested: &Option<String>,
                default: Side| {
        match (flat, nested) {
            (Some(name), _) => Side::parse(name, flat_key),
            (None, Some(name)) => Side::parse(name, nested_key),
            (None, None) => Ok(default),
        }
    };
    Ok(PortSides {
        input: pick(
            "input_side",
            &layer.input_side,
            "port_sides.input",
            &table.input,
            defaults.input,
        )?,
        output: pick(
            "output_side",
            &layer.output_side,
            "port_sides.output",
            &table.output,
            defaults.output,
        )?,
        inout: pick(
            "inout_side",
            &layer.inout_side,
            "port_sides.inout",
            &table.inout,
            defaults.inout,
        )?,
    })
}

fn resolve_override(key: &str, entry: &PinOverrideLayer) -> Result<PinOverride> {
    let side = match &entry.side {
        Some(name) => Some(Side::parse(name, format!("{key}.side"))?),
        None => None,
    };
    if let Some(center) = entry.center {
        if !(center.is_finite() && center >= 0.0) {
            return Err(Error::invalid(
                format!("{key}.center"),
                format!("{center} is not a non-negative coordinate"),
            ));
        }
    }
    Ok(PinOverride {
        side,
        layer: entry.layer.clone(),
        center: entry.center,
        x_width: positive(&format!("{key}.x_width"), entry.x_width)?,
        y_width: positive(&format!("{key}.y_width"), entry.y_width)?,
    })
}

fn resolve_pg(layer: &SpecLayer, h_layer: &str, v_layer: &str) -> Result<PgSpec> {
    let defaults = PgSpec::default();
    let table = layer.pg_pins.clone().unwrap_or_default();

    let interlace_interval = table
        .interlace_interval
        .unwrap_or(defaults.interlace_interval);
    if interlace_interval == 0 {
        return Err(Error::invalid(
            "pg_pins.interlace_interval",
            "must be at least 1",
        ));
    }

    let terminal = |key: &str, entry: Option<PinOverrideLayer>| -> Result<PinOverride> {
        let entry = entry.unwrap_or_default();
        let mut resolved = resolve_override(key, &entry)?;
        resolved.side.get_or_insert(Side::Top);
        Ok(resolved)
    };

    Ok(PgSpec {
        placement: table.pg_pin_placement.unwrap_or(defaults.placement),
        interlace_interval,
        strap_orientation: table
            .strap_orientation
            .unwrap_or(defaults.strap_orientation),
        strap_width: positive("pg_pins.strap_width", table.strap_width)?,
        strap_spacing: positive("pg_pins.strap_spacing", table.strap_spacing)?,
        h_layer: table.h_layer.unwrap_or_else(|| h_layer.to_string()),
        v_layer: table.v_layer.unwrap_or_else(|| v_layer.to_string()),
        pwr: terminal("pg_pins.pwr_pin", table.pwr_pin)?,
        gnd: terminal("pg_pins.gnd_pin", table.gnd_pin)?,
    })
}
