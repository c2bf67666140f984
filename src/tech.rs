// SPDX-License-Identifier: Apache-2.0

//! Technology description loading and the per-layer rule table.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::geometry::RoutingDirection;
use crate::units::Grid;

#[derive(Debug, Deserialize)]
struct TechDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    stackups: Vec<StackupDescription>,
}

#[derive(Debug, Deserialize)]
struct StackupDescription {
    #[serde(default)]
    name: String,
    #[serde(default)]
    metals: Vec<Metal>,
}

/// One routing layer as written in the technology description, in microns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Metal {
    pub name: String,
    pub min_width: f64,
    pub pitch: f64,
    pub direction: RoutingDirection,
    #[serde(default)]
    pub index: Option<u32>,
}

/// The metal stackup selected from a technology description.
#[derive(Debug, Clone)]
pub struct Technology {
    name: Option<String>,
    stackup: String,
    metals: Vec<Metal>,
}

impl Technology {
    /// Loads a technology description. Only JSON (HAMMER `tech.json`) files
    /// are accepted.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => {
                let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                Technology::from_json_str(&text)
            }
            "yaml" | "yml" => Err(Error::UnsupportedTechFormat(extension)),
            _ => Err(Error::UnrecognizedTechFormat(extension)),
        }
    }

    /// Parses a technology description and selects its first stackup.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let document: TechDocument =
            serde_json::from_str(text).map_err(|e| Error::parse("technology description", e))?;
        let stackup = document
            .stackups
            .into_iter()
            .next()
            .ok_or(Error::MissingStackup)?;
        if stackup.metals.is_empty() {
            return Err(Error::MissingStackup);
        }
        for metal in &stackup.metals {
            if !(metal.min_width > 0.0) || !(metal.pitch > 0.0) {
                return Err(Error::invalid(
                    format!("stackups[0].metals.{}", metal.name),
                    "min_width and pitch must be positive",
                ));
            }
        }
        Ok(Technology {
            name: document.name,
            stackup: stackup.name,
            metals: stackup.metals,
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn stackup_name(&self) -> &str {
        &self.stackup
    }

    pub fn metals(&self) -> &[Metal] {
        &self.metals
    }

    /// Builds the rule table for this stackup on the given grid.
    pub fn layer_rules(&self, grid: Grid) -> LayerRules {
        let rules = self
            .metals
            .iter()
            .map(|metal| {
                (
                    metal.name.clone(),
                    LayerRule {
                        name: metal.name.clone(),
                        min_width: grid.to_dbu(metal.min_width),
                        pitch: grid.to_dbu(metal.pitch),
                        direction: metal.direction,
                    },
                )
            })
            .collect();
        LayerRules { rules }
    }
}

/// Width, pitch and routing direction of one layer, in database units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRule {
    pub name: String,
    pub min_width: i64,
    pub pitch: i64,
    pub direction: RoutingDirection,
}

/// Lookup table from layer name to [`LayerRule`], in stackup order.
#[derive(Debug, Clone, Default)]
pub struct LayerRules {
    rules: IndexMap<String, LayerRule>,
}

impl LayerRules {
    pub fn from_rules(rules: impl IntoIterator<Item = LayerRule>) -> Self {
        LayerRules {
            rules: rules.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    /// Looks up `layer`, reporting `key` as the configuration entry that
    /// referenced it when the layer does not exist.
    pub fn get(&self, layer: &str, key: impl AsRef<str>) -> Result<&LayerRule> {
        self.rules.get(layer).ok_or_else(|| Error::UnknownLayer {
            key: key.as_ref().to_string(),
            layer: layer.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerRule> {
        self.rules.values()
    }

    /// Pitch of `layer`, or zero for layers that are not in the table.
    pub(crate) fn pitch_of(&self, layer: &str) -> i64 {
        self.rules.get(layer).map(|r| r.pitch).unwrap_or(0)
    }
}
