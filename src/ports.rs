// SPDX-License-Identifier: Apache-2.0

//! Logical port lists handed over by the HDL port extractor.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Signal direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
    Inout,
}

/// Inclusive bus range `[msb:lsb]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BusRangeRepr")]
pub struct BusRange {
    pub msb: usize,
    pub lsb: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BusRangeRepr {
    Bounds { msb: usize, lsb: usize },
    Text(String),
}

impl TryFrom<BusRangeRepr> for BusRange {
    type Error = String;

    fn try_from(repr: BusRangeRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            BusRangeRepr::Bounds { msb, lsb } => Ok(BusRange { msb, lsb }),
            BusRangeRepr::Text(text) => BusRange::parse(&text),
        }
    }
}

fn bus_range_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*\[\s*(\d+)\s*(?::\s*(\d+)\s*)?\]\s*$").unwrap())
}

impl BusRange {
    pub fn new(msb: usize, lsb: usize) -> Self {
        BusRange { msb, lsb }
    }

    /// Parses a Verilog-style range such as `[7:0]` or `[3]`.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let captures = bus_range_regex()
            .captures(text)
            .ok_or_else(|| format!("'{text}' is not a bus range like [7:0]"))?;
        let msb = captures[1]
            .parse::<usize>()
            .map_err(|e| format!("bad msb in '{text}': {e}"))?;
        let lsb = match captures.get(2) {
            Some(m) => m
                .as_str()
                .parse::<usize>()
                .map_err(|e| format!("bad lsb in '{text}': {e}"))?,
            None => msb,
        };
        Ok(BusRange { msb, lsb })
    }

    pub fn width(&self) -> usize {
        self.msb.abs_diff(self.lsb) + 1
    }

    /// Bit indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = usize> {
        self.msb.min(self.lsb)..=self.msb.max(self.lsb)
    }
}

/// One logical port of the black box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    pub direction: PortDirection,
    #[serde(default)]
    pub bus: Option<BusRange>,
}

impl PortSpec {
    pub fn new(name: impl AsRef<str>, direction: PortDirection) -> Self {
        PortSpec {
            name: name.as_ref().to_string(),
            direction,
            bus: None,
        }
    }

    pub fn input(name: impl AsRef<str>) -> Self {
        PortSpec::new(name, PortDirection::Input)
    }

    pub fn output(name: impl AsRef<str>) -> Self {
        PortSpec::new(name, PortDirection::Output)
    }

    pub fn inout(name: impl AsRef<str>) -> Self {
        PortSpec::new(name, PortDirection::Inout)
    }

    pub fn with_bus(mut self, msb: usize, lsb: usize) -> Self {
        self.bus = Some(BusRange::new(msb, lsb));
        self
    }

    /// Names of the individual pins this port expands to.
    pub fn bit_names(&self) -> Vec<String> {
        match &self.bus {
            Some(bus) => bus.indices().map(|i| bus_bit(&self.name, i)).collect(),
            None => vec![self.name.clone()],
        }
    }
}

/// Name of a single bit of a bus pin.
pub fn bus_bit(name: &str, index: usize) -> String {
    format!("{name}[{index}]")
}

/// Names of the power and ground nets of the black box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerNets {
    #[serde(default = "default_power_net", alias = "power_pin")]
    pub power: String,
    #[serde(default = "default_ground_net", alias = "ground_pin")]
    pub ground: String,
}

fn default_power_net() -> String {
    "VDD".to_string()
}

fn default_ground_net() -> String {
    "VSS".to_string()
}

impl Default for PowerNets {
    fn default() -> Self {
        PowerNets {
            power: default_power_net(),
            ground: default_ground_net(),
        }
    }
}

/// Port list of one module, as produced by the external extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortList {
    pub name: String,
    #[serde(default)]
    pub ports: Vec<PortSpec>,
    #[serde(default, alias = "power_pins")]
    pub power_nets: PowerNets,
}

impl PortList {
    pub fn new(name: impl AsRef<str>) -> Self {
        PortList {
            name: name.as_ref().to_string(),
            ports: Vec::new(),
            power_nets: PowerNets::default(),
        }
    }

    pub fn with_port(mut self, port: PortSpec) -> Self {
        self.ports.push(port);
        self
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        PortList::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::parse("port list", e))
    }
}
