// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Manufacturing grid used to store every coordinate as an integer number of
/// database units. The resolution is the ratio between the user unit
/// (normally one micron) and the layout precision (normally one nanometer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    dbu_per_micron: i64,
}

impl Grid {
    /// Creates a grid from the `units` and `precision` settings, both given
    /// in meters.
    pub fn new(units: f64, precision: f64) -> Result<Self> {
        if !(units.is_finite() && units > 0.0) {
            return Err(Error::invalid("units", format!("{units} is not positive")));
        }
        if !(precision.is_finite() && precision > 0.0) {
            return Err(Error::invalid(
                "precision",
                format!("{precision} is not positive"),
            ));
        }
        let ratio = (units / precision).round();
        if ratio < 1.0 {
            return Err(Error::invalid(
                "precision",
                format!("precision {precision} is coarser than units {units}"),
            ));
        }
        Ok(Grid {
            dbu_per_micron: ratio as i64,
        })
    }

    pub fn dbu_per_micron(&self) -> i64 {
        self.dbu_per_micron
    }

    /// Snaps a length in microns to the nearest grid point.
    pub fn to_dbu(&self, microns: f64) -> i64 {
        (microns * self.dbu_per_micron as f64).round() as i64
    }

    pub fn to_microns(&self, dbu: i64) -> f64 {
        dbu as f64 / self.dbu_per_micron as f64
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            dbu_per_micron: 1000,
        }
    }
}
