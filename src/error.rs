// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use crate::geometry::{Axis, Side};

/// Errors produced while loading inputs, building the pin catalog, or
/// placing pins.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An input file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The technology file has a known but unsupported format.
    #[error("technology file type '.{0}' is not supported")]
    UnsupportedTechFormat(String),

    /// The technology file extension is not recognized at all.
    #[error("unrecognized technology file type '.{0}'")]
    UnrecognizedTechFormat(String),

    /// The technology description does not contain a usable metal stackup.
    #[error("technology description has no metal stackup")]
    MissingStackup,

    /// A document could not be deserialized.
    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    /// A configuration value is malformed or out of range.
    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// A side name is not one of left, right, top, bottom.
    #[error("unknown side '{side}' for '{key}'")]
    UnknownSide { key: String, side: String },

    /// A layer name is not present in the selected stackup.
    #[error("layer '{layer}' used by '{key}' is not defined in the stackup")]
    UnknownLayer { key: String, layer: String },

    /// Two ports expand to the same pin name.
    #[error("duplicate pin '{0}'")]
    DuplicatePin(String),

    /// A strict, explicitly sized dimension cannot host its pins.
    #[error(
        "strict {axis} width {given_um} is smaller than the {required_um} required by its pins"
    )]
    StrictDimension {
        axis: Axis,
        given_um: f64,
        required_um: f64,
    },

    /// Explicit widths contradict the requested aspect ratio.
    #[error("aspect ratio {ratio_x}:{ratio_y} cannot be met by fixed widths {x_um} x {y_um}")]
    AspectRatio {
        ratio_x: f64,
        ratio_y: f64,
        x_um: f64,
        y_um: f64,
    },

    /// Placement still leaves pins unplaced and the boundary may not grow
    /// any further.
    #[error(
        "placement infeasible after {attempts} attempt(s) ({reason}); unplaced: {}",
        .unplaced.join(", ")
    )]
    Infeasible {
        attempts: usize,
        reason: String,
        unplaced: Vec<String>,
    },

    /// Two shapes on the same side and layer violate the pitch rule.
    #[error("{first} and {second} are closer than the pitch of {layer} on the {side} side")]
    Overlap {
        side: Side,
        layer: String,
        first: String,
        second: String,
    },

    /// A shape lies outside the region that must contain it.
    #[error("{shape} is not contained within the {region}")]
    NotContained { shape: String, region: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(what: impl AsRef<str>, message: impl ToString) -> Self {
        Error::Parse {
            what: what.as_ref().to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn invalid(key: impl AsRef<str>, message: impl ToString) -> Self {
        Error::InvalidValue {
            key: key.as_ref().to_string(),
            message: message.to_string(),
        }
    }

    /// Returns `true` for errors that stem from the user's configuration
    /// rather than from the technology data or from placement itself.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidValue { .. }
                | Error::UnknownSide { .. }
                | Error::UnknownLayer { .. }
                | Error::DuplicatePin(_)
                | Error::StrictDimension { .. }
                | Error::AspectRatio { .. }
        )
    }
}
