// SPDX-License-Identifier: Apache-2.0

//! Derivation of the internal box and the design outline from the pins
//! that have to fit on each side.

use log::{debug, warn};

use crate::catalog::Pin;
use crate::config::{PlacementSpec, Strictness};
use crate::error::{Error, Result};
use crate::geometry::{Axis, Interval, Rect, Side, SideMap};
use crate::model::BoundaryBox;
use crate::tech::LayerRules;

const ASPECT_RATIO_TOLERANCE: f64 = 1e-3;

/// Lower bounds on the internal box accumulated across attempts, in
/// database units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Demand {
    pub floor_x: i64,
    pub floor_y: i64,
}

impl Demand {
    pub fn floor(&self, axis: Axis) -> i64 {
        match axis {
            Axis::X => self.floor_x,
            Axis::Y => self.floor_y,
        }
    }

    /// Raises the floor along `axis`; lower values are ignored.
    pub fn raise(&mut self, axis: Axis, value: i64) {
        let floor = match axis {
            Axis::X => &mut self.floor_x,
            Axis::Y => &mut self.floor_y,
        };
        *floor = (*floor).max(value);
    }
}

/// Boundary of one placement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub boundary: BoundaryBox,
    /// Distance kept free at both ends of each axis.
    inset_x: i64,
    inset_y: i64,
}

impl Layout {
    pub fn outline(&self) -> &Rect {
        &self.boundary.design_boundary
    }

    pub fn internal_extent(&self, axis: Axis) -> i64 {
        self.boundary.internal_box.extent(axis)
    }

    /// Span along `side` in which pins may be placed.
    pub fn free_span(&self, side: Side) -> Interval {
        let axis = side.free_axis();
        let (lo, hi) = self.boundary.internal_box.span(axis);
        let inset = match axis {
            Axis::X => self.inset_x,
            Axis::Y => self.inset_y,
        };
        Interval::new(lo + inset, hi - inset)
    }
}

/// Length needed along a side to hold `pins` at minimum pitch, in the
/// given order.
pub(crate) fn packed_length<'a>(pins: impl IntoIterator<Item = &'a Pin>) -> i64 {
    let mut length = 0;
    let mut previous_pitch: Option<i64> = None;
    for pin in pins {
        if let Some(pitch) = previous_pitch {
            length += pitch.max(pin.pitch);
        }
        length += pin.along();
        previous_pitch = Some(pin.pitch);
    }
    length
}

/// Minimum internal length along the free axis of `side`.
fn side_minimum(side: Side, pins: &[Pin], axis_start: i64) -> i64 {
    let on_side = || pins.iter().filter(move |p| p.side == side);
    let packed = packed_length(on_side());
    let pinned = on_side()
        .filter_map(|p| {
            p.center
                .map(|c| c - p.along().div_euclid(2) + p.along() + p.pitch - axis_start)
        })
        .max()
        .unwrap_or(0);
    packed.max(pinned)
}

fn fit_explicit(spec: &PlacementSpec, axis: Axis, given: i64, minimum: i64) -> Result<i64> {
    if given >= minimum {
        return Ok(given);
    }
    match spec.strictness(axis) {
        Strictness::Strict => Err(Error::StrictDimension {
            axis,
            given_um: spec.grid.to_microns(given),
            required_um: spec.grid.to_microns(minimum),
        }),
        Strictness::Flexible => {
            debug!(
                "Growing flexible {axis} width from {} to {} um",
                spec.grid.to_microns(given),
                spec.grid.to_microns(minimum)
            );
            Ok(minimum)
        }
    }
}

fn scaled(length: i64, factor: f64) -> i64 {
    (length as f64 * factor).round() as i64
}

/// Computes the boundary for `pins` under `spec`, honoring the floors in
/// `demand`.
pub fn size_boundary(
    pins: &[Pin],
    spec: &PlacementSpec,
    rules: &LayerRules,
    demand: &Demand,
) -> Result<Layout> {
    let grid = &spec.grid;

    let margins: SideMap<i64> = SideMap::from_fn(|side| {
        pins.iter()
            .filter(|p| p.side == side)
            .map(|p| p.across())
            .max()
            .unwrap_or(0)
    });

    // Pins on left/right use the horizontal layer and stack along y.
    let (inset_x, inset_y) = if spec.pin_margin {
        (
            rules.pitch_of(&spec.v_layer) / 2,
            rules.pitch_of(&spec.h_layer) / 2,
        )
    } else {
        (0, 0)
    };

    let minimum = |axis: Axis| -> i64 {
        let (sides, start, inset) = match axis {
            Axis::X => ([Side::Top, Side::Bottom], margins[Side::Left], inset_x),
            Axis::Y => ([Side::Left, Side::Right], margins[Side::Bottom], inset_y),
        };
        let pins_min = sides
            .iter()
            .map(|&side| side_minimum(side, pins, start + inset))
            .max()
            .unwrap_or(0);
        (pins_min + 2 * inset).max(demand.floor(axis))
    };
    let min_x = minimum(Axis::X);
    let min_y = minimum(Axis::Y);
    debug!(
        "Minimum internal box {} x {} um",
        grid.to_microns(min_x),
        grid.to_microns(min_y)
    );

    let explicit = |axis: Axis| {
        spec.explicit_width(axis)
            .map(|w| grid.to_dbu(w))
            .filter(|&w| w > 0)
    };

    let (x, y) = match (explicit(Axis::X), explicit(Axis::Y)) {
        (Some(given_x), Some(given_y)) => {
            if let Some(ratio) = spec.aspect_ratio {
                let wanted = ratio.x / ratio.y;
                let actual = given_x as f64 / given_y as f64;
                if ((actual - wanted) / wanted).abs() > ASPECT_RATIO_TOLERANCE {
                    return Err(Error::AspectRatio {
                        ratio_x: ratio.x,
                        ratio_y: ratio.y,
                        x_um: grid.to_microns(given_x),
                        y_um: grid.to_microns(given_y),
                    });
                }
            }
            (
                fit_explicit(spec, Axis::X, given_x, min_x)?,
                fit_explicit(spec, Axis::Y, given_y, min_y)?,
            )
        }
        (Some(given), None) => derive_from_explicit(spec, Axis::X, given, min_x, min_y)?,
        (None, Some(given)) => {
            let (y, x) = derive_from_explicit(spec, Axis::Y, given, min_y, min_x)?;
            (x, y)
        }
        (None, None) => match spec.aspect_ratio {
            Some(ratio) => match (spec.x_strictness, spec.y_strictness) {
                (Strictness::Flexible, Strictness::Flexible) => {
                    let scale = (min_x as f64 / ratio.x).max(min_y as f64 / ratio.y);
                    (
                        (scale * ratio.x).round().max(min_x as f64) as i64,
                        (scale * ratio.y).round().max(min_y as f64) as i64,
                    )
                }
                (Strictness::Strict, Strictness::Flexible) => {
                    (min_x, scaled(min_x, ratio.factor(Axis::X)).max(min_y))
                }
                (Strictness::Flexible, Strictness::Strict) => {
                    (scaled(min_y, ratio.factor(Axis::Y)).max(min_x), min_y)
                }
                (Strictness::Strict, Strictness::Strict) => {
                    warn!(
                        "Aspect ratio {}:{} ignored because both dimensions are strict",
                        ratio.x, ratio.y
                    );
                    (min_x, min_y)
                }
            },
            None => (min_x, min_y),
        },
    };

    // Sides without pins have no natural length.
    let fallback = rules
        .pitch_of(&spec.h_layer)
        .max(rules.pitch_of(&spec.v_layer))
        .max(1);
    let (x, y) = match (x, y) {
        (0, 0) => (fallback, fallback),
        (0, y) => (y, y),
        (x, 0) => (x, x),
        other => other,
    };

    let left = margins[Side::Left];
    let bottom = margins[Side::Bottom];
    let internal_box = Rect::new(left, bottom, left + x, bottom + y);
    let design_boundary = Rect::new(
        0,
        0,
        x + left + margins[Side::Right],
        y + bottom + margins[Side::Top],
    );
    let origin = (grid.to_dbu(spec.origin.0), grid.to_dbu(spec.origin.1));
    let bound_box = design_boundary.translate(-origin.0, -origin.1);
    debug!(
        "Internal box {} x {} um, outline {} x {} um",
        grid.to_microns(x),
        grid.to_microns(y),
        grid.to_microns(design_boundary.width()),
        grid.to_microns(design_boundary.height())
    );

    Ok(Layout {
        boundary: BoundaryBox {
            internal_box,
            design_boundary,
            bound_box,
        },
        inset_x,
        inset_y,
    })
}

/// Resolves the dimensions when only `axis` was given explicitly. Returns
/// `(along axis, along the other axis)`.
fn derive_from_explicit(
    spec: &PlacementSpec,
    axis: Axis,
    given: i64,
    min_fixed: i64,
    min_other: i64,
) -> Result<(i64, i64)> {
    let mut fixed = fit_explicit(spec, axis, given, min_fixed)?;
    let Some(ratio) = spec.aspect_ratio else {
        return Ok((fixed, min_other));
    };
    let factor = ratio.factor(axis);
    let mut other = scaled(fixed, factor);
    if other < min_other {
        match spec.strictness(axis) {
            Strictness::Flexible => {
                fixed = fixed.max((min_other as f64 / factor).ceil() as i64);
                other = scaled(fixed, factor).max(min_other);
                debug!(
                    "Growing flexible {axis} width to {} um to keep the aspect ratio",
                    spec.grid.to_microns(fixed)
                );
            }
            Strictness::Strict => {
                warn!(
                    "Aspect ratio {}:{} cannot be kept with a strict {axis} width of {} um",
                    ratio.x,
                    ratio.y,
                    spec.grid.to_microns(fixed)
                );
                other = min_other;
            }
        }
    }
    Ok((fixed, other))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PinUse;
    use crate::geometry::RoutingDirection;
    use crate::ports::PortDirection;
    use crate::tech::LayerRule;

    fn rules() -> LayerRules {
        LayerRules::from_rules([
            LayerRule {
                name: "M2".to_string(),
                min_width: 100,
                pitch: 200,
                direction: RoutingDirection::Horizontal,
            },
            LayerRule {
                name: "M3".to_string(),
                min_width: 100,
                pitch: 200,
                direction: RoutingDirection::Vertical,
            },
        ])
    }

    fn pin(name: &str, side: Side, center: Option<i64>) -> Pin {
        let (x_width, y_width) = match side.free_axis() {
            Axis::X => (100, 1000),
            Axis::Y => (1000, 100),
        };
        Pin {
            name: name.to_string(),
            index: 0,
            direction: PortDirection::Input,
            pin_use: PinUse::Signal,
            side,
            layer: "M2".to_string(),
            x_width,
            y_width,
            pitch: 200,
            center,
            rects: Vec::new(),
        }
    }

    fn spec(json: &str) -> PlacementSpec {
        PlacementSpec::builder()
            .json_str(json)
            .unwrap()
            .build()
            .unwrap()
    }

    fn left_pins(n: usize) -> Vec<Pin> {
        (0..n).map(|i| pin(&format!("p{i}"), Side::Left, None)).collect()
    }

    #[test]
    fn minimum_from_busiest_side() {
        let layout =
            size_boundary(&left_pins(4), &spec("{}"), &rules(), &Demand::default()).unwrap();
        assert_eq!(layout.boundary.internal_box, Rect::new(1000, 0, 2000, 1000));
        assert_eq!(layout.boundary.design_boundary, Rect::new(0, 0, 2000, 1000));
        assert_eq!(layout.free_span(Side::Left), Interval::new(0, 1000));
    }

    #[test]
    fn pinned_pin_raises_minimum() {
        let pins = vec![pin("a", Side::Right, Some(5000))];
        let layout = size_boundary(&pins, &spec("{}"), &rules(), &Demand::default()).unwrap();
        assert_eq!(layout.internal_extent(Axis::Y), 5250);
    }

    #[test]
    fn pin_margin_insets_free_span() {
        let layout = size_boundary(
            &left_pins(4),
            &spec(r#"{"pin_margin": true}"#),
            &rules(),
            &Demand::default(),
        )
        .unwrap();
        assert_eq!(layout.internal_extent(Axis::Y), 1200);
        assert_eq!(layout.free_span(Side::Left), Interval::new(100, 1100));
    }

    #[test]
    fn aspect_ratio_derives_other_dimension() {
        let layout = size_boundary(
            &left_pins(4),
            &spec(r#"{"aspect_ratio": [1, 2], "y_width": 10.0}"#),
            &rules(),
            &Demand::default(),
        )
        .unwrap();
        assert_eq!(layout.internal_extent(Axis::X), 5000);
        assert_eq!(layout.internal_extent(Axis::Y), 10000);
    }

    #[test]
    fn aspect_ratio_scales_minima() {
        let layout = size_boundary(
            &left_pins(10),
            &spec(r#"{"aspect_ratio": [2, 1]}"#),
            &rules(),
            &Demand::default(),
        )
        .unwrap();
        assert_eq!(layout.internal_extent(Axis::Y), 2800);
        assert_eq!(layout.internal_extent(Axis::X), 5600);
    }

    #[test]
    fn strict_dimension_too_small() {
        let err = size_boundary(
            &left_pins(10),
            &spec(r#"{"y_width": 1.0, "y_strictness": "strict"}"#),
            &rules(),
            &Demand::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::StrictDimension { axis: Axis::Y, .. }));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn flexible_dimension_grows() {
        let layout = size_boundary(
            &left_pins(10),
            &spec(r#"{"y_width": 1.0}"#),
            &rules(),
            &Demand::default(),
        )
        .unwrap();
        assert_eq!(layout.internal_extent(Axis::Y), 2800);
    }

    #[test]
    fn conflicting_fixed_widths() {
        let err = size_boundary(
            &left_pins(1),
            &spec(r#"{"aspect_ratio": [1, 1], "x_width": 4.0, "y_width": 5.0}"#),
            &rules(),
            &Demand::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::AspectRatio { .. }));
    }

    #[test]
    fn demand_floor_and_empty_axis() {
        let mut demand = Demand::default();
        demand.raise(Axis::Y, 3000);
        demand.raise(Axis::Y, 2000);
        let layout = size_boundary(&left_pins(2), &spec("{}"), &rules(), &demand).unwrap();
        assert_eq!(layout.internal_extent(Axis::Y), 3000);
        // No top or bottom pins: the internal box falls back to a square.
        assert_eq!(layout.internal_extent(Axis::X), 3000);

        let layout = size_boundary(&[], &spec("{}"), &rules(), &Demand::default()).unwrap();
        assert_eq!(layout.boundary.internal_box, Rect::new(0, 0, 200, 200));
    }

    #[test]
    fn origin_shifts_bound_box() {
        let layout = size_boundary(
            &left_pins(4),
            &spec(r#"{"origin": [0.5, 0.25]}"#),
            &rules(),
            &Demand::default(),
        )
        .unwrap();
        assert_eq!(layout.boundary.bound_box, Rect::new(-500, -250, 1500, 750));
    }
}
