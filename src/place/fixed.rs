// SPDX-License-Identifier: Apache-2.0

//! Placement of pins with an explicit center and of power/ground straps.

use itertools::Itertools;
use log::debug;

use crate::catalog::Pin;
use crate::config::{PgPlacement, PlacementSpec};
use crate::error::{Error, Result};
use crate::geometry::{Axis, Rect, Side};
use crate::place::{Attempt, Presence, SideOccupant, flush_rect};

/// Result of the fixed placement step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FixedOutcome {
    Placed,
    /// The straps need a longer side; the internal box must be at least
    /// `floor` along `axis`.
    Resize { axis: Axis, floor: i64 },
}

/// Places every pin that carries an explicit center.
pub(crate) fn place_pinned(attempt: &mut Attempt) {
    let outline = *attempt.layout.outline();
    for pin in attempt.fixed.iter_mut() {
        let Some(center) = pin.center else {
            continue;
        };
        let lo = center - pin.along().div_euclid(2);
        let rect = flush_rect(&outline, pin, lo);
        pin.add_rect(rect);
        attempt.occupants[pin.side].push(SideOccupant {
            pin: pin.name.clone(),
            rect,
            layer: pin.layer.clone(),
            pitch: pin.pitch,
            presence: Presence::Real,
        });
    }
}

/// Bands along the free axis that strap pairs must stay out of: the pinned
/// pins already on `sides`, each widened by its pitch or `clearance`,
/// whichever is larger. Sorted by lower edge.
fn pinned_bands(attempt: &Attempt, sides: [Side; 2], clearance: i64) -> Vec<(i64, i64)> {
    sides
        .into_iter()
        .flat_map(|side| {
            attempt.occupants[side].iter().map(move |o| {
                let (lo, hi) = o.rect.span(side.free_axis());
                let keep = o.pitch.max(clearance);
                (lo - keep, hi + keep)
            })
        })
        .sorted()
        .collect()
}

/// Lowest start at or after `lo` for a run of `len` that misses every band.
/// `bands` must be sorted by lower edge.
fn clear_of(mut lo: i64, len: i64, bands: &[(i64, i64)]) -> i64 {
    for &(band_lo, band_hi) in bands {
        if band_lo < lo + len && lo < band_hi {
            lo = band_hi;
        }
    }
    lo
}

/// Lower edges of the strap pairs after packing `groups` of pins at
/// minimum pitch from `start`, one pair after each group, followed by
/// `trailing` pins. A pair that would run into one of `bands` moves past
/// it. Also returns the end of the packed run.
fn walk(
    start: i64,
    groups: &[&[Pin]],
    trailing: &[Pin],
    pair: i64,
    clearance: i64,
    bands: &[(i64, i64)],
) -> (Vec<i64>, i64) {
    let mut cursor = start;
    let mut pairs = Vec::with_capacity(groups.len());
    let mut end = start;
    for group in groups {
        let mut last_pitch = None;
        for pin in group.iter() {
            cursor += pin.along() + pin.pitch;
            last_pitch = Some(pin.pitch);
        }
        let pair_lo = match last_pitch {
            Some(pitch) => cursor - pitch + clearance,
            None => cursor,
        };
        let pair_lo = clear_of(pair_lo, pair, bands);
        pairs.push(pair_lo);
        end = pair_lo + pair;
        cursor = end + clearance;
    }
    for pin in trailing {
        end = cursor + pin.along();
        cursor = end + pin.pitch;
    }
    (pairs, end)
}

/// Draws the power/ground strap pairs and records them as occupants of both
/// sides they cross.
pub(crate) fn place_straps(attempt: &mut Attempt, spec: &PlacementSpec) -> Result<FixedOutcome> {
    if attempt.straps.len() < 2 {
        return Ok(FixedOutcome::Placed);
    }
    let primary = attempt.straps[0].side;
    let opposite = primary.opposite();
    let axis = primary.free_axis();
    let span = attempt.layout.free_span(primary);

    let width = attempt.straps[0].along();
    let clearance = attempt.straps[0].pitch;
    let spacing = spec
        .pg
        .strap_spacing
        .map(|s| spec.grid.to_dbu(s))
        .unwrap_or(clearance);
    let pair = 2 * width + spacing;

    let bands = pinned_bands(attempt, [primary, opposite], clearance);
    let queue: &[Pin] = if attempt.queues[primary].len() >= attempt.queues[opposite].len() {
        &attempt.queues[primary]
    } else {
        &attempt.queues[opposite]
    };

    let (pairs, end) = match spec.pg.placement {
        PgPlacement::Straps => match attempt.straps[0].center {
            Some(center) => {
                let lo = center - width.div_euclid(2);
                if lo < span.lower {
                    return Err(Error::invalid(
                        "pg_pins.pwr_pin.center",
                        format!(
                            "strap at {} um starts below the free span at {} um",
                            spec.grid.to_microns(center),
                            spec.grid.to_microns(span.lower)
                        ),
                    ));
                }
                if clear_of(lo, pair, &bands) != lo {
                    return Err(Error::invalid(
                        "pg_pins.pwr_pin.center",
                        format!(
                            "strap pair at {} um is closer than the {} pitch to a pinned pin",
                            spec.grid.to_microns(center),
                            attempt.straps[0].layer
                        ),
                    ));
                }
                (vec![lo], lo + pair)
            }
            None => {
                let (before, after) = queue.split_at(queue.len().div_ceil(2));
                walk(span.lower, &[before], after, pair, clearance, &bands)
            }
        },
        PgPlacement::Interlaced => {
            let interval = spec.pg.interlace_interval;
            let mut groups: Vec<&[Pin]> = queue.chunks(interval).collect();
            if groups.is_empty() {
                groups.push(&[]);
            }
            walk(span.lower, &groups, &[], pair, clearance, &bands)
        }
        PgPlacement::SmallPins => return Ok(FixedOutcome::Placed),
    };

    if end > span.upper {
        let floor = attempt.layout.internal_extent(axis) + (end - span.upper);
        debug!(
            "{} strap pair(s) need {} um more along {axis}",
            pairs.len(),
            spec.grid.to_microns(end - span.upper)
        );
        return Ok(FixedOutcome::Resize { axis, floor });
    }

    let across = attempt.layout.outline().span(axis.other());
    let layer = attempt.straps[0].layer.clone();
    for lo in pairs {
        let spans = [(lo, lo + width), (lo + width + spacing, lo + pair)];
        for (strap, along) in attempt.straps.iter_mut().zip(spans) {
            let rect = Rect::from_spans(axis, along, across);
            strap.add_rect(rect);
            let presences = [(primary, Presence::Real), (opposite, Presence::KeepoutOnly)];
            for (side, presence) in presences {
                attempt.occupants[side].push(SideOccupant {
                    pin: strap.name.clone(),
                    rect,
                    layer: layer.clone(),
                    pitch: strap.pitch,
                    presence,
                });
            }
        }
    }
    debug!(
        "Placed {} strap pair(s) on {layer} across the {primary} and {opposite} sides",
        attempt.straps[0].rects.len()
    );
    Ok(FixedOutcome::Placed)
}
