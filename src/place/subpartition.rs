// SPDX-License-Identifier: Apache-2.0

//! Division of a side's free span into the intervals left over by pinned
//! pins and straps.

use crate::geometry::{Axis, Interval};
use crate::place::SideOccupant;

/// Splits `interval` around a shape spanning `[edge_lo, edge_hi]`, keeping
/// `pitch` clear on both sides of it. The interval is returned unchanged
/// when it does not strictly contain the shape's center. Empty pieces are
/// dropped.
pub fn split_interval(interval: Interval, edge_lo: i64, edge_hi: i64, pitch: i64) -> Vec<Interval> {
    if !interval.strictly_contains2(edge_lo + edge_hi) {
        return vec![interval];
    }
    [
        Interval::new(interval.lower, edge_lo - pitch),
        Interval::new(edge_hi + pitch, interval.upper),
    ]
    .into_iter()
    .filter(|iv| !iv.is_empty())
    .collect()
}

/// Removes the band `(band_lo, band_hi)` from `interval`.
fn clip(interval: Interval, band_lo: i64, band_hi: i64) -> Vec<Interval> {
    if !interval.overlaps(band_lo, band_hi) {
        return vec![interval];
    }
    [
        Interval::new(interval.lower, interval.upper.min(band_lo)),
        Interval::new(interval.lower.max(band_hi), interval.upper),
    ]
    .into_iter()
    .filter(|iv| !iv.is_empty())
    .collect()
}

/// Candidate intervals of `span` along `axis` once every occupant has been
/// cut out.
pub fn subpartition(span: Interval, occupants: &[SideOccupant], axis: Axis) -> Vec<Interval> {
    if span.is_empty() {
        return Vec::new();
    }
    let mut intervals = vec![span];

    for occupant in occupants {
        let (lo, hi) = occupant.rect.span(axis);
        let center2 = lo + hi;
        if let Some(i) = intervals.iter().position(|iv| iv.strictly_contains2(center2)) {
            let pieces = split_interval(intervals[i], lo, hi, occupant.pitch);
            intervals.splice(i..=i, pieces);
        }
    }

    // Occupants centered outside every interval may still straddle one.
    for occupant in occupants {
        let (lo, hi) = occupant.rect.span(axis);
        intervals = intervals
            .into_iter()
            .flat_map(|iv| clip(iv, lo - occupant.pitch, hi + occupant.pitch))
            .collect();
    }

    intervals
}
