// SPDX-License-Identifier: Apache-2.0

//! Placement of pins without an explicit location.

use crate::catalog::Pin;
use crate::config::PinSpacing;
use crate::geometry::{Interval, Rect};
use crate::place::flush_rect;

/// Fills one interval with pins taken from the front of a queue.
pub trait SpacingStrategy {
    /// Places a prefix of `pins` inside `interval`, flush against the side
    /// of `outline` they belong to, and returns the pins that did not fit.
    fn fill<'p>(&self, interval: Interval, outline: &Rect, pins: &'p mut [Pin]) -> &'p mut [Pin];
}

/// Packs pins at minimum pitch from the lower end of the interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinPitch;

impl SpacingStrategy for MinPitch {
    fn fill<'p>(&self, interval: Interval, outline: &Rect, pins: &'p mut [Pin]) -> &'p mut [Pin] {
        let mut cursor = interval.lower;
        let mut placed = 0;
        for pin in pins.iter_mut() {
            let along = pin.along();
            if cursor + along > interval.upper {
                break;
            }
            let rect = flush_rect(outline, pin, cursor);
            pin.add_rect(rect);
            cursor += along + pin.pitch;
            placed += 1;
        }
        &mut pins[placed..]
    }
}

/// Spreads all pins over the interval with equal gaps, or packs them like
/// [`MinPitch`] when they do not fit with at least one pitch around each.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distributed;

impl SpacingStrategy for Distributed {
    fn fill<'p>(&self, interval: Interval, outline: &Rect, pins: &'p mut [Pin]) -> &'p mut [Pin] {
        if pins.is_empty() {
            return pins;
        }
        let count = pins.len();
        let n = count as i64;
        let total: i64 = pins.iter().map(Pin::along).sum();
        let max_pitch = pins.iter().map(|p| p.pitch).max().unwrap_or(0);
        if total + (n + 1) * max_pitch > interval.len() {
            return MinPitch.fill(interval, outline, pins);
        }
        let gap = (interval.len() - total) / (n + 1);
        let mut cursor = interval.lower + gap;
        for pin in pins.iter_mut() {
            let rect = flush_rect(outline, pin, cursor);
            pin.add_rect(rect);
            cursor += pin.along() + gap;
        }
        &mut pins[count..]
    }
}

pub fn strategy(spacing: PinSpacing) -> &'static dyn SpacingStrategy {
    match spacing {
        PinSpacing::MinPitch => &MinPitch,
        PinSpacing::Distributed => &Distributed,
    }
}
