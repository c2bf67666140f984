// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

/// Closed span `[lower, upper]` along a side's free axis, in database units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Interval {
    pub lower: i64,
    pub upper: i64,
}

impl Interval {
    pub fn new(lower: i64, upper: i64) -> Self {
        Interval { lower, upper }
    }

    pub fn len(&self) -> i64 {
        self.upper - self.lower
    }

    /// An interval with no room for a shape of positive width.
    pub fn is_empty(&self) -> bool {
        self.upper <= self.lower
    }

    /// Tests whether a doubled coordinate lies strictly inside the interval.
    pub fn strictly_contains2(&self, value2: i64) -> bool {
        2 * self.lower < value2 && value2 < 2 * self.upper
    }

    /// Returns `true` if the open band `(lo, hi)` overlaps this interval.
    pub fn overlaps(&self, lo: i64, hi: i64) -> bool {
        lo < self.upper && self.lower < hi
    }
}
