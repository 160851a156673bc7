//! Half-open interval primitives shared by every other module.
//!
//! An [`Interval`] covers `[start, end)`. Intervals that merely touch
//! (`a.end == b.start`) do NOT overlap, and an interval with `end <= start`
//! is treated as empty: it never overlaps anything, itself included.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An absolute instant. Millisecond precision is all the engine relies on.
pub type TimePoint = DateTime<Utc>;

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: TimePoint,
    pub end: TimePoint,
}

impl Interval {
    pub fn new(start: TimePoint, end: TimePoint) -> Self {
        Self { start, end }
    }

    /// `true` when the interval has positive length.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Length in whole minutes, or 0 for an empty interval.
    pub fn duration_minutes(&self) -> i64 {
        if self.is_valid() {
            (self.end - self.start).num_minutes()
        } else {
            0
        }
    }

    /// `true` when `t` falls inside `[start, end)`.
    pub fn contains(&self, t: TimePoint) -> bool {
        self.start <= t && t < self.end
    }
}

/// Two intervals overlap iff `max(a.start, b.start) < min(a.end, b.end)`.
///
/// Empty intervals never overlap anything.
pub fn overlaps(a: &Interval, b: &Interval) -> bool {
    if !a.is_valid() || !b.is_valid() {
        return false;
    }
    a.start.max(b.start) < a.end.min(b.end)
}

/// `true` when the intervals overlap or share a boundary, i.e. their union is
/// a single contiguous interval.
pub fn touches_or_overlaps(a: &Interval, b: &Interval) -> bool {
    if !a.is_valid() || !b.is_valid() {
        return false;
    }
    a.start.max(b.start) <= a.end.min(b.end)
}

/// Smallest interval covering both inputs.
///
/// Only meaningful when [`touches_or_overlaps`] holds; callers check first.
pub fn union(a: &Interval, b: &Interval) -> Interval {
    Interval {
        start: a.start.min(b.start),
        end: a.end.max(b.end),
    }
}

/// The shared part of two overlapping intervals, or `None` when they don't overlap.
pub fn intersection(a: &Interval, b: &Interval) -> Option<Interval> {
    if !overlaps(a, b) {
        return None;
    }
    Some(Interval {
        start: a.start.max(b.start),
        end: a.end.min(b.end),
    })
}
