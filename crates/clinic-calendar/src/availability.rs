//! Effective working hours for a calendar day.
//!
//! A day's open hours come from a base weekly schedule, then a list of
//! calendar exceptions touching that day is applied on top:
//!
//! 1. Any applicable `BLACKOUT` closes the day outright, wherever it sits in the list.
//! 2. Otherwise the remaining exceptions are folded left-to-right in the order the
//!    caller supplied them. `DAY_ADJUST` replaces the running hours, `EXTRA_OPEN`
//!    widens them (or replaces them when the running hours are closed).
//!
//! The fold is order-sensitive on purpose: a `DAY_ADJUST` listed after an
//! `EXTRA_OPEN` discards the widening. Exceptions are never re-sorted.

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::SlotGrid;
use crate::interval::{overlaps, Interval, TimePoint};

/// Open hours for a day, as fractional hours since midnight (`8.5` = 08:30).
///
/// `start >= end` is a valid value meaning "closed all day". It is distinct
/// from a resolved `None`, which means the day is blacked out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start: f64,
    pub end: f64,
}

impl WorkingHours {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// A base schedule entry for a day the clinic does not open.
    pub fn closed() -> Self {
        Self { start: 0.0, end: 0.0 }
    }

    pub fn is_closed(&self) -> bool {
        self.start >= self.end
    }

    /// `true` when `hour` lies in `[start, end)`.
    pub fn contains_hour(&self, hour: f64) -> bool {
        !self.is_closed() && self.start <= hour && hour < self.end
    }
}

/// The kind of override a calendar exception applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionKind {
    /// Closed for the whole day, overriding everything else.
    Blackout,
    /// Additional opening hours on top of the running schedule.
    ExtraOpen,
    /// Replacement opening hours for the day.
    DayAdjust,
}

/// An ad-hoc override to the base schedule.
///
/// Owned by the persistence layer; the resolver only reads snapshots of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarException {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ExceptionKind,
    pub date_start: TimePoint,
    pub date_end: TimePoint,
    /// Restricts the exception to one location. `None` applies everywhere.
    #[serde(default)]
    pub location_id: Option<String>,
    /// Stored recurrence rule. Carried through untouched, never expanded here.
    #[serde(default)]
    pub recurrence: Option<String>,
    pub created_at: TimePoint,
}

impl CalendarException {
    pub fn interval(&self) -> Interval {
        Interval::new(self.date_start, self.date_end)
    }

    /// The exception's own hour range, taken from the UTC time-of-day of its bounds.
    pub fn hours(&self) -> WorkingHours {
        WorkingHours {
            start: hour_of_day(self.date_start),
            end: hour_of_day(self.date_end),
        }
    }

    /// `true` when the exception intersects the UTC window of `day`.
    pub fn applies_to(&self, day: NaiveDate) -> bool {
        overlaps(&self.interval(), &day_window(day))
    }

    fn applies_to_location(&self, location_id: &str) -> bool {
        match &self.location_id {
            None => true,
            Some(scoped) => scoped == location_id,
        }
    }
}

/// The UTC window `[00:00, 24:00)` of `day`.
pub fn day_window(day: NaiveDate) -> Interval {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    Interval::new(start, start + Duration::days(1))
}

/// UTC hour plus minutes as a fraction. No timezone conversion is applied.
pub fn hour_of_day(t: TimePoint) -> f64 {
    t.hour() as f64 + t.minute() as f64 / 60.0
}

/// Resolve the effective working hours of `day`.
///
/// Returns `None` when an applicable `BLACKOUT` closes the day. Otherwise the
/// applicable exceptions are folded onto `base` in the given order. An empty
/// exception list returns `base` unchanged.
pub fn resolve(
    day: NaiveDate,
    base: WorkingHours,
    exceptions: &[CalendarException],
) -> Option<WorkingHours> {
    let applicable: Vec<&CalendarException> =
        exceptions.iter().filter(|ex| ex.applies_to(day)).collect();
    fold_exceptions(day, base, &applicable)
}

/// Like [`resolve`], restricted to exceptions that are unscoped or scoped to
/// `location_id`.
pub fn resolve_for_location(
    day: NaiveDate,
    base: WorkingHours,
    exceptions: &[CalendarException],
    location_id: &str,
) -> Option<WorkingHours> {
    let applicable: Vec<&CalendarException> = exceptions
        .iter()
        .filter(|ex| ex.applies_to_location(location_id) && ex.applies_to(day))
        .collect();
    fold_exceptions(day, base, &applicable)
}

fn fold_exceptions(
    day: NaiveDate,
    base: WorkingHours,
    applicable: &[&CalendarException],
) -> Option<WorkingHours> {
    if let Some(blackout) = applicable
        .iter()
        .find(|ex| ex.kind == ExceptionKind::Blackout)
    {
        debug!(%day, exception = %blackout.id, "day closed by blackout");
        return None;
    }

    let resolved = applicable.iter().fold(base, |result, ex| {
        let ex_hours = ex.hours();
        let next = match ex.kind {
            ExceptionKind::DayAdjust => ex_hours,
            ExceptionKind::ExtraOpen if result.is_closed() => ex_hours,
            ExceptionKind::ExtraOpen => WorkingHours {
                start: result.start.min(ex_hours.start),
                end: result.end.max(ex_hours.end),
            },
            // Filtered out above.
            ExceptionKind::Blackout => result,
        };
        trace!(%day, exception = %ex.id, kind = ?ex.kind, ?next, "applied exception");
        next
    });

    debug!(%day, applied = applicable.len(), ?resolved, "resolved working hours");
    Some(resolved)
}

/// `true` when `slot` of `grid` renders as working time under `hours`.
///
/// A slot is working only when the whole slot lies inside the open hours, so
/// a slot the clinic closes partway through renders as non-working. A
/// blacked-out day (`None`) or a closed-all-day value has no working slots.
pub fn slot_is_working(grid: &SlotGrid, slot: usize, hours: Option<WorkingHours>) -> bool {
    match hours {
        Some(hours) => {
            let (slot_start, slot_end) = grid.slot_hours(slot);
            !hours.is_closed() && hours.start <= slot_start && slot_end <= hours.end
        }
        None => false,
    }
}

/// Working/non-working flag for every slot of `grid`, top to bottom.
pub fn working_mask(grid: &SlotGrid, hours: Option<WorkingHours>) -> Vec<bool> {
    (0..grid.slot_count())
        .map(|slot| slot_is_working(grid, slot, hours))
        .collect()
}
