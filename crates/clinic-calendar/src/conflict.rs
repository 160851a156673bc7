//! Detect appointments that collide with a candidate time range.
//!
//! Used reactively while an appointment is being created or edited, so the
//! host can warn before committing. Adjacent appointments (one ends exactly
//! when the other starts) are NOT conflicts.

use serde::{Deserialize, Serialize};

use crate::appointment::Appointment;
use crate::interval::{intersection, overlaps, Interval};

/// One existing appointment that collides with a candidate, with the size of
/// the collision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictEntry {
    pub appointment_id: String,
    pub overlap_minutes: i64,
}

/// Existing appointments whose interval overlaps `candidate`.
///
/// The appointment whose id equals `exclude_id` is skipped, which lets the
/// caller check an appointment being edited against the others without it
/// conflicting with its own stored copy. Results keep the input order.
pub fn find_conflicts<'a>(
    candidate: &Interval,
    existing: &'a [Appointment],
    exclude_id: Option<&str>,
) -> Vec<&'a Appointment> {
    existing
        .iter()
        .filter(|appt| exclude_id != Some(appt.id.as_str()))
        .filter(|appt| overlaps(candidate, &appt.interval()))
        .collect()
}

/// Like [`find_conflicts`], reporting the id and overlap duration of each hit.
///
/// The overlap is `min(a.end, b.end) - max(a.start, b.start)` in whole minutes.
pub fn conflict_report(
    candidate: &Interval,
    existing: &[Appointment],
    exclude_id: Option<&str>,
) -> Vec<ConflictEntry> {
    find_conflicts(candidate, existing, exclude_id)
        .into_iter()
        .map(|appt| ConflictEntry {
            appointment_id: appt.id.clone(),
            overlap_minutes: intersection(candidate, &appt.interval())
                .map(|shared| shared.duration_minutes())
                .unwrap_or(0),
        })
        .collect()
}
