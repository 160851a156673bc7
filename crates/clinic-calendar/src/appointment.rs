//! Appointment snapshots as handed over by the scheduling application.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::availability::day_window;
use crate::interval::{overlaps, Interval, TimePoint};

/// A booked appointment. Identity is `id`; everything else may change between
/// snapshots, and the engine never keeps one across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub start: TimePoint,
    pub end: TimePoint,
    pub patient_id: String,
    pub location_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl Appointment {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }
}

/// Appointments that render on `day`, in input order.
///
/// An appointment belongs to a day when it intersects the day's UTC window.
/// Zero-duration appointments belong to the day containing their start.
pub fn appointments_on_day(day: NaiveDate, appointments: &[Appointment]) -> Vec<Appointment> {
    let window = day_window(day);
    appointments
        .iter()
        .filter(|appt| {
            let interval = appt.interval();
            if interval.is_valid() {
                overlaps(&interval, &window)
            } else {
                window.contains(appt.start)
            }
        })
        .cloned()
        .collect()
}
