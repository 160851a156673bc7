//! Side-by-side layout of overlapping appointments on one day.
//!
//! Appointments are sorted by start (stable, so ties keep input order) and cut
//! into overlap groups: maximal runs connected by direct or transitive overlap.
//! Inside a group each appointment goes into the first column whose previous
//! occupant has already ended, opening a new column when none has. Every
//! member of a group shares the group's column count, so renderers can split
//! the day's width evenly and flag groups with more than one column as
//! double-booked.
//!
//! Appointments in different groups are never compared. Appointments that end
//! at or before their start overlap nothing: each is laid out alone in column 0.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::appointment::Appointment;
use crate::interval::TimePoint;

/// Where one appointment renders within its overlap group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutAssignment {
    /// Zero-based column within the group.
    pub column: usize,
    /// Number of columns the group needed. Always at least 1.
    pub total_columns: usize,
}

impl LayoutAssignment {
    /// `true` when the appointment shares its time with at least one other.
    pub fn has_collision(&self) -> bool {
        self.total_columns > 1
    }
}

/// One connected run of overlapping appointments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapGroup {
    /// Member ids in placement order (start time, then input order).
    pub appointment_ids: Vec<String>,
    pub total_columns: usize,
}

struct PackedGroup<'a> {
    members: Vec<(&'a Appointment, usize)>,
    total_columns: usize,
}

/// Assign a column and column count to every appointment.
///
/// `appointments` should already be filtered to a single rendering day (see
/// [`crate::appointment::appointments_on_day`]). An empty input yields an empty
/// map. If ids repeat, the later placement wins.
pub fn layout(appointments: &[Appointment]) -> HashMap<String, LayoutAssignment> {
    let groups = pack(appointments);
    let mut assignments = HashMap::with_capacity(appointments.len());
    for group in groups {
        for (appt, column) in group.members {
            assignments.insert(
                appt.id.clone(),
                LayoutAssignment {
                    column,
                    total_columns: group.total_columns,
                },
            );
        }
    }
    assignments
}

/// The overlap groups [`layout`] works with, in start-time order.
pub fn overlap_groups(appointments: &[Appointment]) -> Vec<OverlapGroup> {
    pack(appointments)
        .into_iter()
        .map(|group| OverlapGroup {
            appointment_ids: group
                .members
                .iter()
                .map(|(appt, _)| appt.id.clone())
                .collect(),
            total_columns: group.total_columns,
        })
        .collect()
}

fn pack(appointments: &[Appointment]) -> Vec<PackedGroup<'_>> {
    let mut sorted: Vec<&Appointment> = appointments.iter().collect();
    // `sort_by_key` is stable, so equal starts keep their input order.
    sorted.sort_by_key(|appt| appt.start);

    // Group pass. Zero-length appointments overlap nothing, so each becomes a
    // group of its own without closing the run it sits in.
    let mut groups: Vec<Vec<&Appointment>> = Vec::new();
    let mut current: Option<usize> = None;
    let mut group_end: Option<TimePoint> = None;
    for appt in sorted {
        if !appt.interval().is_valid() {
            groups.push(vec![appt]);
            continue;
        }
        match (current, group_end) {
            (Some(index), Some(end)) if appt.start < end => {
                groups[index].push(appt);
                group_end = Some(end.max(appt.end));
            }
            _ => {
                groups.push(vec![appt]);
                current = Some(groups.len() - 1);
                group_end = Some(appt.end);
            }
        }
    }

    // Column pass, independently per group.
    let packed: Vec<PackedGroup<'_>> = groups.into_iter().map(pack_columns).collect();

    debug!(
        appointments = appointments.len(),
        groups = packed.len(),
        max_columns = packed.iter().map(|g| g.total_columns).max().unwrap_or(0),
        "laid out appointments"
    );
    packed
}

fn pack_columns(group: Vec<&Appointment>) -> PackedGroup<'_> {
    // Last end time placed in each column.
    let mut column_ends: Vec<TimePoint> = Vec::new();
    let mut members = Vec::with_capacity(group.len());

    for appt in group {
        let column = match column_ends.iter().position(|end| *end <= appt.start) {
            Some(free) => {
                column_ends[free] = appt.end.max(appt.start);
                free
            }
            None => {
                column_ends.push(appt.end.max(appt.start));
                column_ends.len() - 1
            }
        };
        members.push((appt, column));
    }

    PackedGroup {
        members,
        total_columns: column_ends.len().max(1),
    }
}
