//! Pointer gestures over the slot grid.
//!
//! A press on the grid starts a session in [`GestureMode::HourPreview`], which
//! shows a coarse one-hour preview. The session switches to
//! [`GestureMode::QuarterDrag`] (slot-accurate selection) either when the
//! pointer moves to another slot or when the press has been held for the
//! grid's hold delay. Releasing the pointer ends the session:
//!
//! - a quick release on the anchor slot emits [`GestureEvent::SlotClick`];
//! - anything else emits [`GestureEvent::RangeSelection`] for the covered slots.
//!
//! Time is supplied by the caller on every call. The hold delay is a single
//! [`HoldTimer`] per session which the host drives with
//! [`GestureInterpreter::tick`]. Every transition that supersedes the timer
//! cancels it, so a stale promotion can never fire.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::SlotGrid;
use crate::interval::TimePoint;

/// Selection granularity of an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureMode {
    /// Pressed, previewing the hour under the anchor slot.
    HourPreview,
    /// Fine-grained, slot-accurate range drag.
    QuarterDrag,
}

/// One pointer session, alive between pointer-down and pointer-up/cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureState {
    pub anchor_slot: usize,
    pub current_slot: usize,
    pub started_at: TimePoint,
    pub mode: GestureMode,
}

impl GestureState {
    /// Covered slots as `[lo, hi)`, regardless of drag direction.
    pub fn span(&self) -> SlotRange {
        SlotRange {
            start: self.anchor_slot.min(self.current_slot),
            end: self.anchor_slot.max(self.current_slot) + 1,
        }
    }
}

/// A run of slots `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRange {
    pub start: usize,
    pub end: usize,
}

impl SlotRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wall-clock range within the day produced by a range selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

impl TimeRange {
    fn from_minutes(start: u32, end: u32) -> Self {
        Self {
            start_hour: start / 60,
            start_minute: start % 60,
            end_hour: end / 60,
            end_minute: end % 60,
        }
    }
}

/// What a finished session means for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureEvent {
    /// A quick tap on one slot. The host opens a one-hour booking at `hour`.
    SlotClick { slot: usize, hour: u32 },
    /// A dragged or held selection with exact bounds.
    RangeSelection(TimeRange),
}

/// One-shot deferred promotion, modeled as a deadline.
///
/// `cancel` is idempotent and a cancelled timer never fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldTimer {
    deadline: Option<TimePoint>,
}

impl HoldTimer {
    pub fn arm(&mut self, deadline: TimePoint) {
        self.deadline = Some(deadline);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fire if the deadline has passed. Returns `true` at most once per arming.
    pub fn poll(&mut self, now: TimePoint) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Gesture state machine for one rendering surface (one pointer stream).
#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    grid: SlotGrid,
    session: Option<GestureState>,
    timer: HoldTimer,
}

impl GestureInterpreter {
    pub fn new(grid: SlotGrid) -> Self {
        Self {
            grid,
            session: None,
            timer: HoldTimer::default(),
        }
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// The active session, or `None` when idle.
    pub fn state(&self) -> Option<&GestureState> {
        self.session.as_ref()
    }

    pub fn mode(&self) -> Option<GestureMode> {
        self.session.map(|s| s.mode)
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    /// Slots the host should highlight right now.
    ///
    /// During the hour preview this is the whole grid hour containing the
    /// anchor; during a drag it is exactly the covered slots.
    pub fn preview(&self) -> Option<SlotRange> {
        let session = self.session?;
        match session.mode {
            GestureMode::HourPreview => {
                let per_hour = self.grid.slots_per_hour();
                let start = session.anchor_slot - session.anchor_slot % per_hour;
                Some(SlotRange {
                    start,
                    end: (start + per_hour).min(self.grid.slot_count()),
                })
            }
            GestureMode::QuarterDrag => Some(session.span()),
        }
    }

    /// Start a session anchored at `slot` and arm the hold timer.
    ///
    /// A session that is still active is discarded without emitting anything.
    pub fn pointer_down(&mut self, slot: usize, now: TimePoint) {
        if self.session.is_some() {
            debug!("pointer down superseded an active gesture session");
            self.discard();
        }
        let slot = self.grid.clamp_slot(slot);
        self.session = Some(GestureState {
            anchor_slot: slot,
            current_slot: slot,
            started_at: now,
            mode: GestureMode::HourPreview,
        });
        // A deadline past the representable range can never be reached.
        match now.checked_add_signed(self.grid.hold_delay()) {
            Some(deadline) => self.timer.arm(deadline),
            None => self.timer.cancel(),
        }
        debug!(slot, "gesture session started");
    }

    /// Track the pointer over `slot`. Leaving the anchor during the hour
    /// preview switches to a slot-accurate drag immediately.
    pub fn pointer_move(&mut self, slot: usize, now: TimePoint) {
        self.tick(now);
        let slot = self.grid.clamp_slot(slot);
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.mode == GestureMode::HourPreview && slot != session.anchor_slot {
            self.timer.cancel();
            session.mode = GestureMode::QuarterDrag;
            debug!(anchor = session.anchor_slot, slot, "gesture promoted by movement");
        }
        session.current_slot = slot;
        trace!(slot, mode = ?session.mode, "gesture moved");
    }

    /// Deliver the hold timer if it is due. Returns `true` when this call
    /// promoted the session to a drag.
    pub fn tick(&mut self, now: TimePoint) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.mode == GestureMode::HourPreview && self.timer.poll(now) {
            session.mode = GestureMode::QuarterDrag;
            debug!(anchor = session.anchor_slot, "gesture promoted by hold");
            return true;
        }
        false
    }

    /// End the session and report what it selected.
    ///
    /// Returns `None` when no session was active.
    pub fn pointer_up(&mut self, now: TimePoint) -> Option<GestureEvent> {
        self.timer.cancel();
        let session = self.session.take()?;
        let span = session.span();
        let held_for = now - session.started_at;

        let event = if span.len() <= 1 && held_for < self.grid.hold_delay() {
            GestureEvent::SlotClick {
                slot: span.start,
                hour: self.grid.boundary_minutes(span.start) / 60,
            }
        } else {
            GestureEvent::RangeSelection(self.time_range(span))
        };
        debug!(?event, "gesture session finished");
        Some(event)
    }

    /// Abandon the session without emitting anything. Safe to call when idle.
    pub fn pointer_cancel(&mut self) {
        if self.session.is_some() {
            debug!("gesture session cancelled");
        }
        self.discard();
    }

    fn discard(&mut self) {
        self.timer.cancel();
        self.session = None;
    }

    /// Wall-clock bounds of `span`, with the end clamped to the last boundary
    /// the grid can express. A grid running to midnight ends at 23:59 so the
    /// selection stays within the same day.
    fn time_range(&self, span: SlotRange) -> TimeRange {
        let last_boundary = self.grid.end_minutes().min(24 * 60 - 1);
        let start = self.grid.boundary_minutes(span.start);
        let end = self.grid.boundary_minutes(span.end).min(last_boundary);
        TimeRange::from_minutes(start, end)
    }
}

/// Independent gesture sessions for several rendered days, one per day.
#[derive(Debug, Clone)]
pub struct GestureBoard {
    grid: SlotGrid,
    surfaces: BTreeMap<NaiveDate, GestureInterpreter>,
}

impl GestureBoard {
    pub fn new(grid: SlotGrid) -> Self {
        Self {
            grid,
            surfaces: BTreeMap::new(),
        }
    }

    /// The interpreter for `day`, created on first use.
    pub fn surface(&mut self, day: NaiveDate) -> &mut GestureInterpreter {
        let grid = self.grid;
        self.surfaces
            .entry(day)
            .or_insert_with(|| GestureInterpreter::new(grid))
    }

    pub fn pointer_down(&mut self, day: NaiveDate, slot: usize, now: TimePoint) {
        self.surface(day).pointer_down(slot, now);
    }

    pub fn pointer_move(&mut self, day: NaiveDate, slot: usize, now: TimePoint) {
        if let Some(surface) = self.surfaces.get_mut(&day) {
            surface.pointer_move(slot, now);
        }
    }

    /// Finish the session on `day`. The day's interpreter is dropped once idle.
    pub fn pointer_up(&mut self, day: NaiveDate, now: TimePoint) -> Option<GestureEvent> {
        let event = self.surfaces.get_mut(&day)?.pointer_up(now);
        self.release_if_idle(day);
        event
    }

    pub fn pointer_cancel(&mut self, day: NaiveDate) {
        if let Some(surface) = self.surfaces.get_mut(&day) {
            surface.pointer_cancel();
        }
        self.release_if_idle(day);
    }

    /// Number of days currently holding an interpreter.
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    fn release_if_idle(&mut self, day: NaiveDate) {
        if self.surfaces.get(&day).is_some_and(|s| s.is_idle()) {
            self.surfaces.remove(&day);
        }
    }

    /// Deliver due hold timers on every surface. Returns the days whose
    /// session was promoted by this call.
    pub fn tick(&mut self, now: TimePoint) -> Vec<NaiveDate> {
        self.surfaces
            .iter_mut()
            .filter_map(|(day, surface)| surface.tick(now).then_some(*day))
            .collect()
    }

    /// Days with a session in progress.
    pub fn active_days(&self) -> Vec<NaiveDate> {
        self.surfaces
            .iter()
            .filter(|(_, surface)| !surface.is_idle())
            .map(|(day, _)| *day)
            .collect()
    }
}
