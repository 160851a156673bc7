//! # clinic-calendar
//!
//! Calendar availability and appointment layout engine for a clinic
//! scheduling front end.
//!
//! Everything here is a pure, synchronous computation over snapshots handed in
//! by the host: nothing is cached between calls and identical input always
//! produces identical output. The only stateful piece is the gesture
//! interpreter, which lives for one pointer session at a time.
//!
//! ## Modules
//!
//! - [`interval`] — Half-open interval overlap, union and intersection
//! - [`availability`] — Base schedule + calendar exceptions → a day's working hours
//! - [`appointment`] — Appointment snapshots and per-day filtering
//! - [`conflict`] — Appointments colliding with a candidate time range
//! - [`layout`] — Column assignment for overlapping appointments on one day
//! - [`gesture`] — Pointer-down/move/up state machine over the slot grid
//! - [`config`] — Slot grid configuration
//! - [`error`] — Error types

pub mod appointment;
pub mod availability;
pub mod config;
pub mod conflict;
pub mod error;
pub mod gesture;
pub mod interval;
pub mod layout;

pub use appointment::{appointments_on_day, Appointment};
pub use availability::{
    resolve, resolve_for_location, working_mask, CalendarException, ExceptionKind, WorkingHours,
};
pub use config::{EngineConfig, SlotGrid};
pub use conflict::{conflict_report, find_conflicts, ConflictEntry};
pub use error::CalendarError;
pub use gesture::{GestureBoard, GestureEvent, GestureInterpreter, GestureMode, TimeRange};
pub use interval::{overlaps, union, Interval, TimePoint};
pub use layout::{layout, overlap_groups, LayoutAssignment, OverlapGroup};
