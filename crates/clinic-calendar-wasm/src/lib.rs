//! WASM bindings for clinic-calendar.
//!
//! Exposes working-hours resolution, conflict detection, overlap layout and
//! the pointer gesture state machine to the browser calendar via
//! `wasm-bindgen`. Collections cross the boundary as JSON strings; timestamps
//! inside them are RFC 3339, gesture timestamps are epoch milliseconds
//! (`Date.now()`).
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p clinic-calendar-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir web/src/wasm/ \
//!   target/wasm32-unknown-unknown/release/clinic_calendar_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clinic_calendar::{
    Appointment, CalendarException, GestureInterpreter, Interval, SlotGrid, WorkingHours,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 (with offset) and naive `YYYY-MM-DDTHH:MM:SS`, which is
/// interpreted as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, JsValue> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| JsValue::from_str(&format!("Invalid datetime '{}': {}", s, e)))
}

fn parse_day(s: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", s, e)))
}

fn parse_millis(ms: f64) -> Result<DateTime<Utc>, JsValue> {
    DateTime::from_timestamp_millis(ms as i64)
        .ok_or_else(|| JsValue::from_str(&format!("Timestamp out of range: {}", ms)))
}

fn parse_json<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> Result<T, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("Invalid {} JSON: {}", what, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// Pure functions
// ---------------------------------------------------------------------------

/// Resolve a day's working hours.
///
/// `exceptions_json` is a JSON array of calendar exceptions. When
/// `location_id` is given, exceptions scoped to other locations are ignored.
/// Returns `{"start": h, "end": h}` as JSON, or `null` when the day is
/// blacked out.
#[wasm_bindgen(js_name = "resolveDay")]
pub fn resolve_day(
    day: &str,
    base_start: f64,
    base_end: f64,
    exceptions_json: &str,
    location_id: Option<String>,
) -> Result<String, JsValue> {
    let day = parse_day(day)?;
    let exceptions: Vec<CalendarException> = parse_json(exceptions_json, "exceptions")?;
    let base = WorkingHours::new(base_start, base_end);

    let resolved = match location_id.as_deref() {
        Some(location) => {
            clinic_calendar::resolve_for_location(day, base, &exceptions, location)
        }
        None => clinic_calendar::resolve(day, base, &exceptions),
    };
    to_json(&resolved)
}

/// Existing appointments colliding with a candidate range.
///
/// Returns a JSON array of `{appointment_id, overlap_minutes}` in input order.
#[wasm_bindgen(js_name = "findConflicts")]
pub fn find_conflicts(
    candidate_start: &str,
    candidate_end: &str,
    appointments_json: &str,
    exclude_id: Option<String>,
) -> Result<String, JsValue> {
    let candidate = Interval::new(parse_datetime(candidate_start)?, parse_datetime(candidate_end)?);
    let appointments: Vec<Appointment> = parse_json(appointments_json, "appointments")?;

    let report = clinic_calendar::conflict_report(&candidate, &appointments, exclude_id.as_deref());
    to_json(&report)
}

/// Column layout for one day's appointments.
///
/// When `day` is given the appointments are first filtered to that day.
/// Returns a JSON object mapping appointment id to `{column, total_columns}`.
#[wasm_bindgen(js_name = "layoutDay")]
pub fn layout_day(appointments_json: &str, day: Option<String>) -> Result<String, JsValue> {
    let mut appointments: Vec<Appointment> = parse_json(appointments_json, "appointments")?;
    if let Some(day) = day.as_deref() {
        appointments = clinic_calendar::appointments_on_day(parse_day(day)?, &appointments);
    }
    to_json(&clinic_calendar::layout(&appointments))
}

// ---------------------------------------------------------------------------
// Gesture session
// ---------------------------------------------------------------------------

/// Pointer gesture state machine for one rendered day column.
#[wasm_bindgen]
pub struct GestureSession {
    inner: GestureInterpreter,
}

#[wasm_bindgen]
impl GestureSession {
    #[wasm_bindgen(constructor)]
    pub fn new(
        start_hour: u32,
        end_hour: u32,
        slot_minutes: u32,
        hold_delay_ms: u32,
    ) -> Result<GestureSession, JsValue> {
        let grid = SlotGrid::new(start_hour, end_hour, slot_minutes, hold_delay_ms as i64)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(GestureSession {
            inner: GestureInterpreter::new(grid),
        })
    }

    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(&mut self, slot: u32, now_ms: f64) -> Result<(), JsValue> {
        self.inner.pointer_down(slot as usize, parse_millis(now_ms)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, slot: u32, now_ms: f64) -> Result<(), JsValue> {
        self.inner.pointer_move(slot as usize, parse_millis(now_ms)?);
        Ok(())
    }

    /// Finish the session. Returns the emitted event as JSON, or `undefined`
    /// when no session was active.
    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(&mut self, now_ms: f64) -> Result<Option<String>, JsValue> {
        match self.inner.pointer_up(parse_millis(now_ms)?) {
            Some(event) => to_json(&event).map(Some),
            None => Ok(None),
        }
    }

    #[wasm_bindgen(js_name = "pointerCancel")]
    pub fn pointer_cancel(&mut self) {
        self.inner.pointer_cancel();
    }

    /// Deliver the hold timer. Call from a `setTimeout` armed on pointer-down;
    /// returns `true` when the session switched to a fine-grained drag.
    pub fn tick(&mut self, now_ms: f64) -> Result<bool, JsValue> {
        Ok(self.inner.tick(parse_millis(now_ms)?))
    }

    /// Current mode as `"HOUR_PREVIEW"` / `"QUARTER_DRAG"`, or `undefined` when idle.
    pub fn mode(&self) -> Result<Option<String>, JsValue> {
        match self.inner.mode() {
            Some(mode) => serde_json::to_value(mode)
                .map(|v| v.as_str().map(str::to_string))
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e))),
            None => Ok(None),
        }
    }

    /// Slots to highlight as `{start, end}` JSON, or `undefined` when idle.
    pub fn preview(&self) -> Result<Option<String>, JsValue> {
        self.inner.preview().map(|range| to_json(&range)).transpose()
    }
}
