//! Tests for the pointer gesture state machine.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use clinic_calendar::config::SlotGrid;
use clinic_calendar::gesture::{
    GestureBoard, GestureEvent, GestureInterpreter, GestureMode, HoldTimer, SlotRange, TimeRange,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

/// Milliseconds after a fixed pointer-down instant.
fn ms(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap() + Duration::milliseconds(offset)
}

fn default_interpreter() -> GestureInterpreter {
    GestureInterpreter::new(SlotGrid::default())
}

fn range(start_hour: u32, start_minute: u32, end_hour: u32, end_minute: u32) -> GestureEvent {
    GestureEvent::RangeSelection(TimeRange {
        start_hour,
        start_minute,
        end_hour,
        end_minute,
    })
}

// ── Slot clicks ─────────────────────────────────────────────────────────────

#[test]
fn quick_tap_emits_slot_click() {
    let mut gesture = default_interpreter();
    gesture.pointer_down(36, ms(0));
    assert_eq!(gesture.mode(), Some(GestureMode::HourPreview));

    let event = gesture.pointer_up(ms(120));
    assert_eq!(event, Some(GestureEvent::SlotClick { slot: 36, hour: 9 }));
    assert!(gesture.is_idle());
}

#[test]
fn slot_click_reports_the_containing_hour() {
    let mut gesture = default_interpreter();
    gesture.pointer_down(39, ms(0)); // 09:45
    assert_eq!(
        gesture.pointer_up(ms(50)),
        Some(GestureEvent::SlotClick { slot: 39, hour: 9 })
    );
}

#[test]
fn returning_to_anchor_before_delay_is_still_a_click() {
    let mut gesture = default_interpreter();
    gesture.pointer_down(36, ms(0));
    gesture.pointer_move(37, ms(50));
    assert_eq!(gesture.mode(), Some(GestureMode::QuarterDrag));
    gesture.pointer_move(36, ms(100));

    assert_eq!(
        gesture.pointer_up(ms(150)),
        Some(GestureEvent::SlotClick { slot: 36, hour: 9 })
    );
}

// ── Hold promotion ──────────────────────────────────────────────────────────

#[test]
fn hold_timer_promotes_to_quarter_drag() {
    let mut gesture = default_interpreter();
    gesture.pointer_down(36, ms(0));

    assert!(!gesture.tick(ms(299)));
    assert_eq!(gesture.mode(), Some(GestureMode::HourPreview));
    assert!(gesture.tick(ms(300)));
    assert_eq!(gesture.mode(), Some(GestureMode::QuarterDrag));
    // A fired timer never fires again.
    assert!(!gesture.tick(ms(900)));

    assert_eq!(gesture.pointer_up(ms(400)), Some(range(9, 0, 9, 15)));
}

#[test]
fn long_press_without_tick_selects_single_slot_range() {
    let mut gesture = default_interpreter();
    gesture.pointer_down(36, ms(0));
    assert_eq!(gesture.pointer_up(ms(500)), Some(range(9, 0, 9, 15)));
}

#[test]
fn move_after_hold_extends_the_drag() {
    let mut gesture = default_interpreter();
    gesture.pointer_down(36, ms(0));
    gesture.pointer_move(38, ms(450));
    assert_eq!(gesture.mode(), Some(GestureMode::QuarterDrag));
    assert_eq!(gesture.pointer_up(ms(600)), Some(range(9, 0, 9, 45)));
}

// ── Range selection ─────────────────────────────────────────────────────────

#[test]
fn moving_off_anchor_promotes_immediately() {
    let mut gesture = default_interpreter();
    gesture.pointer_down(36, ms(0));
    gesture.pointer_move(39, ms(80));

    assert_eq!(gesture.mode(), Some(GestureMode::QuarterDrag));
    // The hold timer was cancelled by the move.
    assert!(!gesture.tick(ms(1_000)));

    // Anchor 09:00 through slot 09:45 inclusive.
    assert_eq!(gesture.pointer_up(ms(150)), Some(range(9, 0, 10, 0)));
}

#[test]
fn upward_drag_covers_slots_between_release_and_anchor() {
    let mut gesture = default_interpreter();
    gesture.pointer_down(40, ms(0)); // 10:00
    gesture.pointer_move(38, ms(40));
    gesture.pointer_move(37, ms(80)); // 09:15

    assert_eq!(gesture.pointer_up(ms(120)), Some(range(9, 15, 10, 15)));
}

#[test]
fn selection_end_is_clamped_to_last_boundary_of_day() {
    let mut gesture = default_interpreter();
    gesture.pointer_down(94, ms(0)); // 23:30
    gesture.pointer_move(500, ms(40)); // beyond the grid, clamped to slot 95

    assert_eq!(gesture.state().unwrap().current_slot, 95);
    assert_eq!(gesture.pointer_up(ms(100)), Some(range(23, 30, 23, 59)));
}

#[test]
fn custom_grid_granularity_and_offset() {
    // 08:00-18:00 in 30-minute slots, 500 ms hold.
    let grid = SlotGrid::new(8, 18, 30, 500).unwrap();
    let mut gesture = GestureInterpreter::new(grid);

    gesture.pointer_down(2, ms(0)); // 09:00
    assert!(!gesture.tick(ms(400)));
    gesture.pointer_move(4, ms(450)); // 10:00
    assert_eq!(gesture.pointer_up(ms(480)), Some(range(9, 0, 10, 30)));

    gesture.pointer_down(19, ms(1_000)); // 17:30, last slot
    assert!(gesture.tick(ms(1_500)));
    assert_eq!(gesture.pointer_up(ms(1_600)), Some(range(17, 30, 18, 0)));
}

// ── Preview ─────────────────────────────────────────────────────────────────

#[test]
fn preview_follows_mode() {
    let mut gesture = default_interpreter();
    assert_eq!(gesture.preview(), None);

    gesture.pointer_down(38, ms(0));
    assert_eq!(gesture.preview(), Some(SlotRange { start: 36, end: 40 }));

    gesture.pointer_move(41, ms(30));
    assert_eq!(gesture.preview(), Some(SlotRange { start: 38, end: 42 }));
}

// ── Cancellation and supersession ───────────────────────────────────────────

#[test]
fn cancel_discards_session_without_event() {
    let mut gesture = default_interpreter();
    gesture.pointer_down(36, ms(0));
    gesture.pointer_move(40, ms(50));
    gesture.pointer_cancel();

    assert!(gesture.is_idle());
    assert!(!gesture.tick(ms(1_000)));
    assert_eq!(gesture.pointer_up(ms(1_100)), None);
}

#[test]
fn cancel_is_idempotent() {
    let mut gesture = default_interpreter();
    gesture.pointer_cancel();
    gesture.pointer_down(36, ms(0));
    gesture.pointer_cancel();
    gesture.pointer_cancel();
    assert!(gesture.is_idle());
}

#[test]
fn new_pointer_down_supersedes_active_session() {
    let mut gesture = default_interpreter();
    gesture.pointer_down(10, ms(0));
    gesture.pointer_down(48, ms(100));

    // The first session's timer (due at 300 ms) must not fire; the new one is
    // due at 400 ms.
    assert!(!gesture.tick(ms(350)));
    assert_eq!(gesture.state().unwrap().anchor_slot, 48);

    assert_eq!(
        gesture.pointer_up(ms(200)),
        Some(GestureEvent::SlotClick { slot: 48, hour: 12 })
    );
}

#[test]
fn events_without_session_are_ignored() {
    let mut gesture = default_interpreter();
    gesture.pointer_move(12, ms(0));
    assert!(!gesture.tick(ms(500)));
    assert!(gesture.is_idle());
    assert_eq!(gesture.pointer_up(ms(600)), None);
}

#[test]
fn pointer_down_at_end_of_time_does_not_overflow() {
    // The hold deadline lies past the last representable instant, so the
    // timer is never armed and the press can only end as a click.
    let end_of_time = DateTime::<Utc>::MAX_UTC;
    let mut gesture = default_interpreter();
    gesture.pointer_down(4, end_of_time);

    assert_eq!(gesture.mode(), Some(GestureMode::HourPreview));
    assert!(!gesture.tick(end_of_time));
    assert_eq!(
        gesture.pointer_up(end_of_time),
        Some(GestureEvent::SlotClick { slot: 4, hour: 1 })
    );
}

#[test]
fn longest_allowed_hold_delay_arms_normally() {
    let grid = SlotGrid::new(0, 24, 15, 24 * 60 * 60 * 1000).unwrap();
    let mut gesture = GestureInterpreter::new(grid);
    gesture.pointer_down(4, ms(0));

    assert!(!gesture.tick(ms(1_000)));
    assert!(gesture.tick(ms(24 * 60 * 60 * 1000)));
}

// ── Hold timer ──────────────────────────────────────────────────────────────

#[test]
fn hold_timer_fires_once_and_never_after_cancel() {
    let mut timer = HoldTimer::default();
    assert!(!timer.poll(ms(0)));

    timer.arm(ms(300));
    assert!(timer.is_armed());
    assert!(!timer.poll(ms(100)));
    assert!(timer.poll(ms(300)));
    assert!(!timer.poll(ms(400)));

    timer.arm(ms(600));
    timer.cancel();
    timer.cancel();
    assert!(!timer.is_armed());
    assert!(!timer.poll(ms(700)));
}

// ── Multiple days ───────────────────────────────────────────────────────────

#[test]
fn board_keeps_days_independent() {
    let monday = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
    let tuesday = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
    let mut board = GestureBoard::new(SlotGrid::default());

    board.pointer_down(monday, 36, ms(0));
    board.pointer_down(tuesday, 40, ms(10));

    assert_eq!(
        board.pointer_up(monday, ms(100)),
        Some(GestureEvent::SlotClick { slot: 36, hour: 9 })
    );
    assert_eq!(board.active_days(), vec![tuesday]);

    assert_eq!(board.tick(ms(400)), vec![tuesday]);
    assert_eq!(board.pointer_up(tuesday, ms(450)), Some(range(10, 0, 10, 15)));
    assert!(board.active_days().is_empty());
}

#[test]
fn board_drops_days_once_their_session_ends() {
    let mut board = GestureBoard::new(SlotGrid::default());
    for offset in 0..30 {
        let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap() + Duration::days(offset);
        board.pointer_down(day, 36, ms(0));
        board.pointer_up(day, ms(100));
    }
    assert!(board.is_empty());

    let day = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
    board.pointer_down(day, 36, ms(0));
    assert_eq!(board.len(), 1);
    board.pointer_cancel(day);
    assert!(board.is_empty());
}

#[test]
fn board_ignores_days_without_a_session() {
    let day = NaiveDate::from_ymd_opt(2026, 3, 18).unwrap();
    let mut board = GestureBoard::new(SlotGrid::default());
    board.pointer_move(day, 3, ms(0));
    board.pointer_cancel(day);
    assert_eq!(board.pointer_up(day, ms(10)), None);
}

// ── Serialization ───────────────────────────────────────────────────────────

#[test]
fn events_serialize_with_kind_tag() {
    let click = serde_json::to_value(GestureEvent::SlotClick { slot: 36, hour: 9 }).unwrap();
    assert_eq!(
        click,
        serde_json::json!({"kind": "slot_click", "slot": 36, "hour": 9})
    );

    let selection = serde_json::to_value(range(9, 0, 10, 30)).unwrap();
    assert_eq!(
        selection,
        serde_json::json!({
            "kind": "range_selection",
            "start_hour": 9,
            "start_minute": 0,
            "end_hour": 10,
            "end_minute": 30
        })
    );
}
