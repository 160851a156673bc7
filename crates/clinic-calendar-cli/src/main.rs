//! `clinic-cal` CLI — run the calendar engine over JSON snapshots.
//!
//! ## Usage
//!
//! ```sh
//! # Working hours for a day, base schedule 08:00-17:00
//! clinic-cal resolve --day 2026-03-16 --open 8 --close 17 -i exceptions.json
//!
//! # Appointments colliding with a candidate, ignoring the one being edited
//! clinic-cal conflicts --start 2026-03-16T09:30:00Z --end 2026-03-16T10:30:00Z \
//!   --exclude appt-7 -i appointments.json
//!
//! # Column layout for one day
//! clinic-cal layout --day 2026-03-16 -i appointments.json
//!
//! # Replay a pointer script against a custom grid
//! clinic-cal --config grid.toml gesture -i pointer.json
//! ```
//!
//! Input is read from stdin when `-i` is omitted. Set `RUST_LOG=debug` to see
//! the engine's decisions on stderr.

use std::collections::BTreeMap;
use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use clinic_calendar::{
    Appointment, CalendarException, EngineConfig, GestureEvent, GestureInterpreter, Interval,
    LayoutAssignment, WorkingHours,
};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(
    name = "clinic-cal",
    version,
    about = "Clinic calendar availability and layout engine CLI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML engine configuration (grid hours, slot size, hold delay)
    #[arg(long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a day's working hours from a base schedule and exceptions
    Resolve {
        /// Day to resolve (YYYY-MM-DD)
        #[arg(long)]
        day: String,
        /// Base opening hour, fractional (e.g. 8.5 for 08:30)
        #[arg(long)]
        open: f64,
        /// Base closing hour, fractional
        #[arg(long)]
        close: f64,
        /// JSON array of calendar exceptions (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Only apply exceptions that are unscoped or scoped to this location
        #[arg(long)]
        location: Option<String>,
    },
    /// List appointments that collide with a candidate time range
    Conflicts {
        /// Candidate start (ISO 8601)
        #[arg(long)]
        start: String,
        /// Candidate end (ISO 8601)
        #[arg(long)]
        end: String,
        /// Appointment id to ignore (the one being edited)
        #[arg(long)]
        exclude: Option<String>,
        /// JSON array of appointments (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Assign render columns to overlapping appointments
    Layout {
        /// JSON array of appointments (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Only lay out appointments on this day (YYYY-MM-DD)
        #[arg(long)]
        day: Option<String>,
    },
    /// Replay a pointer event script and print the emitted gesture events
    Gesture {
        /// JSON array of pointer steps (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

/// One step of a pointer replay script. `at_ms` is relative to the start of
/// the script.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum PointerStep {
    Down { slot: usize, at_ms: i64 },
    Move { slot: usize, at_ms: i64 },
    Up { at_ms: i64 },
    Tick { at_ms: i64 },
    Cancel,
}

fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Resolve {
            day,
            open,
            close,
            input,
            location,
        } => {
            let day = parse_day(&day)?;
            let exceptions: Vec<CalendarException> = serde_json::from_str(&read_input(input.as_deref())?)
                .context("Failed to parse exceptions JSON")?;
            let base = WorkingHours::new(open, close);

            let resolved = match location.as_deref() {
                Some(location) => {
                    clinic_calendar::resolve_for_location(day, base, &exceptions, location)
                }
                None => clinic_calendar::resolve(day, base, &exceptions),
            };
            match resolved {
                Some(hours) => println!("{}", serde_json::to_string(&hours)?),
                None => println!("CLOSED"),
            }
        }
        Commands::Conflicts {
            start,
            end,
            exclude,
            input,
        } => {
            let candidate = Interval::new(parse_datetime(&start)?, parse_datetime(&end)?);
            let appointments = read_appointments(input.as_deref())?;
            let report = clinic_calendar::conflict_report(&candidate, &appointments, exclude.as_deref());
            info!(conflicts = report.len(), "checked candidate");
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Layout { input, day } => {
            let mut appointments = read_appointments(input.as_deref())?;
            if let Some(day) = day.as_deref() {
                appointments = clinic_calendar::appointments_on_day(parse_day(day)?, &appointments);
            }
            // Sorted by id so output is stable across runs.
            let assignments: BTreeMap<String, LayoutAssignment> =
                clinic_calendar::layout(&appointments).into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&assignments)?);
        }
        Commands::Gesture { input } => {
            let steps: Vec<PointerStep> = serde_json::from_str(&read_input(input.as_deref())?)
                .context("Failed to parse pointer script JSON")?;
            let events = replay(&mut GestureInterpreter::new(config.grid), &steps)?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
    }

    Ok(())
}

/// Feed a pointer script through the interpreter, collecting emitted events.
fn replay(gesture: &mut GestureInterpreter, steps: &[PointerStep]) -> Result<Vec<GestureEvent>> {
    let mut events = Vec::new();
    for step in steps {
        match *step {
            PointerStep::Down { slot, at_ms } => gesture.pointer_down(slot, script_time(at_ms)?),
            PointerStep::Move { slot, at_ms } => gesture.pointer_move(slot, script_time(at_ms)?),
            PointerStep::Tick { at_ms } => {
                gesture.tick(script_time(at_ms)?);
            }
            PointerStep::Up { at_ms } => events.extend(gesture.pointer_up(script_time(at_ms)?)),
            PointerStep::Cancel => gesture.pointer_cancel(),
        }
    }
    Ok(events)
}

/// Instant `at_ms` milliseconds after the Unix epoch.
fn script_time(at_ms: i64) -> Result<DateTime<Utc>> {
    Duration::try_milliseconds(at_ms)
        .and_then(|offset| DateTime::<Utc>::UNIX_EPOCH.checked_add_signed(offset))
        .with_context(|| format!("Pointer step time out of range: at_ms = {}", at_ms))
}

fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid date: {}", s))
}

/// Accepts RFC 3339 or a naive `YYYY-MM-DDTHH:MM:SS` interpreted as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .with_context(|| format!("Invalid datetime: {}", s))
}

fn read_appointments(path: Option<&str>) -> Result<Vec<Appointment>> {
    serde_json::from_str(&read_input(path)?).context("Failed to parse appointments JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
