//! Engine configuration: the quantized time grid the gesture interpreter and
//! working-hours row gating operate on.
//!
//! Configuration is plain serde data. Hosts either build it in code with
//! [`SlotGrid::new`] or load an [`EngineConfig`] from TOML:
//!
//! ```toml
//! [grid]
//! start_hour = 7
//! end_hour = 20
//! slot_minutes = 15
//! hold_delay_ms = 300
//! ```

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, Result};

/// Default slot granularity of the reference grid, in minutes.
pub const DEFAULT_SLOT_MINUTES: u32 = 15;

/// Default hold delay before a press turns into a fine-grained drag, in milliseconds.
pub const DEFAULT_HOLD_DELAY_MS: i64 = 300;

/// Longest accepted hold delay: one day, in milliseconds.
pub const MAX_HOLD_DELAY_MS: i64 = 24 * 60 * 60 * 1000;

/// A day grid quantized into fixed-size slots.
///
/// Slot `0` starts at `start_hour:00`; the last slot ends at `end_hour:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotGrid {
    /// First hour shown on the grid (0..24).
    pub start_hour: u32,
    /// Hour at which the grid ends, exclusive (1..=24).
    pub end_hour: u32,
    /// Minutes per slot. Must divide an hour evenly.
    pub slot_minutes: u32,
    /// How long a press must be held before it becomes a fine-grained drag.
    pub hold_delay_ms: i64,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self {
            start_hour: 0,
            end_hour: 24,
            slot_minutes: DEFAULT_SLOT_MINUTES,
            hold_delay_ms: DEFAULT_HOLD_DELAY_MS,
        }
    }
}

impl SlotGrid {
    /// Build a validated grid.
    ///
    /// # Errors
    /// Returns `CalendarError::InvalidConfig` when the hours are out of order or
    /// out of range, the slot size does not divide an hour, or the hold delay is
    /// negative or longer than a day.
    pub fn new(start_hour: u32, end_hour: u32, slot_minutes: u32, hold_delay_ms: i64) -> Result<Self> {
        let grid = Self {
            start_hour,
            end_hour,
            slot_minutes,
            hold_delay_ms,
        };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> Result<()> {
        if self.slot_minutes == 0 || self.slot_minutes > 60 || 60 % self.slot_minutes != 0 {
            return Err(CalendarError::InvalidConfig(format!(
                "slot_minutes must evenly divide 60, got {}",
                self.slot_minutes
            )));
        }
        if self.end_hour > 24 || self.start_hour >= self.end_hour {
            return Err(CalendarError::InvalidConfig(format!(
                "grid hours must satisfy start_hour < end_hour <= 24, got {}..{}",
                self.start_hour, self.end_hour
            )));
        }
        if !(0..=MAX_HOLD_DELAY_MS).contains(&self.hold_delay_ms) {
            return Err(CalendarError::InvalidConfig(format!(
                "hold_delay_ms must be within 0..={}, got {}",
                MAX_HOLD_DELAY_MS, self.hold_delay_ms
            )));
        }
        Ok(())
    }

    pub fn slots_per_hour(&self) -> usize {
        (60 / self.slot_minutes) as usize
    }

    /// Number of slots on the grid.
    pub fn slot_count(&self) -> usize {
        (self.end_hour - self.start_hour) as usize * self.slots_per_hour()
    }

    /// Clamp an arbitrary slot index onto the grid.
    pub fn clamp_slot(&self, slot: usize) -> usize {
        slot.min(self.slot_count().saturating_sub(1))
    }

    /// Minutes since midnight at which slot boundary `index` lies.
    ///
    /// Boundary `0` is the start of the grid, boundary `slot_count()` its end.
    pub fn boundary_minutes(&self, index: usize) -> u32 {
        self.start_hour * 60 + index as u32 * self.slot_minutes
    }

    /// Minutes since midnight of the grid's end.
    pub fn end_minutes(&self) -> u32 {
        self.end_hour * 60
    }

    /// Start and end of `slot` in fractional hours since midnight.
    pub fn slot_hours(&self, slot: usize) -> (f64, f64) {
        let start = self.boundary_minutes(slot) as f64 / 60.0;
        let end = self.boundary_minutes(slot + 1) as f64 / 60.0;
        (start, end)
    }

    /// The hold delay as a duration. Saturates for delays chrono cannot represent.
    pub fn hold_delay(&self) -> Duration {
        Duration::try_milliseconds(self.hold_delay_ms).unwrap_or(Duration::MAX)
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub grid: SlotGrid,
}

impl EngineConfig {
    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("loading engine config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.grid.validate()
    }
}
