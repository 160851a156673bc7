//! Error types for clinic-calendar.
//!
//! The engine functions themselves are total and never fail. Errors only come
//! from building configuration and loading it from TOML.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
