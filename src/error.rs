//! Error types for widget construction and configuration parsing.

use thiserror::Error;

/// Errors that can occur while configuring a pulse widget
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PulseError {
    /// The configuration cannot produce a drawable waveform
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A color string could not be parsed
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, PulseError>;
