//! Console error types

use thiserror::Error;

use crate::config::ConfigError;
use crate::hal::HalError;

/// Console error with code and message.
///
/// Never leaves the console task: the dispatcher renders it as the final
/// output chunk of the failing command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// E01: Unknown command
    #[error("E01: command not recognised, enter 'help' to view a list of available commands")]
    UnknownCommand,
    /// E02: Invalid value format
    #[error("E02: invalid value")]
    InvalidValue,
    /// E03: Fewer parameters than the command declares
    #[error("E03: incorrect command parameter(s)")]
    MissingArg,
    /// E04: Value out of allowed range
    #[error("E04: value out of range")]
    OutOfRange,
    /// E05: RTC or other peripheral refused the operation
    #[error("E05: peripheral error")]
    Peripheral,
    /// E06: Configuration could not be written to flash
    #[error("E06: flash write failed")]
    NvsError,
}

impl ConsoleError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownCommand => "E01",
            Self::InvalidValue => "E02",
            Self::MissingArg => "E03",
            Self::OutOfRange => "E04",
            Self::Peripheral => "E05",
            Self::NvsError => "E06",
        }
    }
}

impl From<ConfigError> for ConsoleError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::UnknownKey(_) | ConfigError::OutOfRange => Self::OutOfRange,
        }
    }
}

impl From<HalError> for ConsoleError {
    fn from(e: HalError) -> Self {
        match e {
            HalError::Flash => Self::NvsError,
            HalError::Rtc | HalError::Unavailable => Self::Peripheral,
        }
    }
}
