//! Hardware boundary of the power controller.
//!
//! The console only talks to the board through [`PowerController`]. RTC,
//! ADC sampling, GPIO and flash live behind it.

pub mod adc;
pub mod board;
pub mod rtc;
pub mod sim;

use thiserror::Error;

use crate::config::PowerConfig;
use adc::{Measurements, OutputStatus};
use rtc::{RtcDate, RtcTime};

pub use board::{Board, ConfigSink};
pub use sim::SimController;

/// Peripheral failures surfaced to command handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HalError {
    /// RTC read or write rejected
    #[error("rtc access failed")]
    Rtc,
    /// Configuration could not be written to flash
    #[error("flash write failed")]
    Flash,
    /// Peripheral has no driver on this build
    #[error("peripheral unavailable")]
    Unavailable,
}

/// Domain state and actions the console commands operate on.
pub trait PowerController {
    /// Current RTC time
    fn time(&mut self) -> Result<RtcTime, HalError>;

    /// Current RTC date
    fn date(&mut self) -> Result<RtcDate, HalError>;

    /// Program the RTC time
    fn set_time(&mut self, time: RtcTime) -> Result<(), HalError>;

    /// Program the RTC date
    fn set_date(&mut self, date: RtcDate) -> Result<(), HalError>;

    /// Latest voltage sample
    fn measurements(&mut self) -> Result<Measurements, HalError>;

    /// Live configuration
    fn config(&self) -> &PowerConfig;

    /// Live configuration, for in-place updates
    fn config_mut(&mut self) -> &mut PowerConfig;

    /// Rail currently feeding the output
    fn output_status(&self) -> Result<OutputStatus, HalError>;

    /// Number of power failures seen since the counter was last cleared
    fn powerfailure_counter(&self) -> Result<u32, HalError>;

    /// Write the live configuration to flash
    fn persist(&mut self) -> Result<(), HalError>;

    /// Re-arm the watchdog with the current shutdown timings
    fn reconfigure_watchdog(&mut self);

    /// Close the serial-less communication window
    fn end_serial_less_session(&mut self);

    /// Drive the wide-range input regulator enable pin
    fn set_wide_regulator(&mut self, enabled: bool) -> Result<(), HalError>;

    /// Start the managed Raspberry Pi shutdown sequence
    fn request_poweroff(&mut self) -> Result<(), HalError>;
}
