//! Power controller for the physical board.
//!
//! Owns the live configuration and writes it through a [`ConfigSink`].
//! Peripherals without a driver answer [`HalError::Unavailable`]: the
//! human-readable commands report `E05` and the status record falls back
//! to its `0` placeholders, so no reading is ever made up.

use super::adc::{Measurements, OutputStatus};
use super::rtc::{RtcDate, RtcTime};
use super::sim::SERIAL_LESS_OFF_COUNTDOWN;
use super::{HalError, PowerController};
use crate::config::PowerConfig;

/// Persistent storage for the live configuration
pub trait ConfigSink {
    fn save(&mut self, config: &PowerConfig) -> Result<(), HalError>;
}

/// Board controller
///
/// `sink` is `None` when flash could not be opened at boot. The console
/// still runs; every persist then fails with [`HalError::Flash`].
pub struct Board<S: ConfigSink> {
    config: PowerConfig,
    sink: Option<S>,
    watchdog_shutdown_seconds: u16,
    serial_less_off_counter: u8,
}

impl<S: ConfigSink> Board<S> {
    pub fn new(config: PowerConfig, sink: Option<S>) -> Self {
        Self {
            watchdog_shutdown_seconds: config.shutdown_seconds,
            config,
            sink,
            serial_less_off_counter: 0,
        }
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    /// Shutdown timing the watchdog was last armed with
    pub fn watchdog_shutdown_seconds(&self) -> u16 {
        self.watchdog_shutdown_seconds
    }

    pub fn serial_less_off_counter(&self) -> u8 {
        self.serial_less_off_counter
    }
}

impl<S: ConfigSink> PowerController for Board<S> {
    fn time(&mut self) -> Result<RtcTime, HalError> {
        Err(HalError::Unavailable)
    }

    fn date(&mut self) -> Result<RtcDate, HalError> {
        Err(HalError::Unavailable)
    }

    fn set_time(&mut self, _time: RtcTime) -> Result<(), HalError> {
        Err(HalError::Unavailable)
    }

    fn set_date(&mut self, _date: RtcDate) -> Result<(), HalError> {
        Err(HalError::Unavailable)
    }

    fn measurements(&mut self) -> Result<Measurements, HalError> {
        Err(HalError::Unavailable)
    }

    fn config(&self) -> &PowerConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut PowerConfig {
        &mut self.config
    }

    fn output_status(&self) -> Result<OutputStatus, HalError> {
        Err(HalError::Unavailable)
    }

    fn powerfailure_counter(&self) -> Result<u32, HalError> {
        Err(HalError::Unavailable)
    }

    fn persist(&mut self) -> Result<(), HalError> {
        match self.sink.as_mut() {
            Some(sink) => sink.save(&self.config),
            None => {
                log::error!("[board] no config storage, settings not saved");
                Err(HalError::Flash)
            }
        }
    }

    fn reconfigure_watchdog(&mut self) {
        self.watchdog_shutdown_seconds = self.config.shutdown_seconds;
        log::info!("[board] watchdog armed for {} s", self.watchdog_shutdown_seconds);
    }

    fn end_serial_less_session(&mut self) {
        self.serial_less_off_counter = SERIAL_LESS_OFF_COUNTDOWN;
    }

    fn set_wide_regulator(&mut self, _enabled: bool) -> Result<(), HalError> {
        Err(HalError::Unavailable)
    }

    fn request_poweroff(&mut self) -> Result<(), HalError> {
        Err(HalError::Unavailable)
    }
}
