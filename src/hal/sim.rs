//! In-memory power controller.
//!
//! Backs the host simulator and the tests. Every action is recorded so the
//! effect of a command can be asserted on.

use super::adc::{BatteryLevel, Measurements, OutputStatus, Rail};
use super::rtc::{RtcDate, RtcTime};
use super::{HalError, PowerController};
use crate::config::PowerConfig;

/// Countdown loaded when a serial-less session is closed.
pub const SERIAL_LESS_OFF_COUNTDOWN: u8 = 5;

/// Simulated board
#[derive(Debug, Clone)]
pub struct SimController {
    pub time: RtcTime,
    pub date: RtcDate,
    pub measurements: Measurements,
    pub config: PowerConfig,
    /// Last configuration written by [`PowerController::persist`]
    pub persisted: PowerConfig,
    pub output_status: OutputStatus,
    pub powerfailure_counter: u32,
    /// Make RTC access fail
    pub rtc_fault: bool,
    /// Make flash writes fail
    pub flash_fault: bool,
    pub persist_count: u32,
    pub watchdog_reconfigured: u32,
    pub serial_less_off_counter: u8,
    pub wide_regulator: bool,
    pub poweroff_requested: bool,
}

impl SimController {
    /// Board powered from the wide-range input with a charged battery
    pub fn new() -> Self {
        Self {
            time: RtcTime::default(),
            date: RtcDate::default(),
            measurements: Measurements {
                wide: Rail {
                    millivolts: 12_034,
                    connected: true,
                },
                battery: Rail {
                    millivolts: 3_312,
                    connected: true,
                },
                usb: Rail {
                    millivolts: 0,
                    connected: false,
                },
                output_mv: 5_121,
                battery_level: BatteryLevel::Pct100,
                charging: false,
            },
            config: PowerConfig::default(),
            persisted: PowerConfig::default(),
            output_status: OutputStatus::Wide,
            powerfailure_counter: 0,
            rtc_fault: false,
            flash_fault: false,
            persist_count: 0,
            watchdog_reconfigured: 0,
            serial_less_off_counter: 0,
            wide_regulator: true,
            poweroff_requested: false,
        }
    }
}

impl Default for SimController {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerController for SimController {
    fn time(&mut self) -> Result<RtcTime, HalError> {
        if self.rtc_fault {
            return Err(HalError::Rtc);
        }
        Ok(self.time)
    }

    fn date(&mut self) -> Result<RtcDate, HalError> {
        if self.rtc_fault {
            return Err(HalError::Rtc);
        }
        Ok(self.date)
    }

    fn set_time(&mut self, time: RtcTime) -> Result<(), HalError> {
        if self.rtc_fault {
            return Err(HalError::Rtc);
        }
        self.time = time;
        Ok(())
    }

    fn set_date(&mut self, date: RtcDate) -> Result<(), HalError> {
        if self.rtc_fault {
            return Err(HalError::Rtc);
        }
        self.date = date;
        Ok(())
    }

    fn measurements(&mut self) -> Result<Measurements, HalError> {
        Ok(self.measurements)
    }

    fn config(&self) -> &PowerConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut PowerConfig {
        &mut self.config
    }

    fn output_status(&self) -> Result<OutputStatus, HalError> {
        Ok(self.output_status)
    }

    fn powerfailure_counter(&self) -> Result<u32, HalError> {
        Ok(self.powerfailure_counter)
    }

    fn persist(&mut self) -> Result<(), HalError> {
        if self.flash_fault {
            return Err(HalError::Flash);
        }
        self.persisted = self.config;
        self.persist_count += 1;
        Ok(())
    }

    fn reconfigure_watchdog(&mut self) {
        self.watchdog_reconfigured += 1;
    }

    fn end_serial_less_session(&mut self) {
        self.serial_less_off_counter = SERIAL_LESS_OFF_COUNTDOWN;
    }

    fn set_wide_regulator(&mut self, enabled: bool) -> Result<(), HalError> {
        self.wide_regulator = enabled;
        Ok(())
    }

    fn request_poweroff(&mut self) -> Result<(), HalError> {
        self.poweroff_requested = true;
        Ok(())
    }
}
