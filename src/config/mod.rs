//! Module: config
//!
//! Purpose: Persistent power-management configuration of the StromPi 3.
//!
//! Architecture:
//! - `PowerConfig`: typed settings, mutated by `strompi-mode` and `set-config`
//! - `ConfigKey`: numeric key table used by the `set-config` wire command
//! - `nvs`: flash persistence with a schema version (ESP-IDF only)
//!
//! The table only validates and stores. Side effects that touch hardware
//! are returned as a [`ConfigEffect`] for the caller to carry out.

use thiserror::Error;

use crate::hal::adc::BatteryLevel;

pub mod nvs;

/// Firmware version reported in the status record and `show-status`.
pub const FIRMWARE_VERSION: &str = "v1.72c";

/// Console UART baud rate.
pub const CONSOLE_BAUD_RATE: u32 = 38_400;

/// Highest key accepted by `set-config`.
pub const CONFIG_KEY_MAX: u8 = 26;

/// Input priority order. Modes 5 and 6 are the three-stage modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum OperatingMode {
    #[default]
    MusbWide = 1,
    WideMusb = 2,
    MusbBattery = 3,
    WideBattery = 4,
    MusbWideBattery = 5,
    WideMusbBattery = 6,
}

impl OperatingMode {
    /// Convert from the mode number typed by the user (1..=6).
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::MusbWide),
            2 => Some(Self::WideMusb),
            3 => Some(Self::MusbBattery),
            4 => Some(Self::WideBattery),
            5 => Some(Self::MusbWideBattery),
            6 => Some(Self::WideMusbBattery),
            _ => None,
        }
    }

    /// Mode number as reported on the wire
    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::MusbWide => "mUSB -> Wide",
            Self::WideMusb => "Wide -> mUSB",
            Self::MusbBattery => "mUSB -> Battery",
            Self::WideBattery => "Wide -> Battery",
            Self::MusbWideBattery => "mUSB -> Wide -> Battery",
            Self::WideMusbBattery => "Wide -> mUSB -> Battery",
        }
    }
}

/// Which wake-up alarm is armed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum AlarmMode {
    #[default]
    None = 0,
    Time = 1,
    Date = 2,
    Weekday = 3,
}

impl AlarmMode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Time),
            2 => Some(Self::Date),
            3 => Some(Self::Weekday),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "No Alarm",
            Self::Time => "Time-Alarm",
            Self::Date => "Date-Alarm",
            Self::Weekday => "Weekday-Alarm",
        }
    }
}

/// Power-management settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerConfig {
    pub mode: OperatingMode,
    pub alarm_enabled: bool,
    pub alarm_mode: AlarmMode,
    pub alarm_hour: u8,
    pub alarm_minute: u8,
    pub alarm_day: u8,
    pub alarm_month: u8,
    pub alarm_weekday: u8,
    pub poweroff_alarm_enabled: bool,
    pub poweroff_hour: u8,
    pub poweroff_minute: u8,
    pub shutdown_enabled: bool,
    /// Raspberry Pi shutdown timer (seconds)
    pub shutdown_seconds: u16,
    pub warning_enabled: bool,
    pub serial_less_mode: bool,
    pub interval_alarm_enabled: bool,
    pub interval_on_minutes: u16,
    pub interval_off_minutes: u16,
    pub battery_shutdown_level: BatteryLevel,
    pub power_button_enabled: bool,
    pub power_button_seconds: u16,
    pub powersave_enabled: bool,
    pub poweroff_mode_enabled: bool,
    pub wakeup_time_enabled: bool,
    pub wakeup_minutes: u16,
    pub weekend_wakeup_enabled: bool,
}

impl Default for PowerConfig {
    fn default() -> Self {
        Self {
            mode: OperatingMode::MusbWide,
            alarm_enabled: false,
            alarm_mode: AlarmMode::None,
            alarm_hour: 0,
            alarm_minute: 0,
            alarm_day: 1,
            alarm_month: 1,
            alarm_weekday: 1,
            poweroff_alarm_enabled: false,
            poweroff_hour: 0,
            poweroff_minute: 0,
            shutdown_enabled: false,
            shutdown_seconds: 10,
            warning_enabled: false,
            serial_less_mode: false,
            interval_alarm_enabled: false,
            interval_on_minutes: 0,
            interval_off_minutes: 0,
            battery_shutdown_level: BatteryLevel::Disabled,
            power_button_enabled: false,
            power_button_seconds: 0,
            powersave_enabled: false,
            poweroff_mode_enabled: false,
            wakeup_time_enabled: false,
            wakeup_minutes: 0,
            weekend_wakeup_enabled: false,
        }
    }
}

/// `set-config` key table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ConfigKey {
    Action = 0,
    Mode = 1,
    AlarmMode = 2,
    PoweroffAlarmEnabled = 3,
    AlarmMinute = 4,
    AlarmHour = 5,
    PoweroffMinute = 6,
    PoweroffHour = 7,
    AlarmDay = 8,
    AlarmMonth = 9,
    AlarmWeekday = 10,
    AlarmEnabled = 11,
    ShutdownEnabled = 12,
    ShutdownSeconds = 13,
    WarningEnabled = 14,
    SerialLessMode = 15,
    BatteryShutdownLevel = 16,
    IntervalAlarmEnabled = 17,
    IntervalOnMinutes = 18,
    IntervalOffMinutes = 19,
    PowerButtonEnabled = 20,
    PowerButtonSeconds = 21,
    WakeupTimeEnabled = 22,
    WakeupMinutes = 23,
    PoweroffModeEnabled = 24,
    PowersaveEnabled = 25,
    WeekendWakeupEnabled = 26,
}

impl ConfigKey {
    /// Convert from the numeric key.
    pub fn from_u8(value: u8) -> Option<Self> {
        use ConfigKey as K;
        const TABLE: [ConfigKey; CONFIG_KEY_MAX as usize + 1] = [
            K::Action,
            K::Mode,
            K::AlarmMode,
            K::PoweroffAlarmEnabled,
            K::AlarmMinute,
            K::AlarmHour,
            K::PoweroffMinute,
            K::PoweroffHour,
            K::AlarmDay,
            K::AlarmMonth,
            K::AlarmWeekday,
            K::AlarmEnabled,
            K::ShutdownEnabled,
            K::ShutdownSeconds,
            K::WarningEnabled,
            K::SerialLessMode,
            K::BatteryShutdownLevel,
            K::IntervalAlarmEnabled,
            K::IntervalOnMinutes,
            K::IntervalOffMinutes,
            K::PowerButtonEnabled,
            K::PowerButtonSeconds,
            K::WakeupTimeEnabled,
            K::WakeupMinutes,
            K::PoweroffModeEnabled,
            K::PowersaveEnabled,
            K::WeekendWakeupEnabled,
        ];
        TABLE.get(usize::from(value)).copied()
    }
}

/// What the caller must do after a successful `set-config`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigEffect {
    /// Value stored, nothing else to do
    Stored,
    /// Write the configuration to flash
    Persist,
    /// Write to flash and re-arm the watchdog with the new timings
    PersistAndReconfigureWatchdog,
    /// Close the current serial-less session
    EndSerialLessSession,
    /// Power-off mode was enabled: re-drive the wide-range regulator
    RefreshWideRegulator,
}

/// Configuration table errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown configuration key {0}")]
    UnknownKey(u32),
    #[error("value out of range")]
    OutOfRange,
}

fn flag(value: u32) -> Result<bool, ConfigError> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ConfigError::OutOfRange),
    }
}

fn bounded_u8(value: u32, max: u8) -> Result<u8, ConfigError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= max)
        .ok_or(ConfigError::OutOfRange)
}

fn bounded_u16(value: u32) -> Result<u16, ConfigError> {
    u16::try_from(value).map_err(|_| ConfigError::OutOfRange)
}

impl PowerConfig {
    /// Apply one `set-config <key> <value>` pair.
    ///
    /// Nothing is modified when an error is returned.
    pub fn apply(&mut self, key: u32, value: u32) -> Result<ConfigEffect, ConfigError> {
        let key = u8::try_from(key)
            .ok()
            .and_then(ConfigKey::from_u8)
            .ok_or(ConfigError::UnknownKey(key))?;

        use ConfigKey as K;
        match key {
            K::Action => {
                return match value {
                    0 => Ok(ConfigEffect::Persist),
                    1 => Ok(ConfigEffect::PersistAndReconfigureWatchdog),
                    2 if self.serial_less_mode => Ok(ConfigEffect::EndSerialLessSession),
                    2 => Ok(ConfigEffect::Stored),
                    _ => Err(ConfigError::OutOfRange),
                };
            }
            K::Mode => {
                self.mode = u8::try_from(value)
                    .ok()
                    .and_then(OperatingMode::from_u8)
                    .ok_or(ConfigError::OutOfRange)?;
            }
            K::AlarmMode => {
                self.alarm_mode = u8::try_from(value)
                    .ok()
                    .and_then(AlarmMode::from_u8)
                    .ok_or(ConfigError::OutOfRange)?;
            }
            K::PoweroffAlarmEnabled => self.poweroff_alarm_enabled = flag(value)?,
            K::AlarmMinute => self.alarm_minute = bounded_u8(value, 59)?,
            K::AlarmHour => self.alarm_hour = bounded_u8(value, 23)?,
            K::PoweroffMinute => self.poweroff_minute = bounded_u8(value, 59)?,
            K::PoweroffHour => self.poweroff_hour = bounded_u8(value, 23)?,
            K::AlarmDay => {
                let day = bounded_u8(value, 31)?;
                if day == 0 {
                    return Err(ConfigError::OutOfRange);
                }
                self.alarm_day = day;
            }
            K::AlarmMonth => {
                let month = bounded_u8(value, 12)?;
                if month == 0 {
                    return Err(ConfigError::OutOfRange);
                }
                self.alarm_month = month;
            }
            K::AlarmWeekday => {
                let weekday = bounded_u8(value, 7)?;
                if weekday == 0 {
                    return Err(ConfigError::OutOfRange);
                }
                self.alarm_weekday = weekday;
            }
            K::AlarmEnabled => self.alarm_enabled = flag(value)?,
            K::ShutdownEnabled => self.shutdown_enabled = flag(value)?,
            K::ShutdownSeconds => self.shutdown_seconds = bounded_u16(value)?,
            K::WarningEnabled => self.warning_enabled = flag(value)?,
            K::SerialLessMode => self.serial_less_mode = flag(value)?,
            K::BatteryShutdownLevel => {
                self.battery_shutdown_level = u8::try_from(value)
                    .ok()
                    .and_then(BatteryLevel::from_u8)
                    .ok_or(ConfigError::OutOfRange)?;
            }
            K::IntervalAlarmEnabled => self.interval_alarm_enabled = flag(value)?,
            K::IntervalOnMinutes => self.interval_on_minutes = bounded_u16(value)?,
            K::IntervalOffMinutes => self.interval_off_minutes = bounded_u16(value)?,
            K::PowerButtonEnabled => self.power_button_enabled = flag(value)?,
            K::PowerButtonSeconds => self.power_button_seconds = bounded_u16(value)?,
            K::WakeupTimeEnabled => self.wakeup_time_enabled = flag(value)?,
            K::WakeupMinutes => self.wakeup_minutes = bounded_u16(value)?,
            K::PoweroffModeEnabled => {
                self.poweroff_mode_enabled = flag(value)?;
                if self.poweroff_mode_enabled {
                    return Ok(ConfigEffect::RefreshWideRegulator);
                }
            }
            K::PowersaveEnabled => self.powersave_enabled = flag(value)?,
            K::WeekendWakeupEnabled => self.weekend_wakeup_enabled = flag(value)?,
        }

        Ok(ConfigEffect::Stored)
    }
}
