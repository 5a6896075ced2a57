//! Status record for automation scripts.
//!
//! Fixed-order, newline-terminated fields. Scripts parse by position, so
//! the field count and order never change and a field whose source cannot
//! be read is emitted as `0` rather than skipped.
//!
//! ```text
//! 235959\n 210328\n 7\n 5\n ... 12034\n ... v1.72c\n
//! time     date     wd  mode    voltages    firmware
//! ```

use core::fmt::{self, Write};

use crate::config::FIRMWARE_VERSION;
use crate::hal::PowerController;

/// Number of fields in the record, firmware version included.
pub const STATUS_FIELD_COUNT: usize = 38;

/// Numeric fields preceding the firmware version.
pub const NUMERIC_FIELD_COUNT: usize = STATUS_FIELD_COUNT - 1;

/// Field names in wire order.
pub const STATUS_FIELDS: [&str; STATUS_FIELD_COUNT] = [
    "time",
    "date",
    "weekday",
    "mode",
    "alarm-enabled",
    "alarm-mode",
    "alarm-hour",
    "alarm-min",
    "alarm-day",
    "alarm-month",
    "alarm-weekday",
    "poweroff-alarm-enabled",
    "poweroff-hour",
    "poweroff-min",
    "shutdown-enabled",
    "shutdown-time",
    "warning-enabled",
    "serial-less-mode",
    "interval-alarm-enabled",
    "interval-on-minutes",
    "interval-off-minutes",
    "battery-shutdown-level",
    "battery-level",
    "charging",
    "power-button-enabled",
    "power-button-time",
    "powersave-enabled",
    "poweroff-mode-enabled",
    "wakeup-time-enabled",
    "wakeup-time",
    "weekend-wakeup-enabled",
    "voltage-wide",
    "voltage-battery",
    "voltage-usb",
    "voltage-output",
    "output-status",
    "powerfailure-counter",
    "firmware-version",
];

/// Snapshot of the domain state, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub values: [u32; NUMERIC_FIELD_COUNT],
    pub firmware: &'static str,
}

impl StatusRecord {
    /// Read every field source once.
    pub fn capture(controller: &mut dyn PowerController) -> Self {
        let time = controller.time().map(|t| t.packed()).unwrap_or(0);
        let (date, weekday) = controller
            .date()
            .map(|d| (d.packed(), u32::from(d.weekday.index())))
            .unwrap_or((0, 0));
        let m = controller.measurements().unwrap_or_default();
        let [v_wide, v_bat, v_usb, v_out] = m.millivolts();
        let output_status = controller.output_status().map(|o| o as u32).unwrap_or(0);
        let powerfailures = controller.powerfailure_counter().unwrap_or(0);

        let c = controller.config();
        let b = |v: bool| u32::from(v);

        Self {
            values: [
                time,
                date,
                weekday,
                u32::from(c.mode.number()),
                b(c.alarm_enabled),
                c.alarm_mode as u32,
                u32::from(c.alarm_hour),
                u32::from(c.alarm_minute),
                u32::from(c.alarm_day),
                u32::from(c.alarm_month),
                u32::from(c.alarm_weekday),
                b(c.poweroff_alarm_enabled),
                u32::from(c.poweroff_hour),
                u32::from(c.poweroff_minute),
                b(c.shutdown_enabled),
                u32::from(c.shutdown_seconds),
                b(c.warning_enabled),
                b(c.serial_less_mode),
                b(c.interval_alarm_enabled),
                u32::from(c.interval_on_minutes),
                u32::from(c.interval_off_minutes),
                c.battery_shutdown_level as u32,
                m.battery_level as u32,
                b(m.charging),
                b(c.power_button_enabled),
                u32::from(c.power_button_seconds),
                b(c.powersave_enabled),
                b(c.poweroff_mode_enabled),
                b(c.wakeup_time_enabled),
                u32::from(c.wakeup_minutes),
                b(c.weekend_wakeup_enabled),
                v_wide,
                v_bat,
                v_usb,
                v_out,
                output_status,
                powerfailures,
            ],
            firmware: FIRMWARE_VERSION,
        }
    }

    /// Serialize as `value\n` per field.
    pub fn write_to(&self, out: &mut dyn Write) -> fmt::Result {
        for value in &self.values {
            writeln!(out, "{}", value)?;
        }
        writeln!(out, "{}", self.firmware)
    }
}
