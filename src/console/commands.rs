//! Command registry, handlers and dispatcher
//!
//! Handlers are called repeatedly with the same line until they return
//! [`Completion::Done`]. Each call fills one output chunk, which the
//! dispatcher hands on before the next call.

use core::fmt::Write;

use super::output::OutputBuffer;
use super::parser::{parse_line, ParsedCommand};
use super::session::SessionFlags;
use super::status::StatusRecord;
use super::ConsoleError;
use crate::config::{ConfigEffect, OperatingMode, FIRMWARE_VERSION};
use crate::hal::adc::{BatteryLevel, OutputStatus, Rail, Volts};
use crate::hal::rtc::{weekday_name, RtcDate, RtcTime};
use crate::hal::PowerController;

const DASHLINE: &str = "\r\n------------------------------\r\n";
const STARLINE: &str = "****************************\r\n";

/// Per-call result of a handler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// More chunks follow, call again
    Continue,
    /// This was the last chunk
    Done,
}

/// State a handler may touch
pub struct CommandContext<'a> {
    pub flags: &'a mut SessionFlags,
    pub controller: &'a mut dyn PowerController,
    /// Zero-based call index within the current dispatch
    pub call: usize,
}

pub type Handler =
    fn(&mut CommandContext<'_>, &ParsedCommand<'_>, &mut OutputBuffer) -> Result<Completion, ConsoleError>;

/// Command descriptor
pub struct CommandDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    /// Minimum number of parameters after the command name
    pub params: usize,
    pub handler: Handler,
}

/// All available commands, in registration order
pub static COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor {
        name: "help",
        help: "help:\r\n Lists all the registered commands\r\n\r\n",
        params: 0,
        handler: cmd_help,
    },
    CommandDescriptor {
        name: "time-output",
        help: "time-output:\r\n Displays the actual time of the StromPi RTC-Clock\r\n\r\n",
        params: 0,
        handler: cmd_time_output,
    },
    CommandDescriptor {
        name: "adc-output",
        help: "adc-output:\r\n Outputs the measured Voltages\r\n\r\n",
        params: 0,
        handler: cmd_adc_output,
    },
    CommandDescriptor {
        name: "strompi-mode",
        help: "strompi-mode <mode-number>:\r\n Configures the mode of the StromPi 3:\r\n  Mode 1: mUSB -> Wide\r\n  Mode 2: Wide -> mUSB\r\n  Mode 3: mUSB -> Battery\r\n  Mode 4: Wide -> Battery\r\n  Mode 5: mUSB -> Wide -> Battery\r\n  Mode 6: Wide -> mUSB -> Battery\r\n\r\n",
        params: 1,
        handler: cmd_mode,
    },
    CommandDescriptor {
        name: "set-clock",
        help: "set-clock <hour> <minutes> <seconds>:\r\n Set the Clock of the StromPi RTC \r\n\r\n",
        params: 3,
        handler: cmd_set_clock,
    },
    CommandDescriptor {
        name: "set-date",
        help: "set-date <date> <month> <year> <weekday>:\r\n Set the Date of the StromPi RTC-Clock \r\n\r\n",
        params: 4,
        handler: cmd_set_date,
    },
    CommandDescriptor {
        name: "set-config",
        help: "",
        params: 2,
        handler: cmd_set_config,
    },
    CommandDescriptor {
        name: "startstrompiconsole",
        help: "",
        params: 0,
        handler: cmd_start_console,
    },
    CommandDescriptor {
        name: "sspc",
        help: "",
        params: 0,
        handler: cmd_start_console,
    },
    CommandDescriptor {
        name: "show-status",
        help: "show-status:\r\n Outputs the actual Global-Configuration\r\n\r\n",
        params: 0,
        handler: cmd_show_status,
    },
    CommandDescriptor {
        name: "show-alarm",
        help: "show-alarm:\r\n Outputs the actual Alarm-Configuration\r\n\r\n",
        params: 0,
        handler: cmd_show_alarm,
    },
    CommandDescriptor {
        name: "poweroff",
        help: "poweroff:\r\n Shutdown the Raspberry Pi with the StromPi \r\n\r\n",
        params: 0,
        handler: cmd_poweroff,
    },
    CommandDescriptor {
        name: "time-rpi",
        help: "",
        params: 0,
        handler: cmd_time_rpi,
    },
    CommandDescriptor {
        name: "date-rpi",
        help: "",
        params: 0,
        handler: cmd_date_rpi,
    },
    CommandDescriptor {
        name: "status-rpi",
        help: "",
        params: 0,
        handler: cmd_status_rpi,
    },
    CommandDescriptor {
        name: "quit",
        help: "quit:\r\n Closes the StromPi-Console\r\n\r\n",
        params: 0,
        handler: cmd_quit,
    },
];

/// Look up a command by exact (case-sensitive) name
pub fn find(name: &str) -> Option<&'static CommandDescriptor> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// Get all command names
pub fn command_names() -> impl Iterator<Item = &'static str> {
    COMMANDS.iter().map(|c| c.name)
}

/// What happened during one dispatch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Resolved command, `None` if the name was not recognised
    pub command: Option<&'static str>,
    /// Chunks produced, error chunk included
    pub chunks: usize,
    /// Chunks that passed the output gate
    pub delivered: usize,
    pub error: Option<ConsoleError>,
}

/// Resolve `line` and drive its handler to completion.
///
/// Every chunk goes through the output gate (`echo_enabled || always_print`)
/// and, if it passes, to `emit`. Errors become a final `"Exx: ...\r\n"`
/// chunk; nothing is propagated.
pub fn dispatch(
    line: &str,
    flags: &mut SessionFlags,
    controller: &mut dyn PowerController,
    out: &mut OutputBuffer,
    mut emit: impl FnMut(&str),
) -> DispatchOutcome {
    let cmd = parse_line(line);
    let mut outcome = DispatchOutcome::default();

    let Some(descriptor) = find(cmd.command()) else {
        if !cmd.command().is_empty() {
            log::warn!("[console] unknown command '{}'", cmd.command());
        }
        emit_error(ConsoleError::UnknownCommand, flags, out, &mut emit, &mut outcome);
        return outcome;
    };
    outcome.command = Some(descriptor.name);

    if cmd.arg_count() < descriptor.params {
        log::warn!(
            "[console] {} expects {} parameter(s), got {}",
            descriptor.name,
            descriptor.params,
            cmd.arg_count()
        );
        emit_error(ConsoleError::MissingArg, flags, out, &mut emit, &mut outcome);
        return outcome;
    }

    log::debug!("[console] dispatch '{}'", line);

    let mut ctx = CommandContext {
        flags,
        controller,
        call: 0,
    };

    loop {
        out.clear();
        match (descriptor.handler)(&mut ctx, &cmd, out) {
            Ok(completion) => {
                if out.was_truncated() {
                    log::warn!("[console] {} output truncated", descriptor.name);
                }
                emit_chunk(ctx.flags, out, &mut emit, &mut outcome);
                if completion == Completion::Done {
                    break;
                }
                ctx.call += 1;
            }
            Err(e) => {
                log::warn!("[console] {} failed: {}", descriptor.name, e.code());
                emit_error(e, ctx.flags, out, &mut emit, &mut outcome);
                break;
            }
        }
    }

    outcome
}

fn emit_chunk(
    flags: &mut SessionFlags,
    out: &OutputBuffer,
    emit: &mut impl FnMut(&str),
    outcome: &mut DispatchOutcome,
) {
    outcome.chunks += 1;
    if flags.take_output_gate() {
        emit(out.as_str());
        outcome.delivered += 1;
    }
}

fn emit_error(
    error: ConsoleError,
    flags: &mut SessionFlags,
    out: &mut OutputBuffer,
    emit: &mut impl FnMut(&str),
    outcome: &mut DispatchOutcome,
) {
    out.clear();
    let _ = write!(out, "{}\r\n", error);
    outcome.error = Some(error);
    emit_chunk(flags, out, emit, outcome);
}

// --- Parameter helpers ---

/// Parse a decimal parameter. Only ASCII digits are accepted.
fn number(cmd: &ParsedCommand<'_>, idx: usize) -> Result<u32, ConsoleError> {
    let s = cmd.arg(idx).ok_or(ConsoleError::MissingArg)?;
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConsoleError::InvalidValue);
    }
    s.parse().map_err(|_| ConsoleError::OutOfRange)
}

fn number_u8(cmd: &ParsedCommand<'_>, idx: usize) -> Result<u8, ConsoleError> {
    u8::try_from(number(cmd, idx)?).map_err(|_| ConsoleError::OutOfRange)
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "Enabled"
    } else {
        "Disabled"
    }
}

fn write_rail(out: &mut OutputBuffer, rail: Rail) {
    if rail.connected {
        let _ = write!(out, "{}", Volts(rail.millivolts));
    } else {
        let _ = out.write_str("not connected");
    }
}

// --- Command Implementations ---

fn cmd_help(
    ctx: &mut CommandContext<'_>,
    _cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    if let Some(c) = COMMANDS.get(ctx.call) {
        let _ = out.write_str(c.help);
    }
    if ctx.call + 1 < COMMANDS.len() {
        Ok(Completion::Continue)
    } else {
        Ok(Completion::Done)
    }
}

fn cmd_time_output(
    ctx: &mut CommandContext<'_>,
    _cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    let time = ctx.controller.time()?;
    let _ = write!(out, "{}", time);
    Ok(Completion::Done)
}

fn cmd_adc_output(
    ctx: &mut CommandContext<'_>,
    _cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    let m = ctx.controller.measurements()?;

    let _ = write!(out, "{}Wide-Range-Inputvoltage: ", STARLINE);
    write_rail(out, m.wide);

    let _ = out.write_str("\r\nLifePo4-Batteryvoltage: ");
    write_rail(out, m.battery);
    if m.battery.connected {
        if m.battery_level != BatteryLevel::Disabled {
            let _ = write!(out, " [{}]", m.battery_level.label());
        }
        if m.charging {
            let _ = out.write_str(" [charging]");
        }
    }

    let _ = out.write_str("\r\nmicroUSB-Inputvoltage: ");
    write_rail(out, m.usb);

    let _ = write!(out, "\r\nOutput-Voltage: {}\r\n{}", Volts(m.output_mv), STARLINE);
    Ok(Completion::Done)
}

fn cmd_mode(
    ctx: &mut CommandContext<'_>,
    cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    let mode = OperatingMode::from_u8(number_u8(cmd, 0)?).ok_or(ConsoleError::OutOfRange)?;

    ctx.controller.config_mut().mode = mode;
    log::info!("[console] mode {} ({})", mode.number(), mode.label());

    let _ = write!(out, "{}Mode has been changed\r\n{}", STARLINE, STARLINE);
    ctx.controller.persist()?;
    Ok(Completion::Done)
}

fn cmd_set_clock(
    ctx: &mut CommandContext<'_>,
    cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    let hours = number_u8(cmd, 0)?;
    let minutes = number_u8(cmd, 1)?;
    let seconds = number_u8(cmd, 2)?;
    let time = RtcTime::new(hours, minutes, seconds).ok_or(ConsoleError::OutOfRange)?;

    ctx.controller.set_time(time)?;
    log::info!("[console] clock set to {}", time);

    let _ = write!(out, "The clock has been set to {}", time);
    Ok(Completion::Done)
}

fn cmd_set_date(
    ctx: &mut CommandContext<'_>,
    cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    let day = number_u8(cmd, 0)?;
    let month = number_u8(cmd, 1)?;
    let year = number_u8(cmd, 2)?;
    let weekday = number_u8(cmd, 3)?;
    let date = RtcDate::new(day, month, year, weekday).ok_or(ConsoleError::OutOfRange)?;

    ctx.controller.set_date(date)?;
    log::info!("[console] date set to {}", date);

    let _ = write!(out, "The date has been set to {}", date);
    Ok(Completion::Done)
}

fn cmd_set_config(
    ctx: &mut CommandContext<'_>,
    cmd: &ParsedCommand<'_>,
    _out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    let key = number(cmd, 0)?;
    let value = number(cmd, 1)?;

    let effect = ctx.controller.config_mut().apply(key, value)?;
    log::info!("[console] config {}={} ({:?})", key, value, effect);

    match effect {
        ConfigEffect::Stored => {}
        ConfigEffect::Persist => ctx.controller.persist()?,
        ConfigEffect::PersistAndReconfigureWatchdog => {
            ctx.controller.persist()?;
            ctx.controller.reconfigure_watchdog();
        }
        ConfigEffect::EndSerialLessSession => ctx.controller.end_serial_less_session(),
        ConfigEffect::RefreshWideRegulator => {
            let on_wide = ctx.controller.output_status()? == OutputStatus::Wide;
            ctx.controller.set_wide_regulator(on_wide)?;
        }
    }

    Ok(Completion::Done)
}

fn cmd_start_console(
    ctx: &mut CommandContext<'_>,
    _cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    ctx.flags.echo_enabled = true;
    let _ = write!(
        out,
        "{} Welcome to the StromPi 3 Console {} Type help to view a list of available commands.\r\n\r\n\
         [When you press ENTER the previous command would be executed again]\r\n",
        DASHLINE, DASHLINE
    );
    Ok(Completion::Done)
}

fn cmd_quit(
    ctx: &mut CommandContext<'_>,
    _cmd: &ParsedCommand<'_>,
    _out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    ctx.flags.echo_enabled = false;
    Ok(Completion::Done)
}

fn cmd_show_status(
    ctx: &mut CommandContext<'_>,
    _cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    let time = ctx.controller.time()?;
    let date = ctx.controller.date()?;
    let output = ctx.controller.output_status()?;
    let failures = ctx.controller.powerfailure_counter()?;
    let c = ctx.controller.config();

    let _ = write!(out, "\r\n Time: {}", time);
    let _ = write!(out, "\r\n Date: {}\r\n", date);
    let _ = write!(out, "\r\n StromPi-Output:  {} \r\n", output.label());
    let _ = write!(out, "\r\n StromPi-Mode: {} \r\n", c.mode.label());
    let _ = write!(out, "\r\n Raspberry Pi Shutdown: {} ", enabled(c.shutdown_enabled));
    let _ = write!(out, "\r\n  Shutdown-Timer: {} seconds", c.shutdown_seconds);
    let _ = write!(out, "\r\n\r\n Powerfail Warning: {} ", enabled(c.warning_enabled));
    let _ = write!(out, "\r\n\r\n Serial-Less Mode: {} ", enabled(c.serial_less_mode));
    let _ = write!(out, "\r\n\r\n Power Save Mode: {} ", enabled(c.powersave_enabled));
    let _ = write!(out, "\r\n\r\n Power-Off Mode: {} ", enabled(c.poweroff_mode_enabled));
    let _ = write!(out, "\r\n\r\n Battery-Level Shutdown: {}", c.battery_shutdown_level.label());
    let _ = write!(out, "\r\n\r\n Powerfailure-Counter: {}", failures);
    let _ = write!(out, "\r\n\r\n PowerOn-Button: {} ", enabled(c.power_button_enabled));
    let _ = write!(out, "\r\n  PowerOn-Button-Timer: {} seconds", c.power_button_seconds);
    let _ = write!(out, "\r\n\r\n FirmwareVersion: {}", FIRMWARE_VERSION);
    Ok(Completion::Done)
}

fn cmd_show_alarm(
    ctx: &mut CommandContext<'_>,
    _cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    let time = ctx.controller.time()?;
    let date = ctx.controller.date()?;
    let c = ctx.controller.config();

    let alarm_mode = if c.wakeup_time_enabled {
        "Minute Wakeup Alarm"
    } else {
        c.alarm_mode.label()
    };

    let _ = write!(out, "\r\n Time: {}", time);
    let _ = write!(out, "\r\n Date: {}\r\n", date);
    let _ = write!(out, "\r\n WakeUp-Alarm: {} ", enabled(c.alarm_enabled));
    let _ = write!(out, "\r\n  Alarm-Mode: {} ", alarm_mode);
    let _ = write!(out, "\r\n  Alarm-Time: {:02}:{:02}", c.alarm_hour, c.alarm_minute);
    let _ = write!(out, "\r\n  Alarm-Date: {:02}.{:02}", c.alarm_day, c.alarm_month);
    let _ = write!(out, "  \r\n  Minute Wakeup Time: {} minutes", c.wakeup_minutes);
    let _ = write!(out, "\r\n  Alarm-Weekday: {} ", weekday_name(c.alarm_weekday));
    let _ = write!(out, "\r\n  Weekend Wake-Up: {} \r\n ", enabled(c.weekend_wakeup_enabled));
    let _ = write!(out, "\r\n PowerOff-Alarm: {} ", enabled(c.poweroff_alarm_enabled));
    let _ = write!(
        out,
        "\r\n  PowerOff-Alarm-Time: {:02}:{:02}\r\n",
        c.poweroff_hour, c.poweroff_minute
    );
    let _ = write!(out, "\r\n Interval-Alarm: {} ", enabled(c.interval_alarm_enabled));
    let _ = write!(out, "\r\n  Interval-Alarm-OnTime: {} minutes\r", c.interval_on_minutes);
    let _ = write!(out, "\r\n  Interval-Alarm-OffTime: {} minutes\r\n", c.interval_off_minutes);
    Ok(Completion::Done)
}

fn cmd_poweroff(
    ctx: &mut CommandContext<'_>,
    _cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    // Console goes quiet before the message is written, so it only reaches
    // the line when a script asked for always-print.
    ctx.flags.echo_enabled = false;
    ctx.controller.request_poweroff()?;
    log::info!("[console] poweroff requested");

    let _ = out.write_str("\r\n Raspberry Pi Shutdown\r\n");
    Ok(Completion::Done)
}

fn cmd_time_rpi(
    ctx: &mut CommandContext<'_>,
    _cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    ctx.flags.always_print = true;
    let time = ctx.controller.time()?;
    let _ = write!(out, "{}", time.packed());
    Ok(Completion::Done)
}

fn cmd_date_rpi(
    ctx: &mut CommandContext<'_>,
    _cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    ctx.flags.always_print = true;
    let date = ctx.controller.date()?;
    let _ = write!(out, "{}", date.packed());
    Ok(Completion::Done)
}

fn cmd_status_rpi(
    ctx: &mut CommandContext<'_>,
    _cmd: &ParsedCommand<'_>,
    out: &mut OutputBuffer,
) -> Result<Completion, ConsoleError> {
    ctx.flags.always_print = true;
    let _ = StatusRecord::capture(ctx.controller).write_to(out);
    Ok(Completion::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::SimController;

    #[test]
    fn test_command_names_unique() {
        for (i, a) in COMMANDS.iter().enumerate() {
            for b in &COMMANDS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn test_number_rejects_signs_and_letters() {
        let cmd = parse_line("set-clock +1 x1 300");
        assert_eq!(number(&cmd, 0), Err(ConsoleError::InvalidValue));
        assert_eq!(number(&cmd, 1), Err(ConsoleError::InvalidValue));
        assert_eq!(number_u8(&cmd, 2), Err(ConsoleError::OutOfRange));
        assert_eq!(number(&cmd, 3), Err(ConsoleError::MissingArg));
    }

    #[test]
    fn test_help_streams_one_chunk_per_command() {
        let mut flags = SessionFlags {
            echo_enabled: true,
            always_print: false,
        };
        let mut sim = SimController::new();
        let mut out = OutputBuffer::new();
        let mut chunks = 0;

        let outcome = dispatch("help", &mut flags, &mut sim, &mut out, |_| chunks += 1);
        assert_eq!(outcome.chunks, COMMANDS.len());
        assert_eq!(chunks, COMMANDS.len());
        assert_eq!(outcome.error, None);
    }
}
