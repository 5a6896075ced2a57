//! Command handler and dispatcher tests

use strompi_console::config::OperatingMode;
use strompi_console::console::commands::{command_names, dispatch, find, DispatchOutcome, COMMANDS};
use strompi_console::console::{ConsoleError, OutputBuffer, SessionFlags};
use strompi_console::hal::adc::OutputStatus;
use strompi_console::hal::rtc::{RtcDate, RtcTime};
use strompi_console::SimController;

fn enabled() -> SessionFlags {
    SessionFlags {
        echo_enabled: true,
        always_print: false,
    }
}

fn muted() -> SessionFlags {
    SessionFlags::default()
}

/// Dispatch one line, returning the outcome and the delivered chunks
fn run(line: &str, flags: &mut SessionFlags, sim: &mut SimController) -> (DispatchOutcome, Vec<String>) {
    let mut out = OutputBuffer::new();
    let mut chunks = Vec::new();
    let outcome = dispatch(line, flags, sim, &mut out, |chunk| chunks.push(chunk.to_string()));
    (outcome, chunks)
}

fn run_text(line: &str, sim: &mut SimController) -> (DispatchOutcome, String) {
    let (outcome, chunks) = run(line, &mut enabled(), sim);
    (outcome, chunks.concat())
}

#[test]
fn test_command_registry_order() {
    let expected = [
        "help",
        "time-output",
        "adc-output",
        "strompi-mode",
        "set-clock",
        "set-date",
        "set-config",
        "startstrompiconsole",
        "sspc",
        "show-status",
        "show-alarm",
        "poweroff",
        "time-rpi",
        "date-rpi",
        "status-rpi",
        "quit",
    ];
    assert_eq!(command_names().collect::<Vec<_>>(), expected);
}

#[test]
fn test_declared_parameter_counts() {
    assert_eq!(find("strompi-mode").unwrap().params, 1);
    assert_eq!(find("set-clock").unwrap().params, 3);
    assert_eq!(find("set-date").unwrap().params, 4);
    assert_eq!(find("set-config").unwrap().params, 2);
    assert_eq!(find("status-rpi").unwrap().params, 0);
}

#[test]
fn test_unknown_command() {
    let mut sim = SimController::new();
    let (outcome, text) = run_text("foobar", &mut sim);

    assert_eq!(outcome.command, None);
    assert_eq!(outcome.error, Some(ConsoleError::UnknownCommand));
    assert_eq!(
        text,
        "E01: command not recognised, enter 'help' to view a list of available commands\r\n"
    );
}

#[test]
fn test_lookup_is_case_sensitive() {
    let mut sim = SimController::new();
    let (outcome, _) = run_text("QUIT", &mut sim);
    assert_eq!(outcome.error, Some(ConsoleError::UnknownCommand));
}

#[test]
fn test_empty_line_resolves_to_nothing() {
    let mut sim = SimController::new();
    let (outcome, _) = run_text("", &mut sim);
    assert_eq!(outcome.command, None);
    assert_eq!(outcome.error, Some(ConsoleError::UnknownCommand));
}

#[test]
fn test_missing_parameters_rejected_before_handler() {
    let mut sim = SimController::new();
    let before = sim.time;
    let (outcome, text) = run_text("set-clock 12 30", &mut sim);

    assert_eq!(outcome.command, Some("set-clock"));
    assert_eq!(outcome.error, Some(ConsoleError::MissingArg));
    assert_eq!(text, "E03: incorrect command parameter(s)\r\n");
    assert_eq!(sim.time, before);
}

#[test]
fn test_extra_parameters_tolerated() {
    let mut sim = SimController::new();
    let (outcome, _) = run_text("time-output now", &mut sim);
    assert_eq!(outcome.error, None);
}

#[test]
fn test_set_clock() {
    let mut sim = SimController::new();
    let (outcome, text) = run_text("set-clock 23 59 59", &mut sim);

    assert_eq!(outcome.error, None);
    assert_eq!(text, "The clock has been set to 23:59:59");
    assert_eq!(sim.time, RtcTime::new(23, 59, 59).unwrap());
}

#[test]
fn test_set_clock_out_of_range() {
    let mut sim = SimController::new();
    let (outcome, text) = run_text("set-clock 24 0 0", &mut sim);

    assert_eq!(outcome.error, Some(ConsoleError::OutOfRange));
    assert_eq!(text, "E04: value out of range\r\n");
}

#[test]
fn test_set_clock_invalid_number() {
    let mut sim = SimController::new();
    let (outcome, _) = run_text("set-clock aa 0 0", &mut sim);
    assert_eq!(outcome.error, Some(ConsoleError::InvalidValue));
}

#[test]
fn test_set_date() {
    let mut sim = SimController::new();
    let (outcome, text) = run_text("set-date 28 03 21 7", &mut sim);

    assert_eq!(outcome.error, None);
    assert_eq!(text, "The date has been set to Sunday 28.03.2021");
    assert_eq!(sim.date.packed(), 210_328);
}

#[test]
fn test_set_date_rejects_weekday_zero() {
    let mut sim = SimController::new();
    let (outcome, _) = run_text("set-date 28 03 21 0", &mut sim);
    assert_eq!(outcome.error, Some(ConsoleError::OutOfRange));
}

#[test]
fn test_time_output() {
    let mut sim = SimController::new();
    sim.time = RtcTime::new(7, 5, 9).unwrap();
    let (_, text) = run_text("time-output", &mut sim);
    assert_eq!(text, "07:05:09");
}

#[test]
fn test_rtc_fault_reports_peripheral_error() {
    let mut sim = SimController::new();
    sim.rtc_fault = true;
    let (outcome, text) = run_text("time-output", &mut sim);

    assert_eq!(outcome.error, Some(ConsoleError::Peripheral));
    assert_eq!(text, "E05: peripheral error\r\n");
}

#[test]
fn test_adc_output() {
    let mut sim = SimController::new();
    let (_, text) = run_text("adc-output", &mut sim);

    assert_eq!(
        text,
        "****************************\r\n\
         Wide-Range-Inputvoltage: 12.034 V\r\n\
         LifePo4-Batteryvoltage: 3.312 V [100%]\r\n\
         microUSB-Inputvoltage: not connected\r\n\
         Output-Voltage: 5.121 V\r\n\
         ****************************\r\n"
    );
}

#[test]
fn test_adc_output_charging_battery() {
    let mut sim = SimController::new();
    sim.measurements.charging = true;
    sim.measurements.battery_level = Default::default();
    let (_, text) = run_text("adc-output", &mut sim);

    assert!(text.contains("LifePo4-Batteryvoltage: 3.312 V [charging]\r\n"));
}

#[test]
fn test_adc_output_battery_disconnected() {
    let mut sim = SimController::new();
    sim.measurements.battery.connected = false;
    sim.measurements.charging = true;
    let (_, text) = run_text("adc-output", &mut sim);

    assert!(text.contains("LifePo4-Batteryvoltage: not connected\r\n"));
    assert!(!text.contains("[charging]"));
}

#[test]
fn test_strompi_mode_persists() {
    let mut sim = SimController::new();
    let (outcome, text) = run_text("strompi-mode 5", &mut sim);

    assert_eq!(outcome.error, None);
    assert_eq!(
        text,
        "****************************\r\nMode has been changed\r\n****************************\r\n"
    );
    assert_eq!(sim.config.mode, OperatingMode::MusbWideBattery);
    assert_eq!(sim.persisted.mode, OperatingMode::MusbWideBattery);
    assert_eq!(sim.persist_count, 1);
}

#[test]
fn test_strompi_mode_out_of_range() {
    let mut sim = SimController::new();
    let (outcome, _) = run_text("strompi-mode 7", &mut sim);

    assert_eq!(outcome.error, Some(ConsoleError::OutOfRange));
    assert_eq!(sim.config.mode, OperatingMode::MusbWide);
    assert_eq!(sim.persist_count, 0);
}

#[test]
fn test_strompi_mode_flash_failure() {
    let mut sim = SimController::new();
    sim.flash_fault = true;
    let (outcome, chunks) = run("strompi-mode 2", &mut enabled(), &mut sim);

    assert_eq!(outcome.error, Some(ConsoleError::NvsError));
    assert_eq!(chunks, vec!["E06: flash write failed\r\n".to_string()]);
}

#[test]
fn test_set_config_stores_silently() {
    let mut sim = SimController::new();
    let (outcome, chunks) = run("set-config 13 300", &mut enabled(), &mut sim);

    assert_eq!(outcome.error, None);
    assert_eq!(chunks, vec![String::new()]);
    assert_eq!(sim.config.shutdown_seconds, 300);
    assert_eq!(sim.persist_count, 0);
}

#[test]
fn test_set_config_action_keys() {
    let mut sim = SimController::new();

    run_text("set-config 0 0", &mut sim);
    assert_eq!(sim.persist_count, 1);
    assert_eq!(sim.watchdog_reconfigured, 0);

    run_text("set-config 0 1", &mut sim);
    assert_eq!(sim.persist_count, 2);
    assert_eq!(sim.watchdog_reconfigured, 1);

    run_text("set-config 0 2", &mut sim);
    assert_eq!(sim.serial_less_off_counter, 0);

    run_text("set-config 15 1", &mut sim);
    run_text("set-config 0 2", &mut sim);
    assert_eq!(sim.serial_less_off_counter, 5);
}

#[test]
fn test_set_config_poweroff_mode_drives_regulator() {
    let mut sim = SimController::new();
    sim.wide_regulator = false;
    run_text("set-config 24 1", &mut sim);
    assert!(sim.config.poweroff_mode_enabled);
    assert!(sim.wide_regulator);

    sim.output_status = OutputStatus::Battery;
    run_text("set-config 24 1", &mut sim);
    assert!(!sim.wide_regulator);
}

#[test]
fn test_set_config_rejects_bad_key_and_value() {
    let mut sim = SimController::new();
    let before = sim.config;

    let (outcome, _) = run_text("set-config 27 1", &mut sim);
    assert_eq!(outcome.error, Some(ConsoleError::OutOfRange));

    let (outcome, _) = run_text("set-config 2 9", &mut sim);
    assert_eq!(outcome.error, Some(ConsoleError::OutOfRange));

    assert_eq!(sim.config, before);
}

#[test]
fn test_start_console_banner() {
    let mut sim = SimController::new();
    let mut flags = muted();
    let (_, chunks) = run("sspc", &mut flags, &mut sim);

    assert!(flags.echo_enabled);
    assert_eq!(
        chunks.concat(),
        "\r\n------------------------------\r\n Welcome to the StromPi 3 Console \
         \r\n------------------------------\r\n Type help to view a list of available commands.\r\n\r\n\
         [When you press ENTER the previous command would be executed again]\r\n"
    );
}

#[test]
fn test_quit_disables_echo_and_prints_nothing() {
    let mut sim = SimController::new();
    let mut flags = enabled();
    let (outcome, chunks) = run("quit", &mut flags, &mut sim);

    assert!(!flags.echo_enabled);
    assert_eq!(outcome.chunks, 1);
    assert!(chunks.is_empty());
}

#[test]
fn test_poweroff_message_suppressed_by_muting() {
    let mut sim = SimController::new();
    let mut flags = enabled();
    let (outcome, chunks) = run("poweroff", &mut flags, &mut sim);

    assert!(sim.poweroff_requested);
    assert!(!flags.echo_enabled);
    assert_eq!(outcome.delivered, 0);
    assert!(chunks.is_empty());
}

#[test]
fn test_time_rpi_bypasses_muted_console() {
    let mut sim = SimController::new();
    sim.time = RtcTime::new(23, 59, 59).unwrap();
    let mut flags = muted();
    let (outcome, chunks) = run("time-rpi", &mut flags, &mut sim);

    assert_eq!(outcome.delivered, 1);
    assert_eq!(chunks, vec!["235959".to_string()]);
    assert!(!flags.always_print);
}

#[test]
fn test_date_rpi_bypasses_muted_console() {
    let mut sim = SimController::new();
    sim.date = RtcDate::new(28, 3, 21, 7).unwrap();
    let (_, chunks) = run("date-rpi", &mut muted(), &mut sim);

    assert_eq!(chunks, vec!["210328".to_string()]);
}

#[test]
fn test_script_command_error_still_delivered() {
    let mut sim = SimController::new();
    sim.rtc_fault = true;
    let mut flags = muted();
    let (_, chunks) = run("time-rpi", &mut flags, &mut sim);

    assert_eq!(chunks, vec!["E05: peripheral error\r\n".to_string()]);
    assert!(!flags.always_print);
}

#[test]
fn test_help_streams_every_command() {
    let mut sim = SimController::new();
    let (outcome, chunks) = run("help", &mut enabled(), &mut sim);

    assert_eq!(outcome.chunks, COMMANDS.len());
    assert_eq!(chunks.len(), COMMANDS.len());
    assert_eq!(chunks[0], "help:\r\n Lists all the registered commands\r\n\r\n");
    for (chunk, c) in chunks.iter().zip(COMMANDS) {
        assert_eq!(chunk, c.help);
    }
}

#[test]
fn test_help_muted_delivers_nothing() {
    let mut sim = SimController::new();
    let (outcome, chunks) = run("help", &mut muted(), &mut sim);

    assert_eq!(outcome.chunks, COMMANDS.len());
    assert_eq!(outcome.delivered, 0);
    assert!(chunks.is_empty());
}

#[test]
fn test_show_status() {
    let mut sim = SimController::new();
    run_text("set-config 1 6", &mut sim);
    let (_, text) = run_text("show-status", &mut sim);

    assert!(text.starts_with("\r\n Time: 00:00:00\r\n Date: Saturday 01.01.2000\r\n"));
    assert!(text.contains("\r\n StromPi-Output:  Wide \r\n"));
    assert!(text.contains("\r\n StromPi-Mode: Wide -> mUSB -> Battery \r\n"));
    assert!(text.contains("\r\n  Shutdown-Timer: 10 seconds"));
    assert!(text.contains("\r\n\r\n Battery-Level Shutdown: Disabled"));
    assert!(text.ends_with("\r\n\r\n FirmwareVersion: v1.72c"));
}

#[test]
fn test_show_alarm() {
    let mut sim = SimController::new();
    run_text("set-config 2 1", &mut sim);
    run_text("set-config 5 6", &mut sim);
    run_text("set-config 4 30", &mut sim);
    let (_, text) = run_text("show-alarm", &mut sim);

    assert!(text.contains("\r\n  Alarm-Mode: Time-Alarm "));
    assert!(text.contains("\r\n  Alarm-Time: 06:30"));
    assert!(text.contains("\r\n  Alarm-Weekday: Monday "));
    assert_eq!(text.matches("Minute Wakeup Time").count(), 1);
}

#[test]
fn test_show_alarm_minute_wakeup() {
    let mut sim = SimController::new();
    run_text("set-config 22 1", &mut sim);
    run_text("set-config 23 45", &mut sim);
    let (_, text) = run_text("show-alarm", &mut sim);

    assert!(text.contains("\r\n  Alarm-Mode: Minute Wakeup Alarm "));
    assert!(text.contains("Minute Wakeup Time: 45 minutes"));
}

#[test]
fn test_show_alarm_unset_mode() {
    let mut sim = SimController::new();
    let (_, text) = run_text("show-alarm", &mut sim);
    assert!(text.contains("\r\n  Alarm-Mode: No Alarm "));
}
