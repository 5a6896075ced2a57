//! StromPi console - main entry point
//!
//! On the ESP32-S3 the console is served on UART0 at 38400 baud, with the
//! configuration kept in NVS. On the host the same console runs against
//! the simulated board over stdin/stdout, which is handy for trying out
//! scripts that talk to the real device.

use strompi_console::VERSION;

#[cfg(target_os = "espidf")]
mod firmware {
    use esp_idf_svc::hal::delay::BLOCK;
    use esp_idf_svc::hal::gpio::AnyIOPin;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::uart::{config::Config, UartDriver};
    use esp_idf_svc::hal::units::Hertz;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::sys::EspError;
    use thiserror::Error;

    use strompi_console::config::nvs::{ConfigStore, LoadResult, NvsError};
    use strompi_console::config::{PowerConfig, CONSOLE_BAUD_RATE};
    use strompi_console::hal::Board;
    use strompi_console::{Console, Transport};

    #[derive(Debug, Error)]
    #[error("uart: {0}")]
    pub struct UartError(EspError);

    impl embedded_io::Error for UartError {
        fn kind(&self) -> embedded_io::ErrorKind {
            embedded_io::ErrorKind::Other
        }
    }

    /// UART0 as console transport
    pub struct UartTransport<'d> {
        uart: UartDriver<'d>,
    }

    impl embedded_io::ErrorType for UartTransport<'_> {
        type Error = UartError;
    }

    impl embedded_io::Read for UartTransport<'_> {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            self.uart.read(buf, BLOCK).map_err(UartError)
        }
    }

    impl embedded_io::Write for UartTransport<'_> {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.uart.write(buf).map_err(UartError)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            self.uart.wait_tx_done(BLOCK).map_err(UartError)
        }
    }

    impl Transport for UartTransport<'_> {
        fn is_idle(&mut self) -> bool {
            self.uart.wait_tx_done(0).is_ok()
        }
    }

    /// Open NVS and load the stored configuration into `config`.
    ///
    /// `None` when flash cannot be opened; the console still starts and
    /// reports `E06` whenever a setting is persisted.
    fn open_store(config: &mut PowerConfig) -> Option<ConfigStore> {
        let store = match EspDefaultNvsPartition::take()
            .map_err(NvsError::InitFailed)
            .and_then(ConfigStore::open)
        {
            Ok(store) => store,
            Err(e) => {
                log::error!("NVS unavailable, settings will not be saved: {}", e);
                return None;
            }
        };
        match store.load(config) {
            Ok(LoadResult::FreshInstall) => log::info!("No stored config, using defaults"),
            Ok(LoadResult::UpToDate) => log::info!("Config loaded from NVS"),
            Err(e) => log::warn!("Config load failed, using defaults: {}", e),
        }
        Some(store)
    }

    pub fn run() -> Result<(), EspError> {
        let peripherals = Peripherals::take()?;

        let mut power_config = PowerConfig::default();
        let store = open_store(&mut power_config);

        let config = Config::default().baudrate(Hertz(CONSOLE_BAUD_RATE));
        let uart = UartDriver::new(
            peripherals.uart0,
            peripherals.pins.gpio43,
            peripherals.pins.gpio44,
            Option::<AnyIOPin>::None,
            Option::<AnyIOPin>::None,
            &config,
        )?;

        let mut console = Console::new(UartTransport { uart }, Board::new(power_config, store));
        console.run()
    }
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::io::{self, Read as _, Write as _};

    use thiserror::Error;

    use strompi_console::Transport;

    #[derive(Debug, Error)]
    #[error("stdio: {0}")]
    pub struct StdioError(#[from] io::Error);

    impl embedded_io::Error for StdioError {
        fn kind(&self) -> embedded_io::ErrorKind {
            embedded_io::ErrorKind::Other
        }
    }

    /// stdin/stdout as console transport. Enter sends `\n`, the console
    /// terminates lines on `\r`.
    pub struct StdioTransport {
        stdin: io::Stdin,
        stdout: io::Stdout,
        closed: bool,
    }

    impl StdioTransport {
        pub fn new() -> Self {
            Self {
                stdin: io::stdin(),
                stdout: io::stdout(),
                closed: false,
            }
        }

        /// stdin reached end of file or failed
        pub fn closed(&self) -> bool {
            self.closed
        }
    }

    impl embedded_io::ErrorType for StdioTransport {
        type Error = StdioError;
    }

    impl embedded_io::Read for StdioTransport {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let n = self.stdin.read(buf).inspect_err(|_| self.closed = true)?;
            if n == 0 && !buf.is_empty() {
                self.closed = true;
            }
            for b in &mut buf[..n] {
                if *b == b'\n' {
                    *b = b'\r';
                }
            }
            Ok(n)
        }
    }

    impl embedded_io::Write for StdioTransport {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            Ok(self.stdout.write(buf)?)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(self.stdout.flush()?)
        }
    }

    impl Transport for StdioTransport {
        fn is_idle(&mut self) -> bool {
            true
        }
    }
}

#[cfg(target_os = "espidf")]
fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("{}", VERSION);

    if let Err(e) = firmware::run() {
        log::error!("Startup failed: {}", e);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    use strompi_console::{Console, SimController};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("{} (simulated board)", VERSION);
    log::info!("Type 'sspc' to enable the console, 'quit' to mute it");

    let mut console = Console::new(host::StdioTransport::new(), SimController::new());
    while !console.transport().closed() {
        if let Some(outcome) = console.poll() {
            log::debug!("{:?}", outcome);
        }
    }
}
