//! Shared test transport and helpers

#![allow(dead_code)]

use std::collections::VecDeque;

use embedded_io::ErrorKind;

use strompi_console::console::{Console, DispatchOutcome, Transport};
use strompi_console::{PowerController, SimController};

/// Records everything written; reports busy for `busy_polls` idle queries.
///
/// Reads are served from `rx`: `Some(byte)` delivers the byte, `None` fails
/// the read. An empty queue reads as end of stream.
#[derive(Default)]
pub struct MockTransport {
    pub rx: VecDeque<Option<u8>>,
    pub tx: Vec<u8>,
    pub writes: usize,
    pub flushes: usize,
    pub busy_polls: u32,
}

impl MockTransport {
    /// Queue bytes to be read
    pub fn receive(&mut self, input: &str) {
        self.rx.extend(input.bytes().map(Some));
    }

    /// Queue a failing read
    pub fn receive_error(&mut self) {
        self.rx.push_back(None);
    }
}

impl embedded_io::ErrorType for MockTransport {
    type Error = ErrorKind;
}

impl embedded_io::Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.rx.pop_front() {
            Some(Some(byte)) => {
                buf[0] = byte;
                Ok(1)
            }
            Some(None) => Err(ErrorKind::Other),
            None => Ok(0),
        }
    }
}

impl embedded_io::Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.tx.extend_from_slice(buf);
        self.writes += 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushes += 1;
        Ok(())
    }
}

impl Transport for MockTransport {
    fn is_idle(&mut self) -> bool {
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            false
        } else {
            true
        }
    }
}

pub type TestConsole = Console<MockTransport, SimController>;

/// Muted console on a fresh simulated board
pub fn console() -> TestConsole {
    Console::new(MockTransport::default(), SimController::new())
}

/// Console that has already been enabled with `sspc`, output cleared
pub fn enabled_console() -> TestConsole {
    let mut c = console();
    feed(&mut c, "sspc\r");
    take_output(&mut c);
    c
}

/// Feed bytes, collecting one outcome per completed line
pub fn feed<P: PowerController>(
    console: &mut Console<MockTransport, P>,
    input: &str,
) -> Vec<DispatchOutcome> {
    input
        .bytes()
        .filter_map(|b| console.process_byte(b))
        .collect()
}

/// Drain the transmitted bytes as text
pub fn take_output<P: PowerController>(console: &mut Console<MockTransport, P>) -> String {
    let tx = core::mem::take(&mut console.transport_mut().tx);
    String::from_utf8(tx).unwrap()
}
