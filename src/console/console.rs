//! Line editor: the console state machine

use super::commands::{dispatch, DispatchOutcome};
use super::output::OutputBuffer;
use super::session::SessionState;
use super::transport::{read_byte, Transport, TxGuard};
use crate::hal::PowerController;

/// Written after the typed line, before the command runs
const NEWLINE: &[u8] = b"\r\n";
/// Written once the command has finished
const END_OF_OUTPUT: &[u8] = b"\r\n>";

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// Console bound to one transport and one power controller
pub struct Console<T: Transport, P: PowerController> {
    transport: T,
    controller: P,
    session: SessionState,
    output: OutputBuffer,
}

impl<T: Transport, P: PowerController> Console<T, P> {
    /// Create a muted console. `startstrompiconsole` turns echo on.
    pub fn new(transport: T, controller: P) -> Self {
        Self {
            transport,
            controller,
            session: SessionState::new(),
            output: OutputBuffer::new(),
        }
    }

    /// Process a single input byte
    ///
    /// Returns the dispatch outcome when the byte completed a line.
    pub fn process_byte(&mut self, byte: u8) -> Option<DispatchOutcome> {
        if self.session.flags.echo_enabled {
            transmit(&mut self.transport, &[byte]);
        }

        match byte {
            b'\r' => Some(self.complete_line()),
            BACKSPACE | DELETE => {
                self.session.input.backspace();
                None
            }
            // Dropped silently once the buffer is full
            0x20..=0x7E => {
                self.session.input.push(byte);
                None
            }
            _ => None,
        }
    }

    fn complete_line(&mut self) -> DispatchOutcome {
        if self.session.flags.echo_enabled {
            transmit(&mut self.transport, NEWLINE);
        }

        self.session.prepare_line();

        let Self {
            transport,
            controller,
            session,
            output,
        } = &mut *self;
        let outcome = dispatch(
            session.input.as_str(),
            &mut session.flags,
            controller,
            output,
            |chunk| transmit(transport, chunk.as_bytes()),
        );

        session.finish_line();

        // Read after dispatch: `quit` and `sspc` take effect here
        if self.session.flags.echo_enabled {
            transmit(&mut self.transport, END_OF_OUTPUT);
        }

        outcome
    }

    /// Wait for one byte and process it
    pub fn poll(&mut self) -> Option<DispatchOutcome> {
        let byte = read_byte(&mut self.transport)?;
        self.process_byte(byte)
    }

    /// Serve the console forever
    pub fn run(&mut self) -> ! {
        log::info!("[console] ready");
        loop {
            if let Some(outcome) = self.poll() {
                log::trace!("[console] {:?}", outcome);
            }
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn controller(&self) -> &P {
        &self.controller
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}

/// Write through the exclusive-write guard. Failures are logged only.
fn transmit<T: Transport>(transport: &mut T, bytes: &[u8]) {
    let mut tx = TxGuard::acquire(transport);
    if let Err(e) = tx.write(bytes) {
        log::warn!("[console] transport write failed: {:?}", e);
    }
}
