//! Transport boundary
//!
//! Byte-oriented, half-duplex-safe serial link. The console is the only
//! writer, so exclusivity is a scoped borrow rather than a lock.
//!
//! ```text
//! UART RX ──▶ read() ──▶ Console ──▶ TxGuard ──▶ write_all() ──▶ UART TX
//!             blocks                 waits idle,
//!                                    flushes on drop
//! ```

use embedded_io::{Read, Write};

/// Serial link consumed by the console.
pub trait Transport: Read + Write {
    /// True once the previous transmission has fully drained.
    fn is_idle(&mut self) -> bool;
}

/// Exclusive write access to the transport.
///
/// Acquiring waits for the line to go idle; dropping flushes, on every exit
/// path, so the next writer never interleaves with this one.
pub struct TxGuard<'a, T: Transport> {
    transport: &'a mut T,
}

impl<'a, T: Transport> TxGuard<'a, T> {
    /// Wait for idle and take the writer.
    pub fn acquire(transport: &'a mut T) -> Self {
        while !transport.is_idle() {
            core::hint::spin_loop();
        }
        Self { transport }
    }

    /// Write the whole buffer.
    pub fn write(&mut self, bytes: &[u8]) -> Result<(), T::Error> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.transport.write_all(bytes)
    }
}

impl<T: Transport> Drop for TxGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.transport.flush() {
            log::warn!("[console] transport flush failed: {:?}", e);
        }
    }
}

/// Blocking read of the next byte.
///
/// `None` on end of stream or a read error (logged).
pub fn read_byte<T: Transport>(transport: &mut T) -> Option<u8> {
    let mut byte = [0u8; 1];
    match transport.read(&mut byte) {
        Ok(1) => Some(byte[0]),
        Ok(_) => None,
        Err(e) => {
            log::warn!("[console] transport read failed: {:?}", e);
            None
        }
    }
}
