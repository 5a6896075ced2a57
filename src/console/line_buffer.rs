//! Bounded line buffer for console input
//!
//! Static allocation, capacity fixed at build time. Bytes pushed past the
//! capacity are dropped without touching the buffer.

/// Maximum accepted command line length (bytes).
pub const INPUT_CAPACITY: usize = 50;

/// Line input buffer
pub struct LineBuffer<const N: usize = INPUT_CAPACITY> {
    buf: [u8; N],
    /// Cursor position, always equal to the number of stored bytes
    len: usize,
}

impl<const N: usize> LineBuffer<N> {
    /// Create empty buffer
    pub const fn new() -> Self {
        Self {
            buf: [0u8; N],
            len: 0,
        }
    }

    /// Append a byte at the cursor.
    ///
    /// Returns `false` (and leaves the buffer untouched) when full.
    pub fn push(&mut self, c: u8) -> bool {
        if self.len < N {
            self.buf[self.len] = c;
            self.len += 1;
            true
        } else {
            false
        }
    }

    /// Erase the trailing byte. No-op on an empty buffer.
    pub fn backspace(&mut self) -> bool {
        if self.len > 0 {
            self.len -= 1;
            self.buf[self.len] = 0;
            true
        } else {
            false
        }
    }

    /// Clear buffer
    pub fn clear(&mut self) {
        self.buf[..self.len].fill(0);
        self.len = 0;
    }

    /// Replace contents, truncating to capacity
    pub fn set(&mut self, s: &str) {
        self.clear();
        let bytes = s.as_bytes();
        let copy_len = bytes.len().min(N);
        self.buf[..copy_len].copy_from_slice(&bytes[..copy_len]);
        self.len = copy_len;
    }

    /// Get buffer as string slice
    ///
    /// Only printable ASCII is ever pushed by the line editor, so this is
    /// lossless in practice.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Cursor position
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if full
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Build-time capacity
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for LineBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backspace_zeroes_trailing_byte() {
        let mut buf = LineBuffer::<4>::new();
        buf.push(b'a');
        buf.push(b'b');
        assert!(buf.backspace());
        assert_eq!(buf.buf, [b'a', 0, 0, 0]);
    }

    #[test]
    fn test_push_reports_full() {
        let mut buf = LineBuffer::<2>::new();
        assert!(buf.push(b'x'));
        assert!(buf.push(b'y'));
        assert!(!buf.push(b'z'));
        assert!(buf.is_full());
        assert_eq!(buf.as_str(), "xy");
    }
}
