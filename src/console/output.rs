//! Output chunk buffer
//!
//! One transmission unit of handler output. Writes past the capacity are
//! truncated instead of failing, so a long report never aborts a handler.

use core::fmt;
use heapless::String;

/// Capacity of one output chunk (bytes).
pub const OUTPUT_CAPACITY: usize = 1024;

/// Bounded, truncating output chunk
pub struct OutputBuffer<const N: usize = OUTPUT_CAPACITY> {
    buf: String<N>,
    truncated: bool,
}

impl<const N: usize> OutputBuffer<N> {
    /// Create empty chunk
    pub const fn new() -> Self {
        Self {
            buf: String::new(),
            truncated: false,
        }
    }

    /// Reset before the next handler call
    pub fn clear(&mut self) {
        self.buf.clear();
        self.truncated = false;
    }

    /// Chunk contents
    pub fn as_str(&self) -> &str {
        self.buf.as_str()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// True if some output did not fit
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// Build-time capacity
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for OutputBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for OutputBuffer<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.buf.push_str(s).is_ok() {
            return Ok(());
        }
        for c in s.chars() {
            if self.buf.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn test_truncates_instead_of_failing() {
        let mut out = OutputBuffer::<8>::new();
        assert!(write!(out, "0123456789").is_ok());
        assert_eq!(out.as_str(), "01234567");
        assert!(out.was_truncated());
    }

    #[test]
    fn test_clear_resets_truncation() {
        let mut out = OutputBuffer::<4>::new();
        let _ = out.write_str("abcdef");
        out.clear();
        assert!(out.is_empty());
        assert!(!out.was_truncated());
    }
}
