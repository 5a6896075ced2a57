//! Console session state
//!
//! One instance per console, owned by the line editor. Holds the edit
//! buffer, the line to repeat on an empty ENTER, and the two output gates.

use super::line_buffer::LineBuffer;

/// Output routing flags.
///
/// Split out of [`SessionState`] so handlers can flip them while the line
/// being dispatched is still borrowed from the edit buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    /// Interactive mode: echo, prompts and command output are mirrored.
    pub echo_enabled: bool,
    /// One-shot bypass for script-oriented commands.
    pub always_print: bool,
}

impl SessionFlags {
    /// Gate for handler output. Consumes `always_print`.
    pub fn take_output_gate(&mut self) -> bool {
        let open = self.echo_enabled || self.always_print;
        if open {
            self.always_print = false;
        }
        open
    }
}

/// Session state
pub struct SessionState {
    /// Line being edited
    pub input: LineBuffer,
    /// Last dispatched line, replayed on an empty ENTER
    pub last_line: LineBuffer,
    /// Output gates
    pub flags: SessionFlags,
}

impl SessionState {
    /// Fresh session: empty buffers, console muted
    pub const fn new() -> Self {
        Self {
            input: LineBuffer::new(),
            last_line: LineBuffer::new(),
            flags: SessionFlags {
                echo_enabled: false,
                always_print: false,
            },
        }
    }

    /// Substitute the last line if nothing was typed.
    pub fn prepare_line(&mut self) {
        if self.input.is_empty() {
            self.input.set(self.last_line.as_str());
        }
    }

    /// Remember the dispatched line and reset the edit buffer.
    pub fn finish_line(&mut self) {
        if !self.input.is_empty() {
            self.last_line.set(self.input.as_str());
        }
        self.input.clear();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_gate_consumes_always_print_once() {
        let mut flags = SessionFlags {
            echo_enabled: false,
            always_print: true,
        };
        assert!(flags.take_output_gate());
        assert!(!flags.always_print);
        assert!(!flags.take_output_gate());
    }

    #[test]
    fn test_output_gate_echo_keeps_open() {
        let mut flags = SessionFlags {
            echo_enabled: true,
            always_print: false,
        };
        assert!(flags.take_output_gate());
        assert!(flags.take_output_gate());
    }

    #[test]
    fn test_repeat_with_no_previous_line_stays_empty() {
        let mut session = SessionState::new();
        session.prepare_line();
        assert!(session.input.is_empty());
        session.finish_line();
        assert!(session.last_line.is_empty());
    }
}
