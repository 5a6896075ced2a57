//! Serial command console
//!
//! One session, one transport, one command at a time.
//! Zero heap allocation - all buffers are fixed size.

pub mod commands;
#[allow(clippy::module_inception)]
pub mod console;
pub mod error;
pub mod line_buffer;
pub mod output;
pub mod parser;
pub mod session;
pub mod status;
pub mod transport;

pub use commands::{dispatch, command_names, Completion, DispatchOutcome, COMMANDS};
pub use console::Console;
pub use error::ConsoleError;
pub use line_buffer::{LineBuffer, INPUT_CAPACITY};
pub use output::{OutputBuffer, OUTPUT_CAPACITY};
pub use parser::{parse_line, ParsedCommand};
pub use session::{SessionFlags, SessionState};
pub use status::{StatusRecord, STATUS_FIELD_COUNT};
pub use transport::{Transport, TxGuard};
