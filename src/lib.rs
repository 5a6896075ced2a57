//! # StromPi Console
//!
//! Serial command console of the StromPi 3 power controller.
//!
//! ## Architecture
//!
//! Bytes arrive one at a time from a [`console::Transport`]. The line
//! editor accumulates them, and on carriage return the dispatcher resolves
//! the line against a static command table and streams handler output back
//! in chunks. Handlers reach the board only through
//! [`hal::PowerController`].
//!
//! - Echo and framing are written only while the console is enabled
//! - Handler output also passes when a script command sets always-print
//! - Nothing escalates: errors are rendered as `Exx` lines

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod console;
pub mod hal;

pub use config::{PowerConfig, FIRMWARE_VERSION};
pub use console::{Console, ConsoleError, Transport};
pub use hal::{PowerController, SimController};

/// Build identifier (set by build.rs, includes git hash)
pub const VERSION: &str = env!("VERSION_STRING");
