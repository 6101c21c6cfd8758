//! Synthetic keyboard input through a Linux uinput virtual device.
//!
//! The kernel's uinput interface (`/dev/uinput`) lets a process register a device of its own.
//! Once created, it shows up under `/dev/input` like any physical keyboard, and whatever events
//! the process writes into the handle are delivered to everyone listening on that node.
//!
//! Driving such a device is a strictly ordered affair, captured by [`Session`]:
//!
//! 1. open the interface,
//! 2. declare which event types and key codes the device may emit,
//! 3. hand over its identity ([`DeviceDescriptor`]) and create it,
//! 4. give listeners a moment to attach,
//! 5. write events, following every change with a `SYN_REPORT` so listeners see it,
//! 6. destroy the device and close the handle.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use uinput_keyboard::{DeviceDescriptor, KeyCode, KeySet, Session, SessionConfig};
//!
//! let keys: KeySet = [KeyCode::KEY_1, KeyCode::KEY_2].iter().collect();
//! let mut session = Session::acquire_default(SessionConfig::default())?;
//! session.run(&keys, &DeviceDescriptor::default(), KeyCode::KEY_1)?;
//! # Ok(())
//! # }
//! ```
//!
//! The kernel calls sit behind the [`Backend`] trait. [`recording::RecordingBackend`] stands
//! in for the kernel to see what a session would do without touching `/dev/uinput`.

#![cfg(any(unix, target_os = "android"))]
#![allow(non_camel_case_types)]

// has to be first for its macro
#[macro_use]
mod macros;

mod backend;
mod compat;
mod constants;
mod descriptor;
mod error;
mod event;
mod inputid;
mod key_set;
pub mod recording;
pub mod session;
mod sys;
pub mod uinput;
pub mod wait;

use std::fmt;
use std::io;

pub use backend::Backend;
pub use constants::*;
pub use descriptor::DeviceDescriptor;
pub use error::{Error, Result};
pub use event::{InputEvent, KeyState};
pub use inputid::*;
pub use key_set::KeySet;
pub use session::{FailurePolicy, RunOutcome, Session, SessionConfig, SessionState, SettlePolicy};

/// The keys the demonstration device declares.
pub const DEMO_KEYS: [KeyCode; 2] = [KeyCode::KEY_1, KeyCode::KEY_2];

/// The key pressed and released by the demonstration.
pub const DEMO_KEY: KeyCode = KeyCode::KEY_1;

/// Returned when a name does not match any known code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumParseError(());

impl fmt::Display for EnumParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown code name")
    }
}

impl std::error::Error for EnumParseError {}

pub(crate) fn nix_err(err: nix::Error) -> io::Error {
    io::Error::from_raw_os_error(err as i32)
}
