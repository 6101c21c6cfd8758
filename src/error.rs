use crate::session::{Operation, SessionState};
use crate::KeyCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while driving a virtual device.
#[derive(Debug, Error)]
pub enum Error {
    /// The uinput interface could not be opened.
    #[error("could not open {}: {source}{}", .path.display(), privilege_hint(.source))]
    Acquisition {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A capability registration ioctl was rejected.
    #[error("setting up fd: could not enable {what}: {source}")]
    Capability {
        what: String,
        #[source]
        source: io::Error,
    },
    #[error("could not configure device identity: {0}")]
    Setup(#[source] io::Error),
    #[error("could not create device node: {0}")]
    Create(#[source] io::Error),
    #[error("could not write event: {0}")]
    Write(#[source] io::Error),
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[error("could not destroy device node: {0}")]
    Destroy(#[source] io::Error),
    #[error("could not release uinput handle: {0}")]
    Release(#[source] io::Error),
    #[error("invalid device name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("{key:?} was not declared as a capability")]
    UndeclaredKey { key: KeyCode },
    #[error("cannot {operation} while the session is {from}")]
    InvalidTransition {
        from: SessionState,
        operation: Operation,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn privilege_hint(err: &io::Error) -> &'static str {
    match err.kind() {
        io::ErrorKind::PermissionDenied => " (requires root, or a udev rule granting access)",
        io::ErrorKind::NotFound => " (is the uinput kernel module loaded?)",
        _ => "",
    }
}
