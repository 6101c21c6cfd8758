use crate::{DeviceDescriptor, EventType, InputEvent, KeyCode};
use std::io;
use std::path::PathBuf;

/// The control surface of a virtual input device handle.
///
/// [`UinputBackend`](crate::uinput::UinputBackend) talks to the kernel;
/// [`RecordingBackend`](crate::recording::RecordingBackend) only records what it was asked to do.
/// Implementations do not enforce ordering; [`Session`](crate::Session) does.
pub trait Backend {
    /// `UI_SET_EVBIT`: allow events of `event_type`.
    fn enable_event_type(&mut self, event_type: EventType) -> io::Result<()>;

    /// `UI_SET_KEYBIT`: allow `key` within the key event type.
    fn enable_key(&mut self, key: KeyCode) -> io::Result<()>;

    /// `UI_DEV_SETUP`.
    fn setup(&mut self, descriptor: &DeviceDescriptor) -> io::Result<()>;

    /// `UI_DEV_CREATE`.
    fn create(&mut self) -> io::Result<()>;

    /// Writes one event record, returning the number of bytes accepted.
    fn write_event(&mut self, event: &InputEvent) -> io::Result<usize>;

    /// The evdev node listeners can open, once the kernel has made one.
    fn device_node(&mut self) -> io::Result<Option<PathBuf>>;

    /// `UI_DEV_DESTROY`.
    fn destroy(&mut self) -> io::Result<()>;

    /// Closes the handle. Every other call fails afterwards.
    fn release(&mut self) -> io::Result<()>;
}
