use crate::compat::input_event;
use crate::{EventType, KeyCode, SynchronizationCode};
use std::{fmt, mem, slice};

/// A wrapped `libc::input_event`, the fixed-layout record written to a virtual device.
///
/// The timestamp is always zero on the way out; the kernel stamps events itself.
#[derive(Copy, Clone)]
#[repr(transparent)]
pub struct InputEvent(input_event);

impl InputEvent {
    /// Create a new InputEvent. Only really useful for emitting events on virtual devices.
    pub fn new(type_: EventType, code: u16, value: i32) -> Self {
        InputEvent(input_event {
            time: libc::timeval {
                tv_sec: 0,
                tv_usec: 0,
            },
            type_: type_.0,
            code,
            value,
        })
    }

    /// A key event carrying `state` for `key`.
    pub fn key(key: KeyCode, state: KeyState) -> Self {
        Self::new(EventType::KEY, key.code(), state as i32)
    }

    /// The `SYN_REPORT` marker that closes a packet of events.
    pub fn sync_report() -> Self {
        Self::new(
            EventType::SYNCHRONIZATION,
            SynchronizationCode::SYN_REPORT.0,
            0,
        )
    }

    #[inline]
    pub fn event_type(&self) -> EventType {
        EventType(self.0.type_)
    }

    #[inline]
    pub fn code(&self) -> u16 {
        self.0.code
    }

    #[inline]
    pub fn value(&self) -> i32 {
        self.0.value
    }

    /// The `(type, code, value)` triple, which is all a listener can rely on.
    pub fn triple(&self) -> (u16, u16, i32) {
        (self.0.type_, self.0.code, self.0.value)
    }

    pub fn is_sync_report(&self) -> bool {
        self.event_type() == EventType::SYNCHRONIZATION
            && self.code() == SynchronizationCode::SYN_REPORT.0
    }

    /// The raw bytes handed to `write(2)`.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        // Safety: `input_event` is a plain `repr(C)` record with no padding-sensitive invariants
        unsafe {
            slice::from_raw_parts(
                &self.0 as *const input_event as *const u8,
                mem::size_of::<input_event>(),
            )
        }
    }

    /// Reads an event back from the raw bytes of an `input_event`.
    ///
    /// Returns `None` if `bytes` is not exactly one record long.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != mem::size_of::<input_event>() {
            return None;
        }
        // Safety: length checked above; every bit pattern is a valid `input_event`
        let raw = unsafe { std::ptr::read_unaligned(bytes.as_ptr() as *const input_event) };
        Some(InputEvent(raw))
    }
}

impl From<input_event> for InputEvent {
    fn from(raw: input_event) -> Self {
        Self(raw)
    }
}

impl AsRef<input_event> for InputEvent {
    fn as_ref(&self) -> &input_event {
        &self.0
    }
}

/// Timestamps are ignored: two events are equal if a listener could not tell them apart.
impl PartialEq for InputEvent {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}
impl Eq for InputEvent {}

impl fmt::Debug for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("InputEvent");
        debug.field("type", &self.event_type());
        match self.event_type() {
            EventType::KEY => debug.field("code", &KeyCode(self.code())),
            EventType::SYNCHRONIZATION => debug.field("code", &SynchronizationCode(self.code())),
            _ => debug.field("code", &self.code()),
        };
        debug.field("value", &self.value()).finish()
    }
}

/// Value of a key event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum KeyState {
    Released = 0,
    Pressed = 1,
    Repeated = 2,
}
