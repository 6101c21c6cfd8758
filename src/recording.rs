//! A [`Backend`] that records calls instead of making them.
//!
//! Backs `--dry-run`, and lets tests assert the exact order of operations a session performs,
//! including what happens when one of them fails.

use crate::backend::Backend;
use crate::{DeviceDescriptor, EventType, InputEvent, InputId, KeyCode};
use std::cell::RefCell;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// One operation observed on the device handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Open(PathBuf),
    EnableEventType(EventType),
    EnableKey(KeyCode),
    Setup { id: InputId, name: String },
    Create,
    Write(InputEvent),
    DeviceNode,
    Destroy,
    Release,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::Open(path) => write!(f, "open {}", path.display()),
            Call::EnableEventType(ty) => write!(f, "UI_SET_EVBIT {ty:?}"),
            Call::EnableKey(key) => write!(f, "UI_SET_KEYBIT {key:?}"),
            Call::Setup { id, name } => write!(f, "UI_DEV_SETUP {name:?} ({id})"),
            Call::Create => f.write_str("UI_DEV_CREATE"),
            Call::Write(event) => write!(f, "write {event:?}"),
            Call::DeviceNode => f.write_str("UI_GET_SYSNAME"),
            Call::Destroy => f.write_str("UI_DEV_DESTROY"),
            Call::Release => f.write_str("close"),
        }
    }
}

/// The shared log of calls. Clones see the same log.
#[derive(Clone, Debug, Default)]
pub struct Trace(Rc<RefCell<Vec<Call>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    /// Only the events written, in order.
    pub fn events(&self) -> Vec<InputEvent> {
        self.0
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Write(event) => Some(*event),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: Call) {
        log::trace!("{call}");
        self.0.borrow_mut().push(call);
    }
}

type FailWhen = Box<dyn Fn(&Call) -> bool>;

pub struct RecordingBackend {
    trace: Trace,
    fail_when: Option<FailWhen>,
    node: Option<PathBuf>,
    released: bool,
}

impl RecordingBackend {
    /// "Opens" `path`, recording it in `trace`.
    pub fn open(path: impl AsRef<Path>, trace: &Trace) -> Self {
        trace.push(Call::Open(path.as_ref().to_owned()));
        Self {
            trace: trace.clone(),
            fail_when: None,
            node: None,
            released: false,
        }
    }

    /// Makes every call matching `predicate` fail with `EINVAL`. The call is still recorded.
    pub fn fail_when(mut self, predicate: impl Fn(&Call) -> bool + 'static) -> Self {
        self.fail_when = Some(Box::new(predicate));
        self
    }

    /// The node reported by [`Backend::device_node`] once the device exists.
    pub fn with_device_node(mut self, node: impl Into<PathBuf>) -> Self {
        self.node = Some(node.into());
        self
    }

    fn record(&mut self, call: Call) -> io::Result<()> {
        if self.released {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "uinput handle already released",
            ));
        }
        let fail = self.fail_when.as_ref().map_or(false, |f| f(&call));
        self.trace.push(call);
        if fail {
            Err(io::Error::from_raw_os_error(libc::EINVAL))
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for RecordingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingBackend")
            .field("trace", &self.trace)
            .field("node", &self.node)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl Backend for RecordingBackend {
    fn enable_event_type(&mut self, event_type: EventType) -> io::Result<()> {
        self.record(Call::EnableEventType(event_type))
    }

    fn enable_key(&mut self, key: KeyCode) -> io::Result<()> {
        self.record(Call::EnableKey(key))
    }

    fn setup(&mut self, descriptor: &DeviceDescriptor) -> io::Result<()> {
        self.record(Call::Setup {
            id: descriptor.id(),
            name: descriptor.name().to_owned(),
        })
    }

    fn create(&mut self) -> io::Result<()> {
        self.record(Call::Create)
    }

    fn write_event(&mut self, event: &InputEvent) -> io::Result<usize> {
        self.record(Call::Write(*event))?;
        Ok(event.as_bytes().len())
    }

    fn device_node(&mut self) -> io::Result<Option<PathBuf>> {
        self.record(Call::DeviceNode)?;
        Ok(self.node.clone())
    }

    fn destroy(&mut self) -> io::Result<()> {
        self.record(Call::Destroy)
    }

    fn release(&mut self) -> io::Result<()> {
        let result = self.record(Call::Release);
        self.released = true;
        result
    }
}
