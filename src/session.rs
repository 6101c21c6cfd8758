//! The lifecycle of a single virtual device.
//!
//! A [`Session`] owns one device handle and walks it strictly forward:
//!
//! ```text
//! Opened --declare_capabilities--> Configured --configure_identity--> Identified
//!        --create--> Created --(settle, emit*, hold)--> Created --destroy--> Released
//! ```
//!
//! Calling an operation in any other state fails with [`Error::InvalidTransition`] and leaves
//! the session untouched. There is no `Unopened` state: a session only exists once its handle
//! has been acquired.
//!
//! Dropping a session releases its handle on every path, destroying the device first if it was
//! created.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::uinput::{UinputBackend, UINPUT_PATH};
use crate::wait::{self, CancelToken, WaitOutcome, POLL_INTERVAL};
use crate::{DeviceDescriptor, EventType, InputEvent, KeySet, KeyCode, KeyState};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Handle open, nothing registered yet.
    Opened,
    /// Capabilities registered.
    Configured,
    /// Identity handed to the kernel.
    Identified,
    /// Device node exists; events may be emitted.
    Created,
    /// Device destroyed and handle closed.
    Released,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Opened => "opened",
            SessionState::Configured => "configured",
            SessionState::Identified => "identified",
            SessionState::Created => "created",
            SessionState::Released => "released",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    DeclareCapabilities,
    ConfigureIdentity,
    Create,
    Settle,
    Emit,
    Hold,
    Destroy,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::DeclareCapabilities => "declare capabilities",
            Operation::ConfigureIdentity => "configure identity",
            Operation::Create => "create",
            Operation::Settle => "settle",
            Operation::Emit => "emit",
            Operation::Hold => "hold",
            Operation::Destroy => "destroy",
        })
    }
}

/// What to do when identity setup, creation, an event write or destruction fails.
///
/// Acquisition and capability registration are fatal regardless.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Return the first failure.
    #[default]
    Abort,
    /// Log the failure and carry on as if the call had succeeded.
    LogAndContinue,
}

/// How long to wait between creating the device and emitting into it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SettlePolicy {
    /// Sleep unconditionally.
    Fixed(Duration),
    /// Poll until the kernel has published the evdev node, giving up after `timeout`.
    WaitForNode { timeout: Duration },
}

impl Default for SettlePolicy {
    fn default() -> Self {
        SettlePolicy::Fixed(Duration::from_secs(1))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub settle: SettlePolicy,
    /// How long the device stays up after emitting.
    pub hold: Duration,
    pub policy: FailurePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle: SettlePolicy::default(),
            hold: Duration::from_secs(300),
            policy: FailurePolicy::default(),
        }
    }
}

/// How [`Session::run`] ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// Cancelled while settling; nothing was emitted.
    CancelledBeforeEmit,
    /// Cancelled while holding; the device was destroyed early.
    CancelledDuringHold,
}

pub struct Session<B: Backend> {
    backend: B,
    state: SessionState,
    keys: KeySet,
    config: SessionConfig,
    cancel: CancelToken,
}

impl Session<UinputBackend> {
    /// Opens the uinput interface at `path` and starts a session on it.
    pub fn acquire(path: impl AsRef<Path>, config: SessionConfig) -> Result<Self> {
        let backend = UinputBackend::open(path)?;
        Ok(Session::with_backend(backend, config))
    }

    /// [`Session::acquire`] on [`UINPUT_PATH`].
    pub fn acquire_default(config: SessionConfig) -> Result<Self> {
        Self::acquire(UINPUT_PATH, config)
    }
}

impl<B: Backend> Session<B> {
    /// Starts a session on an already-open handle.
    pub fn with_backend(backend: B, config: SessionConfig) -> Self {
        log::debug!("session opened: {config:?}");
        Session {
            backend,
            state: SessionState::Opened,
            keys: KeySet::new(),
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Uses `token` to interrupt settle and hold.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Keys registered by [`Session::declare_capabilities`].
    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    fn expect_state(&self, expected: SessionState, operation: Operation) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.state,
                operation,
            })
        }
    }

    /// Applies the failure policy to a call whose failure is not inherently fatal.
    fn checked(&self, result: Result<()>) -> Result<()> {
        match (result, self.config.policy) {
            (Ok(()), _) => Ok(()),
            (Err(e), FailurePolicy::Abort) => Err(e),
            (Err(e), FailurePolicy::LogAndContinue) => {
                log::warn!("{e}; continuing");
                Ok(())
            }
        }
    }

    /// Registers the key event type and then every key in `keys`, in ascending order.
    ///
    /// Every registration is checked; the first failure ends the session's progress.
    pub fn declare_capabilities(&mut self, keys: &KeySet) -> Result<()> {
        self.expect_state(SessionState::Opened, Operation::DeclareCapabilities)?;

        self.backend
            .enable_event_type(EventType::KEY)
            .map_err(|source| Error::Capability {
                what: "key events".to_owned(),
                source,
            })?;
        for key in keys.iter() {
            self.backend
                .enable_key(key)
                .map_err(|source| Error::Capability {
                    what: format!("{key:?}"),
                    source,
                })?;
        }

        self.keys = keys.clone();
        self.state = SessionState::Configured;
        log::info!("declared {} key(s): {:?}", keys.len(), keys);
        Ok(())
    }

    pub fn configure_identity(&mut self, descriptor: &DeviceDescriptor) -> Result<()> {
        self.expect_state(SessionState::Configured, Operation::ConfigureIdentity)?;
        let result = self.backend.setup(descriptor).map_err(Error::Setup);
        self.checked(result)?;
        self.state = SessionState::Identified;
        log::info!("identity set: {:?} ({})", descriptor.name(), descriptor.id());
        Ok(())
    }

    /// Creates the device node. From here on the device is visible to other processes.
    pub fn create(&mut self) -> Result<()> {
        self.expect_state(SessionState::Identified, Operation::Create)?;
        let result = self.backend.create().map_err(Error::Create);
        self.checked(result)?;
        self.state = SessionState::Created;
        log::info!("device created");
        Ok(())
    }

    /// Gives listeners a chance to discover and open the new device before anything is sent.
    pub fn settle(&mut self) -> Result<WaitOutcome> {
        self.expect_state(SessionState::Created, Operation::Settle)?;
        let outcome = match self.config.settle {
            SettlePolicy::Fixed(duration) => {
                log::debug!("settling for {duration:?}");
                wait::sleep(duration, &self.cancel)
            }
            SettlePolicy::WaitForNode { timeout } => self.wait_for_node(timeout)?,
        };
        log::debug!("settle: {outcome:?}");
        Ok(outcome)
    }

    fn wait_for_node(&mut self, timeout: Duration) -> Result<WaitOutcome> {
        let mut node: Option<PathBuf> = None;
        let backend = &mut self.backend;
        let outcome = wait::poll_until(timeout, POLL_INTERVAL, &self.cancel, || {
            node = backend.device_node()?;
            Ok(node.is_some())
        })?;
        match (&outcome, node) {
            (WaitOutcome::Ready, Some(node)) => log::info!("device node {}", node.display()),
            (WaitOutcome::TimedOut, _) => {
                log::warn!("no device node after {timeout:?}; emitting anyway")
            }
            _ => {}
        }
        Ok(outcome)
    }

    /// Writes a single event in one call.
    pub fn emit(&mut self, event: InputEvent) -> Result<()> {
        self.expect_state(SessionState::Created, Operation::Emit)?;
        log::debug!("emit {event:?}");
        let result = self.write(&event);
        self.checked(result)
    }

    fn write(&mut self, event: &InputEvent) -> Result<()> {
        let expected = event.as_bytes().len();
        let written = self.backend.write_event(event).map_err(Error::Write)?;
        if written != expected {
            return Err(Error::ShortWrite { written, expected });
        }
        Ok(())
    }

    /// Emits `key` in `state`, followed by the `SYN_REPORT` that makes listeners see it.
    pub fn emit_key(&mut self, key: KeyCode, state: KeyState) -> Result<()> {
        self.expect_state(SessionState::Created, Operation::Emit)?;
        if !self.keys.contains(key) {
            return Err(Error::UndeclaredKey { key });
        }
        self.emit(InputEvent::key(key, state))?;
        self.emit(InputEvent::sync_report())
    }

    pub fn press(&mut self, key: KeyCode) -> Result<()> {
        self.emit_key(key, KeyState::Pressed)
    }

    pub fn release(&mut self, key: KeyCode) -> Result<()> {
        self.emit_key(key, KeyState::Released)
    }

    /// Keeps the device alive for the configured hold time, or until cancelled.
    pub fn hold(&mut self) -> Result<WaitOutcome> {
        self.expect_state(SessionState::Created, Operation::Hold)?;
        log::info!("holding device for {:?}", self.config.hold);
        let outcome = wait::sleep(self.config.hold, &self.cancel);
        if outcome == WaitOutcome::Cancelled {
            log::info!("hold cancelled");
        }
        Ok(outcome)
    }

    /// Destroys the device node, then closes the handle.
    pub fn destroy(&mut self) -> Result<()> {
        self.expect_state(SessionState::Created, Operation::Destroy)?;
        let result = self.backend.destroy().map_err(Error::Destroy);
        if let Err(e) = self.checked(result) {
            // the handle is closed either way
            self.close();
            return Err(e);
        }
        let result = self.release_handle();
        self.checked(result)?;
        log::info!("device destroyed");
        Ok(())
    }

    fn release_handle(&mut self) -> Result<()> {
        self.state = SessionState::Released;
        self.backend.release().map_err(Error::Release)
    }

    fn close(&mut self) {
        if let Err(e) = self.release_handle() {
            log::warn!("{e}");
        }
    }

    /// The whole demonstration: declare `keys`, configure and create the device, settle, press
    /// and release `key`, hold, destroy.
    ///
    /// A cancelled settle skips emission; a cancelled hold ends early. Either way the device is
    /// destroyed before returning.
    pub fn run(
        &mut self,
        keys: &KeySet,
        descriptor: &DeviceDescriptor,
        key: KeyCode,
    ) -> Result<RunOutcome> {
        self.declare_capabilities(keys)?;
        self.configure_identity(descriptor)?;
        self.create()?;

        let outcome = if self.settle()? == WaitOutcome::Cancelled {
            RunOutcome::CancelledBeforeEmit
        } else {
            self.press(key)?;
            self.release(key)?;
            match self.hold()? {
                WaitOutcome::Cancelled => RunOutcome::CancelledDuringHold,
                _ => RunOutcome::Completed,
            }
        };

        self.destroy()?;
        Ok(outcome)
    }
}

impl<B: Backend> Drop for Session<B> {
    fn drop(&mut self) {
        match self.state {
            SessionState::Released => {}
            SessionState::Created => {
                if let Err(e) = self.backend.destroy() {
                    log::warn!("could not destroy device node: {e}");
                }
                self.close();
            }
            _ => self.close(),
        }
    }
}

impl<B: Backend + fmt::Debug> fmt::Debug for Session<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.backend)
            .field("state", &self.state)
            .field("keys", &self.keys)
            .field("config", &self.config)
            .finish()
    }
}
