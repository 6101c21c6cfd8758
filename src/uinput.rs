//! Virtual device emulation for evdev via uinput.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::{nix_err, sys, DeviceDescriptor, EventType, InputEvent, KeyCode};
use libc::O_NONBLOCK;
use std::ffi::CStr;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::{
    fs::OpenOptionsExt,
    io::{AsRawFd, IntoRawFd, RawFd},
};
use std::path::{Path, PathBuf};

pub const UINPUT_PATH: &str = "/dev/uinput";

const SYSFS_INPUT_DIR: &str = "/sys/devices/virtual/input";
const DEV_INPUT_DIR: &str = "/dev/input";

/// A handle to the kernel's uinput interface.
#[derive(Debug)]
pub struct UinputBackend {
    file: Option<File>,
}

impl UinputBackend {
    /// Opens `path` (normally [`UINPUT_PATH`]) write-only, in nonblocking mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .custom_flags(O_NONBLOCK)
            .open(path)
            .map_err(|source| Error::Acquisition {
                path: path.to_owned(),
                source,
            })?;
        log::debug!("opened {}", path.display());

        Ok(Self { file: Some(file) })
    }

    fn fd(&self) -> io::Result<RawFd> {
        self.file.as_ref().map(AsRawFd::as_raw_fd).ok_or_else(released)
    }

    /// `UI_GET_SYSNAME`, e.g. `input42`.
    fn sysname(&self) -> io::Result<String> {
        let mut buf = [0u8; 64];
        unsafe { sys::ui_get_sysname(self.fd()?, &mut buf) }.map_err(nix_err)?;
        let name = CStr::from_bytes_until_nul(&buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(name.to_string_lossy().into_owned())
    }
}

fn released() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "uinput handle already released")
}

impl Backend for UinputBackend {
    fn enable_event_type(&mut self, event_type: EventType) -> io::Result<()> {
        unsafe {
            sys::ui_set_evbit(
                self.fd()?,
                event_type.0 as nix::sys::ioctl::ioctl_param_type,
            )
        }
        .map_err(nix_err)?;
        Ok(())
    }

    fn enable_key(&mut self, key: KeyCode) -> io::Result<()> {
        unsafe {
            sys::ui_set_keybit(
                self.fd()?,
                key.code() as nix::sys::ioctl::ioctl_param_type,
            )
        }
        .map_err(nix_err)?;
        Ok(())
    }

    fn setup(&mut self, descriptor: &DeviceDescriptor) -> io::Result<()> {
        let usetup = descriptor.to_setup();
        unsafe { sys::ui_dev_setup(self.fd()?, &usetup) }.map_err(nix_err)?;
        Ok(())
    }

    fn create(&mut self) -> io::Result<()> {
        unsafe { sys::ui_dev_create(self.fd()?) }.map_err(nix_err)?;
        Ok(())
    }

    fn write_event(&mut self, event: &InputEvent) -> io::Result<usize> {
        let file = self.file.as_mut().ok_or_else(released)?;
        file.write(event.as_bytes())
    }

    fn device_node(&mut self) -> io::Result<Option<PathBuf>> {
        let dir = Path::new(SYSFS_INPUT_DIR).join(self.sysname()?);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        for entry in entries {
            let name = entry?.file_name();
            if name.to_string_lossy().starts_with("event") {
                let node = Path::new(DEV_INPUT_DIR).join(name);
                if node.exists() {
                    return Ok(Some(node));
                }
            }
        }
        Ok(None)
    }

    fn destroy(&mut self) -> io::Result<()> {
        unsafe { sys::ui_dev_destroy(self.fd()?) }.map_err(nix_err)?;
        Ok(())
    }

    fn release(&mut self) -> io::Result<()> {
        let file = self.file.take().ok_or_else(released)?;
        nix::unistd::close(file.into_raw_fd()).map_err(nix_err)
    }
}
