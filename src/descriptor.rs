use crate::compat::{uinput_setup, UINPUT_MAX_NAME_SIZE};
use crate::error::{Error, Result};
use crate::{BusType, InputId};

/// Identity handed to the kernel by `UI_DEV_SETUP`.
///
/// The name is validated here rather than at setup time: the kernel's name field is a fixed
/// `UINPUT_MAX_NAME_SIZE` buffer including the terminating NUL, and a name that does not fit is
/// an error, never truncated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceDescriptor {
    id: InputId,
    name: String,
}

impl DeviceDescriptor {
    pub const DEFAULT_NAME: &'static str = "Example device";
    pub const DEFAULT_VENDOR: u16 = 0x1234;
    pub const DEFAULT_PRODUCT: u16 = 0x5678;

    pub fn new(id: InputId, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        check_name(&name)?;
        Ok(Self { id, name })
    }

    pub fn id(&self) -> InputId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn to_setup(&self) -> uinput_setup {
        // Safety: `uinput_setup` is plain old data, all-zero is its "unset" state
        let mut setup: uinput_setup = unsafe { std::mem::zeroed() };
        setup.id = self.id.0;
        for (dst, src) in setup.name.iter_mut().zip(self.name.bytes()) {
            *dst = src as libc::c_char;
        }
        setup
    }
}

impl Default for DeviceDescriptor {
    /// A USB device with placeholder vendor/product ids.
    fn default() -> Self {
        Self {
            id: InputId::new(
                BusType::BUS_USB,
                Self::DEFAULT_VENDOR,
                Self::DEFAULT_PRODUCT,
                0,
            ),
            name: Self::DEFAULT_NAME.to_owned(),
        }
    }
}

fn check_name(name: &str) -> Result<()> {
    let reason = if name.as_bytes().contains(&0) {
        "contains a NUL byte"
    } else if name.len() >= UINPUT_MAX_NAME_SIZE {
        "longer than the kernel's 79-byte limit"
    } else {
        return Ok(());
    };
    Err(Error::InvalidName {
        name: name.to_owned(),
        reason,
    })
}
