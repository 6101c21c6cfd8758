use crate::compat::uinput_setup;
use nix::{convert_ioctl_res, ioctl_none, ioctl_write_int, ioctl_write_ptr, request_code_read};

const UINPUT_IOCTL_BASE: u8 = b'U';

ioctl_none!(ui_dev_create, UINPUT_IOCTL_BASE, 1);
ioctl_none!(ui_dev_destroy, UINPUT_IOCTL_BASE, 2);
ioctl_write_ptr!(ui_dev_setup, UINPUT_IOCTL_BASE, 3, uinput_setup);

ioctl_write_int!(ui_set_evbit, UINPUT_IOCTL_BASE, 100);
ioctl_write_int!(ui_set_keybit, UINPUT_IOCTL_BASE, 101);

/// ioctl: "get the sysfs name of the created device"
///
/// Only meaningful after `UI_DEV_CREATE`. The kernel writes a NUL-terminated name such as
/// `input42` into `bytes`.
///
/// # Safety
///
/// `fd` must be an open `/dev/uinput` handle.
pub unsafe fn ui_get_sysname(fd: ::libc::c_int, bytes: &mut [u8]) -> ::nix::Result<::libc::c_int> {
    convert_ioctl_res!(::nix::libc::ioctl(
        fd,
        request_code_read!(UINPUT_IOCTL_BASE, 300, bytes.len()),
        bytes.as_mut_ptr(),
    ))
}
