// ── Modal alerts ──────────────────────────────────────────────────────────────
//
// Blocking message boxes for when nothing better is available: task-modal,
// exclamation icon, brought to the foreground, no owner window.

#![allow(unsafe_code)]

use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::HWND,
        UI::WindowsAndMessaging::{
            MessageBoxW, MB_ICONEXCLAMATION, MB_SETFOREGROUND, MB_TASKMODAL,
        },
    },
};

use super::{to_wide, to_wide_z};

/// Show `msg` under `caption` and block until the user dismisses it.
pub fn display_msg(caption: &str, msg: &str) {
    show(&to_wide(caption), &to_wide(msg));
}

/// [`display_msg`] for UTF-16 text.  Each string ends at its first NUL or
/// at the end of the slice.
pub fn display_msg_wide(caption: &[u16], msg: &[u16]) {
    show(&to_wide_z(caption), &to_wide_z(msg));
}

/// `caption` and `msg` must be NUL-terminated.
fn show(caption: &[u16], msg: &[u16]) {
    // SAFETY: both buffers are NUL-terminated UTF-16 that stay allocated for
    // the duration of the MessageBoxW call.  A null HWND means no owner;
    // MB_TASKMODAL disables this thread's top-level windows instead.
    // Return value (button pressed) is intentionally unused: there is only OK.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(msg.as_ptr()),
            PCWSTR(caption.as_ptr()),
            MB_ICONEXCLAMATION | MB_TASKMODAL | MB_SETFOREGROUND,
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
