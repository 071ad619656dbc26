// ── Shell dialogs ─────────────────────────────────────────────────────────────
//
// The shell's folder browser.  Returns the chosen directory, or
// `SysError::Cancelled` when the user backs out.
//
// This is inside `platform::win32` so `unsafe` is permitted per crate policy.

#![allow(unsafe_code)]

use std::{
    ffi::{c_void, OsString},
    os::windows::ffi::{OsStrExt, OsStringExt},
    path::PathBuf,
};

use windows::{
    core::PWSTR,
    Win32::{
        Foundation::{HWND, LPARAM, MAX_PATH, WPARAM},
        UI::{
            Shell::{
                Common::ITEMIDLIST, SHBrowseForFolderW, SHGetMalloc, SHGetPathFromIDListW,
                BFFM_INITIALIZED, BFFM_SETSELECTIONW, BIF_RETURNONLYFSDIRS, BROWSEINFOW,
            },
            WindowsAndMessaging::SendMessageW,
        },
    },
};

use crate::error::{Result, SysError};

use super::window::{find_app_main_window, last_error};

/// Smallest caller buffer `pick_directory_into` accepts, in `WCHAR`s.
pub const MIN_PATH_BUF_LEN: usize = MAX_PATH as usize;

// ── Item list ownership ───────────────────────────────────────────────────────

/// A shell-allocated item list, handed back to the shell allocator on drop.
struct ItemIdList(*mut ITEMIDLIST);

impl Drop for ItemIdList {
    fn drop(&mut self) {
        if self.0.is_null() {
            return;
        }
        // SAFETY: SHGetMalloc returns the allocator the shell used for the
        // list; the list is freed exactly once, here.
        match unsafe { SHGetMalloc() } {
            Ok(malloc) => unsafe { malloc.Free(Some(self.0 as *const c_void)) },
            Err(e) => log::warn!("pick_directory: SHGetMalloc failed, leaking item list: {e}"),
        }
    }
}

// ── Folder picker ─────────────────────────────────────────────────────────────

/// Show the shell folder browser, starting at the current directory.
///
/// Blocks until the user confirms or cancels.  Only file-system
/// directories can be chosen.
pub fn pick_directory() -> Result<PathBuf> {
    // NUL-terminated start directory, read by the callback while the
    // dialog initialises.  Without one the browser starts at the desktop.
    let start: Option<Vec<u16>> = match std::env::current_dir() {
        Ok(dir) => Some(dir.as_os_str().encode_wide().chain(std::iter::once(0)).collect()),
        Err(e) => {
            log::warn!("pick_directory: no current directory: {e}");
            None
        }
    };
    let start_ptr = start.as_ref().map_or(0, |s| s.as_ptr() as isize);

    let mut display_name = [0u16; MAX_PATH as usize];
    let info = BROWSEINFOW {
        hwndOwner: find_app_main_window(),
        pszDisplayName: PWSTR(display_name.as_mut_ptr()),
        ulFlags: BIF_RETURNONLYFSDIRS,
        lpfn: Some(browse_callback),
        lParam: LPARAM(start_ptr),
        ..Default::default()
    };

    // SAFETY: `info` is fully initialised; `display_name` and `start`
    // outlive the modal call.  Must run on a UI thread.
    let list = ItemIdList(unsafe { SHBrowseForFolderW(&info) });
    if list.0.is_null() {
        log::debug!("pick_directory: cancelled");
        return Err(SysError::Cancelled);
    }

    let mut buf = [0u16; MAX_PATH as usize];
    // SAFETY: list.0 is a valid absolute item list returned above; buf is
    // the MAX_PATH buffer the API requires.
    let ok = unsafe { SHGetPathFromIDListW(list.0, &mut buf) };
    if !ok.as_bool() {
        // Not a file-system folder despite BIF_RETURNONLYFSDIRS.
        return Err(last_error("SHGetPathFromIDListW"));
    }

    let path = path_from_buf(&buf);
    log::debug!("pick_directory: chose {}", path.display());
    Ok(path)
}

/// [`pick_directory`] into a caller buffer.
///
/// `buf` must hold at least [`MIN_PATH_BUF_LEN`] units; smaller buffers are
/// rejected before the dialog is shown.  On success the path is written
/// NUL-terminated and its length (without the NUL) is returned.  On any
/// error the buffer contents are unspecified.
pub fn pick_directory_into(buf: &mut [u16]) -> Result<usize> {
    if buf.len() < MIN_PATH_BUF_LEN {
        return Err(SysError::BufferTooSmall {
            required: MIN_PATH_BUF_LEN,
            actual: buf.len(),
        });
    }

    let path = pick_directory()?;
    let wide: Vec<u16> = path.as_os_str().encode_wide().collect();
    if wide.len() >= buf.len() {
        return Err(SysError::BufferTooSmall {
            required: wide.len() + 1,
            actual: buf.len(),
        });
    }
    buf[..wide.len()].copy_from_slice(&wide);
    buf[wide.len()] = 0;
    Ok(wide.len())
}

// SAFETY: registered as BROWSEINFOW::lpfn above; `data` is the lParam we
// supplied (0 or a NUL-terminated UTF-16 path alive for the dialog's lifetime).
unsafe extern "system" fn browse_callback(
    hwnd: HWND,
    msg: u32,
    _lparam: LPARAM,
    data: LPARAM,
) -> i32 {
    if msg == BFFM_INITIALIZED && data.0 != 0 {
        // wParam TRUE: lParam is a path string, not an item list.
        let _ = SendMessageW(hwnd, BFFM_SETSELECTIONW, WPARAM(1), data);
    }
    0
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Convert a null-terminated wide buffer to a `PathBuf`.
///
/// Windows paths need not be valid UTF-16; the units are kept as they are.
pub(crate) fn path_from_buf(buf: &[u16]) -> PathBuf {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    PathBuf::from(OsString::from_wide(&buf[..len]))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_buffer_is_rejected_without_dialog() {
        let mut buf = [0u16; 10];
        let err = pick_directory_into(&mut buf).expect_err("too small");
        assert!(matches!(
            err,
            SysError::BufferTooSmall { required: 260, actual: 10 }
        ));
    }

    #[test]
    fn path_from_buf_stops_at_nul() {
        let buf: Vec<u16> = "C:\\games\0junk".encode_utf16().collect();
        assert_eq!(path_from_buf(&buf), PathBuf::from("C:\\games"));
    }

    #[test]
    fn path_from_buf_without_nul_uses_all() {
        let buf: Vec<u16> = "D:\\data".encode_utf16().collect();
        assert_eq!(path_from_buf(&buf), PathBuf::from("D:\\data"));
    }

    #[test]
    fn path_from_buf_keeps_unpaired_surrogate() {
        let buf = [u16::from(b'C'), u16::from(b':'), u16::from(b'\\'), 0xD800, 0];
        let path = path_from_buf(&buf);
        let back: Vec<u16> = path.as_os_str().encode_wide().collect();
        assert_eq!(back, &buf[..4]);
    }

    /// Interactive: press Cancel.
    #[test]
    #[ignore]
    fn cancel_reports_cancelled() {
        assert!(matches!(pick_directory(), Err(SysError::Cancelled)));
    }

    /// Interactive: confirm the preselected (current) directory.
    #[test]
    #[ignore]
    fn confirm_returns_selection() {
        let mut buf = vec![0u16; 1024];
        let len = pick_directory_into(&mut buf).expect("confirmed");
        let chosen = path_from_buf(&buf[..len]);
        assert_eq!(chosen, std::env::current_dir().expect("cwd"));
    }
}
