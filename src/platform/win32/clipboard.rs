// ── Clipboard ─────────────────────────────────────────────────────────────────
//
// Plain-text copy and paste through CF_UNICODETEXT.
//
// The clipboard is a system-wide lock: while we hold it, no other process
// can read or write it.  `OpenClipboardGuard` closes it on every path.

#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::{GlobalFree, HANDLE, HGLOBAL, HWND},
    System::{
        DataExchange::{CloseClipboard, EmptyClipboard, GetClipboardData, OpenClipboard, SetClipboardData},
        Memory::{GlobalAlloc, GlobalLock, GlobalSize, GlobalUnlock, GMEM_MOVEABLE},
        Ole::CF_UNICODETEXT,
    },
};

use crate::error::{Result, SysError};

use super::window::last_error;

// ── Lock guard ────────────────────────────────────────────────────────────────

struct OpenClipboardGuard;

impl OpenClipboardGuard {
    fn open() -> Result<Self> {
        // SAFETY: a null owner assigns the clipboard to the current task;
        // no window handle is needed.
        unsafe { OpenClipboard(HWND::default()) }.map_err(|e| {
            log::warn!("clipboard: OpenClipboard failed: {e}");
            SysError::from(e)
        })?;
        Ok(Self)
    }
}

impl Drop for OpenClipboardGuard {
    fn drop(&mut self) {
        // SAFETY: constructed only after a successful OpenClipboard on this
        // thread, so we are the owner closing it.
        unsafe {
            let _ = CloseClipboard();
        }
    }
}

// ── Set ───────────────────────────────────────────────────────────────────────

/// Replace the clipboard contents with `text`.
pub fn set(text: &str) -> Result<()> {
    let units: Vec<u16> = text.encode_utf16().collect();
    set_wide(&units)
}

/// Replace the clipboard contents with UTF-16 `text`.
///
/// `text` ends at its first NUL or at the end of the slice.  Fails with
/// [`SysError::NoMemory`] if the shared block cannot be allocated.
pub fn set_wide(text: &[u16]) -> Result<()> {
    let len = text.iter().position(|&c| c == 0).unwrap_or(text.len());
    let text = &text[..len];

    let _clipboard = OpenClipboardGuard::open()?;

    // SAFETY: we own the clipboard (guard above).
    unsafe {
        let _ = EmptyClipboard();
    }

    // SAFETY: GMEM_MOVEABLE is required for clipboard data; the size covers
    // the text plus its terminator.
    let hmem = unsafe { GlobalAlloc(GMEM_MOVEABLE, (len + 1) * std::mem::size_of::<u16>()) }
        .map_err(|e| {
            log::warn!("clipboard: GlobalAlloc of {} units failed: {e}", len + 1);
            SysError::NoMemory
        })?;

    if let Err(e) = fill(hmem, text) {
        free_global(hmem);
        return Err(e);
    }

    // SAFETY: hmem is an unlocked movable block holding NUL-terminated
    // UTF-16.  On success the clipboard owns it and we must not free it.
    match unsafe { SetClipboardData(u32::from(CF_UNICODETEXT.0), HANDLE(hmem.0)) } {
        Ok(_) => Ok(()),
        Err(e) => {
            log::warn!("clipboard: SetClipboardData failed: {e}");
            free_global(hmem);
            Err(e.into())
        }
    }
}

/// Copy `text` plus a terminator into the movable block `hmem`.
fn fill(hmem: HGLOBAL, text: &[u16]) -> Result<()> {
    // SAFETY: hmem is a live block from GlobalAlloc.
    let dst = unsafe { GlobalLock(hmem) } as *mut u16;
    if dst.is_null() {
        return Err(last_error("GlobalLock"));
    }
    // SAFETY: the block holds text.len() + 1 units (allocated by the caller)
    // and cannot overlap `text`, which lives in our own heap.
    unsafe {
        std::ptr::copy_nonoverlapping(text.as_ptr(), dst, text.len());
        *dst.add(text.len()) = 0;
        // Reports an "error" with NO_ERROR once the lock count hits zero.
        let _ = GlobalUnlock(hmem);
    }
    Ok(())
}

fn free_global(hmem: HGLOBAL) {
    // SAFETY: hmem was allocated by us and its ownership was never
    // transferred to the clipboard.
    unsafe {
        let _ = GlobalFree(hmem);
    }
}

// ── Get ───────────────────────────────────────────────────────────────────────

/// An owned copy of the clipboard's text.
///
/// Dropping it releases the copy; the clipboard itself is unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardText(Vec<u16>);

impl ClipboardText {
    /// The UTF-16 text, without terminator.
    pub fn as_wide(&self) -> &[u16] {
        &self.0
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_wide(self) -> Vec<u16> {
        self.0
    }
}

/// Copy the clipboard's text, if it holds any.
///
/// Returns `None` when the clipboard is busy, holds no text, or cannot be
/// read.  Text in other formats is converted to CF_UNICODETEXT by Windows.
pub fn get() -> Option<ClipboardText> {
    let _clipboard = match OpenClipboardGuard::open() {
        Ok(g) => g,
        Err(_) => return None,
    };

    // SAFETY: we own the clipboard; the handle stays valid until it closes.
    let handle = unsafe { GetClipboardData(u32::from(CF_UNICODETEXT.0)) }.ok()?;
    let hmem = HGLOBAL(handle.0);

    // SAFETY: CF_UNICODETEXT data is a movable global block.
    let src = unsafe { GlobalLock(hmem) } as *const u16;
    if src.is_null() {
        log::warn!("clipboard: {}", last_error("GlobalLock"));
        return None;
    }

    // SAFETY: the locked block is GlobalSize bytes long; we read at most
    // that many units and stop at the terminator.
    let copy = unsafe {
        let units = GlobalSize(hmem) / std::mem::size_of::<u16>();
        let all = std::slice::from_raw_parts(src, units);
        let len = all.iter().position(|&c| c == 0).unwrap_or(units);
        let copy = all[..len].to_vec();
        let _ = GlobalUnlock(hmem);
        copy
    };

    Some(ClipboardText(copy))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
