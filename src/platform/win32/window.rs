// ── Application window helpers ────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Find this process's top-level window, to own modal dialogs.
//   • Hold back a pending WM_QUIT while a modal dialog runs.
//   • Capture the thread's last-error code into a `SysError`.

#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::{GetLastError, BOOL, FALSE, HWND, LPARAM, TRUE},
    System::Threading::GetCurrentProcessId,
    UI::WindowsAndMessaging::{
        EnumWindows, GetWindowThreadProcessId, PeekMessageW, PostQuitMessage, MSG, PM_REMOVE,
        WM_QUIT,
    },
};

use crate::error::SysError;

// ── App window lookup ─────────────────────────────────────────────────────────

/// The first top-level window owned by this process, or a null `HWND` if the
/// process has none yet.
///
/// An error dialog must be modal to the app's window; otherwise the app
/// keeps running behind it and may crash and take the dialog down with it.
pub(crate) fn find_app_main_window() -> HWND {
    let mut found = HWND::default();
    // SAFETY: the callback only writes through `lparam`, which points at
    // `found` on this stack frame and outlives the synchronous EnumWindows
    // call.  EnumWindows reports an error when the callback stops early,
    // which is exactly the success case, so its result carries no
    // information and is ignored.
    unsafe {
        let _ = EnumWindows(
            Some(match_own_process),
            LPARAM(std::ptr::addr_of_mut!(found) as isize),
        );
    }
    found
}

// SAFETY: only called by EnumWindows with the LPARAM supplied above.
unsafe extern "system" fn match_own_process(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let mut pid = 0u32;
    // SAFETY: hwnd comes from EnumWindows; pid is a valid out-pointer.
    // The returned thread ID is not needed.
    let _ = GetWindowThreadProcessId(hwnd, Some(&mut pid as *mut u32));

    if pid == GetCurrentProcessId() {
        // SAFETY: lparam is the address of the caller's `found` HWND.
        *(lparam.0 as *mut HWND) = hwnd;
        return FALSE; // done
    }
    TRUE // keep enumerating
}

// ── Quit deferral ─────────────────────────────────────────────────────────────

/// A `WM_QUIT` removed from this thread's queue, to be re-posted on drop.
///
/// A modal dialog returns immediately, without showing anything, if a quit
/// message is pending.  Windows posts one not only at shutdown but also
/// when window initialisation fails, so an error raised then would be
/// lost.
pub(crate) struct DeferredQuit {
    exit_code: Option<i32>,
}

impl DeferredQuit {
    /// Remove a pending `WM_QUIT`, if any, from the calling thread's queue.
    pub(crate) fn take() -> Self {
        let mut msg = MSG::default();
        // SAFETY: &mut msg is a valid MSG pointer; a null HWND checks every
        // window of this thread; the filter only matches WM_QUIT.
        let pending = unsafe { PeekMessageW(&mut msg, HWND::default(), WM_QUIT, WM_QUIT, PM_REMOVE) };
        let exit_code = pending.as_bool().then_some(msg.wParam.0 as i32);
        if let Some(code) = exit_code {
            log::debug!("deferring pending WM_QUIT (exit code {code})");
        }
        Self { exit_code }
    }
}

impl Drop for DeferredQuit {
    fn drop(&mut self) {
        if let Some(code) = self.exit_code {
            // SAFETY: PostQuitMessage only posts to this thread's queue.
            unsafe { PostQuitMessage(code) };
        }
    }
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in a `SysError`.
///
/// Call immediately after a Win32 function that signals failure. `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
pub(crate) fn last_error(function: &'static str) -> SysError {
    SysError::Win32 {
        function,
        code: last_error_code(),
    }
}

/// The calling thread's last-error value.
pub(crate) fn last_error_code() -> u32 {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    unsafe { GetLastError().0 }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_quit_pending_reposts_nothing() {
        let deferred = DeferredQuit::take();
        assert_eq!(deferred.exit_code, None);
    }

    #[test]
    fn pending_quit_is_taken_and_restored() {
        // SAFETY: posts to this test thread's own queue.
        unsafe { PostQuitMessage(3) };
        {
            let deferred = DeferredQuit::take();
            assert_eq!(deferred.exit_code, Some(3));
            // Nothing left in the queue while deferred.
            assert_eq!(DeferredQuit::take().exit_code, None);
        }
        // Restored on drop; take it again so the test thread ends clean.
        let again = DeferredQuit::take();
        assert_eq!(again.exit_code, Some(3));
        std::mem::forget(again);
    }

    #[test]
    fn last_error_names_function() {
        let e = last_error("Probe");
        assert!(matches!(e, SysError::Win32 { function: "Probe", .. }));
    }
}
