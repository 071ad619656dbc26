// ── Platform abstraction layer ────────────────────────────────────────────────
//
// The public surface the rest of the codebase uses to talk to the OS.  No
// `unsafe` lives here; all Win32 FFI is confined to the `win32` sub-module
// and never leaks outward.

#[cfg(windows)]
pub mod win32;

#[cfg(windows)]
pub use win32::{clipboard, cursor, diagnostics, dialogs, error_dialog, message};

/// Lowest and highest address of the calling thread's stack, if known.
pub(crate) fn stack_limits() -> Option<(usize, usize)> {
    #[cfg(windows)]
    {
        Some(win32::stack::limits())
    }
    #[cfg(not(windows))]
    {
        None
    }
}
