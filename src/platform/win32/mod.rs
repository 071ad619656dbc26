// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is the only module in the crate where `unsafe` code is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub mod clipboard; // CF_UNICODETEXT set / get
pub mod cursor; // colour cursors from BGRA pixels
pub mod diagnostics; // error text, module and executable paths
pub mod dialogs; // shell directory picker
pub mod error_dialog; // resizable program-error dialog
pub mod message; // modal alert boxes

pub(crate) mod dpi; // DPI scaling for the dialog's minimum size
pub(crate) mod stack; // thread stack bounds
pub(crate) mod window; // app window lookup, quit deferral, last-error capture

/// Encode `s` as a NUL-terminated UTF-16 string.
pub(crate) fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Copy `units` up to its first NUL and append a terminator.
pub(crate) fn to_wide_z(units: &[u16]) -> Vec<u16> {
    units
        .iter()
        .copied()
        .take_while(|&u| u != 0)
        .chain(std::iter::once(0))
        .collect()
}
