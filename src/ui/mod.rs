// ── Dialog logic ──────────────────────────────────────────────────────────────
//
// Pure Rust state behind the Win32 error dialog.  No Win32 calls here; all
// control messages are sent from `platform::win32::error_dialog`.

pub mod anchor;
pub mod error_dialog;
