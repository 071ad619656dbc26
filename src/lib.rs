// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except:
//   • `platform::win32` – Win32 / WinAPI FFI
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! Windows backend of the `sysdep` interface.
//!
//! A portable codebase calls one uniform set of OS services (alerts, the
//! program-error dialog, clipboard, cursors, diagnostic lookups, directory
//! picker); this crate supplies the Win32 half.  The layout math, dialog
//! event handling, configuration and input validation are plain Rust and
//! build on every target; the FFI is compiled on Windows only.

pub mod config;
pub mod cursor_image;
pub mod diagnostics;
pub mod error;
pub mod platform;
pub mod stack;
pub mod ui;

pub use cursor_image::CursorImage;
pub use error::{Result, SysError};
pub use ui::error_dialog::{DialogFlags, ErrorReaction};

#[cfg(windows)]
pub use platform::{
    clipboard, cursor, dialogs, error_dialog, message,
    diagnostics::{error_description, executable_path, module_filename, module_path},
};
