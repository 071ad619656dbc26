// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in sysdep return `error::Result<T>`.  Invalid input
// is rejected before any OS call; platform failures carry the failing
// function and its error code.  User outcomes (a dialog choice, an empty
// clipboard) are not errors and never show up here.

use thiserror::Error;

/// Every error that sysdep can produce.
#[derive(Debug, Error)]
pub enum SysError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// An allocation of OS-shared memory failed.
    #[error("out of memory")]
    NoMemory,

    /// An error code outside the range of Win32 error numbers.
    #[error("error code {0} is out of range")]
    OutOfRange(i32),

    /// A caller-supplied buffer is smaller than the operation requires.
    #[error("buffer holds {actual} characters but at least {required} are required")]
    BufferTooSmall { required: usize, actual: usize },

    /// An argument failed validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The user dismissed a picker without choosing anything.
    #[error("cancelled by user")]
    Cancelled,

    /// A standard I/O error (config file read or write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be parsed or written.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl SysError {
    /// `true` for the out-of-memory kind, which callers may treat differently
    /// from a generic failure.
    pub fn is_no_memory(&self) -> bool {
        matches!(self, Self::NoMemory)
    }
}

// Convert a windows-crate error (HRESULT) directly into a SysError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for SysError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        // Win32 errors appear as 0x8007xxxx HRESULTs.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SysError>;
