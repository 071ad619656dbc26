// ── Diagnostic helpers ────────────────────────────────────────────────────────
//
// The platform-independent half of the diagnostic lookups in
// `platform::win32::diagnostics`: argument checks and string shaping.

use crate::error::{Result, SysError};

/// Turn a caller-supplied error code into a Win32 error number.
///
/// Negative codes are rejected without calling `last_error`; `0` means
/// "whatever the thread recorded last".
pub fn resolve_error_code(code: i32, last_error: impl FnOnce() -> u32) -> Result<u32> {
    match code {
        c if c < 0 => Err(SysError::OutOfRange(c)),
        0 => Ok(last_error()),
        c => Ok(c as u32),
    }
}

/// Strip the trailing line break and padding that system messages carry.
pub fn trim_message(units: &[u16]) -> String {
    String::from_utf16_lossy(units).trim_end().to_owned()
}

/// The file-name component of a NUL-terminated (or unterminated) wide path.
///
/// Both `\` and `/` separate components.  Yields an empty string for an
/// empty path.
pub fn file_name_of(path: &[u16]) -> String {
    let len = path.iter().position(|&c| c == 0).unwrap_or(path.len());
    let path = &path[..len];
    let start = path
        .iter()
        .rposition(|&c| c == u16::from(b'\\') || c == u16::from(b'/'))
        .map_or(0, |i| i + 1);
    String::from_utf16_lossy(&path[start..])
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn negative_code_never_reads_last_error() {
        let mut called = false;
        let r = resolve_error_code(-5, || {
            called = true;
            0
        });
        assert!(matches!(r, Err(SysError::OutOfRange(-5))));
        assert!(!called);
    }

    #[test]
    fn zero_uses_last_error() {
        assert_eq!(resolve_error_code(0, || 1234).expect("ok"), 1234);
    }

    #[test]
    fn positive_code_passes_through() {
        let r = resolve_error_code(2, || panic!("must not be called"));
        assert_eq!(r.expect("ok"), 2);
    }

    #[test]
    fn trim_message_drops_crlf() {
        assert_eq!(
            trim_message(&wide("The system cannot find the file specified.\r\n")),
            "The system cannot find the file specified."
        );
    }

    #[test]
    fn file_name_of_full_path() {
        let mut p = wide(r"C:\Program Files\game\pyrogenesis.exe");
        p.push(0);
        p.extend(wide("garbage after terminator"));
        assert_eq!(file_name_of(&p), "pyrogenesis.exe");
    }

    #[test]
    fn file_name_of_bare_name_and_empty() {
        assert_eq!(file_name_of(&wide("kernel32.dll")), "kernel32.dll");
        assert_eq!(file_name_of(&[0, 65]), "");
        assert_eq!(file_name_of(&[]), "");
    }

    #[test]
    fn file_name_of_forward_slashes() {
        assert_eq!(file_name_of(&wide("C:/x/y/z.dll")), "z.dll");
    }
}
