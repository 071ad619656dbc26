// ── Diagnostic lookups ────────────────────────────────────────────────────────
//
// Error-code text, and which module a given address belongs to.  Used when
// reporting crashes and assertion failures, so none of this may panic.

#![allow(unsafe_code)]

use std::{ffi::c_void, path::PathBuf};

use windows::{
    core::PWSTR,
    Win32::{
        Foundation::HMODULE,
        System::{
            Diagnostics::Debug::{
                FormatMessageW, FORMAT_MESSAGE_FROM_SYSTEM, FORMAT_MESSAGE_IGNORE_INSERTS,
            },
            LibraryLoader::GetModuleFileNameW,
            Memory::{VirtualQuery, MEMORY_BASIC_INFORMATION, MEM_IMAGE},
        },
    },
};

use crate::{
    diagnostics::{file_name_of, resolve_error_code, trim_message},
    error::Result,
};

use super::window::{last_error, last_error_code};

/// Capacity of the message buffer, in UTF-16 units.  System messages are
/// far shorter.
const DESCRIPTION_BUF_LEN: usize = 512;

/// Maximum path length in `WCHAR`s, including the null terminator.
/// `MAX_PATH` (260) is too short for modern Windows paths; use 32 768 which
/// is the documented maximum for `\\?\` extended paths.
const PATH_BUF_LEN: usize = 32_768;

// ── Error text ────────────────────────────────────────────────────────────────

/// Human-readable text for a Win32 error code.
///
/// `0` describes the calling thread's last error.  Negative codes are not
/// Win32 error numbers and fail with `SysError::OutOfRange` before any
/// system call.
pub fn error_description(code: i32) -> Result<String> {
    let err = resolve_error_code(code, last_error_code)?;

    let mut buf = [0u16; DESCRIPTION_BUF_LEN];
    // SAFETY: buf is writable for its full length, which is what we report
    // as nsize.  FROM_SYSTEM needs no source; IGNORE_INSERTS means no
    // argument array is read.
    let written = unsafe {
        FormatMessageW(
            FORMAT_MESSAGE_FROM_SYSTEM | FORMAT_MESSAGE_IGNORE_INSERTS,
            None,
            err,
            0, // neutral language, then the user's locale
            PWSTR(buf.as_mut_ptr()),
            buf.len() as u32,
            None,
        )
    } as usize;

    if written == 0 {
        let e = last_error("FormatMessageW");
        log::warn!("no description for error {err}: {e}");
        return Err(e);
    }
    debug_assert!(written < buf.len(), "error {err} description was truncated");

    Ok(trim_message(&buf[..written]))
}

// ── Module lookup ─────────────────────────────────────────────────────────────

/// Full path of the loaded module whose image contains `addr`.
///
/// `None` if `addr` lies outside every loaded image.
pub fn module_path(addr: *const c_void) -> Option<PathBuf> {
    containing_module(addr).map(|wide| super::dialogs::path_from_buf(&wide))
}

/// File name, without directory, of the module containing `addr`.
///
/// Empty if `addr` belongs to no loaded module.
pub fn module_filename(addr: *const c_void) -> String {
    containing_module(addr)
        .map(|wide| file_name_of(&wide))
        .unwrap_or_default()
}

/// Full path of the running executable.
pub fn executable_path() -> Result<PathBuf> {
    // A null module means the executable.
    let wide = module_file_name(HMODULE::default())?;
    Ok(super::dialogs::path_from_buf(&wide))
}

fn containing_module(addr: *const c_void) -> Option<Vec<u16>> {
    let mut mbi = MEMORY_BASIC_INFORMATION::default();
    // SAFETY: VirtualQuery only inspects the address space; any address is
    // acceptable, and mbi is a valid out-buffer of the size we pass.
    let got = unsafe {
        VirtualQuery(Some(addr), &mut mbi, std::mem::size_of::<MEMORY_BASIC_INFORMATION>())
    };
    // A null allocation base would make GetModuleFileNameW describe the
    // executable instead.
    if got == 0 || mbi.Type != MEM_IMAGE || mbi.AllocationBase.is_null() {
        return None;
    }

    module_file_name(HMODULE(mbi.AllocationBase)).ok()
}

/// The module's full path as UTF-16, without terminator.
fn module_file_name(module: HMODULE) -> Result<Vec<u16>> {
    let mut buf = vec![0u16; PATH_BUF_LEN];
    // SAFETY: buf is writable for its full length; GetModuleFileNameW takes
    // the capacity from the slice.
    let len = unsafe { GetModuleFileNameW(module, &mut buf) } as usize;
    if len == 0 || len >= buf.len() {
        return Err(last_error("GetModuleFileNameW"));
    }
    buf.truncate(len);
    Ok(buf)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use windows::Win32::Foundation::{SetLastError, WIN32_ERROR};

    use super::*;
    use crate::SysError;

    const ERROR_FILE_NOT_FOUND: i32 = 2;

    #[test]
    fn describes_known_code() {
        let text = error_description(ERROR_FILE_NOT_FOUND).expect("description");
        assert!(!text.is_empty());
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn zero_describes_thread_last_error() {
        let expected = error_description(ERROR_FILE_NOT_FOUND).expect("description");
        // SAFETY: only sets this thread's last-error value.
        unsafe { SetLastError(WIN32_ERROR(ERROR_FILE_NOT_FOUND as u32)) };
        assert_eq!(error_description(0).expect("description"), expected);
    }

    #[test]
    fn negative_code_is_out_of_range() {
        assert!(matches!(error_description(-1), Err(SysError::OutOfRange(-1))));
    }

    #[test]
    fn unknown_code_fails() {
        assert!(error_description(0x7FFF_FFF0).is_err());
    }

    #[test]
    fn own_function_lives_in_test_executable() {
        let addr = describes_known_code as fn() as *const c_void;
        let exe = executable_path().expect("exe path");
        let name = module_filename(addr);
        assert!(!name.is_empty());
        assert_eq!(Some(name.as_str()), exe.file_name().and_then(|n| n.to_str()));
        assert_eq!(module_path(addr), Some(exe));
    }

    #[test]
    fn heap_address_has_no_module() {
        let on_heap = Box::new(0u64);
        assert_eq!(module_filename(&*on_heap as *const u64 as *const c_void), "");
    }

    #[test]
    fn null_address_has_no_module() {
        assert_eq!(module_filename(std::ptr::null()), "");
        assert_eq!(module_path(std::ptr::null()), None);
    }

    #[test]
    fn executable_path_is_absolute() {
        let exe = executable_path().expect("exe path");
        assert!(exe.is_absolute());
        assert!(exe.exists());
    }
}
