#![allow(unsafe_code)]

use windows::Win32::{Foundation::HWND, UI::HiDpi::GetDpiForWindow};

pub(crate) const BASE_DPI: u32 = 96;

/// Scale a pixel value defined at 96 DPI to `dpi`.
pub(crate) fn scale(px: i32, dpi: u32) -> i32 {
    px * dpi as i32 / BASE_DPI as i32
}

/// Return the DPI for `hwnd`. Falls back to BASE_DPI (96) on failure.
pub(crate) fn get_for_window(hwnd: HWND) -> u32 {
    // SAFETY: hwnd is a valid window handle provided by the caller.
    let v = unsafe { GetDpiForWindow(hwnd) };
    if v == 0 {
        BASE_DPI
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_is_identity_at_base_dpi() {
        assert_eq!(scale(407, BASE_DPI), 407);
    }

    #[test]
    fn scale_doubles_at_192() {
        assert_eq!(scale(159, 192), 318);
    }

    #[test]
    fn null_window_falls_back_to_base() {
        assert_eq!(get_for_window(HWND::default()), BASE_DPI);
    }
}
