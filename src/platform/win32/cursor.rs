// ── Mouse cursors ─────────────────────────────────────────────────────────────
//
// Colour cursors built from caller pixels.  A `Cursor` owns exactly one
// HCURSOR; `free` (or `Drop`) is the only way to release it, so a released
// handle can never be installed again.

#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::FALSE,
    Graphics::Gdi::{CreateBitmap, DeleteObject, HBITMAP, HGDIOBJ},
    UI::WindowsAndMessaging::{
        CreateIconIndirect, DestroyIcon, GetCursor, LoadCursorW, SetCursor, HCURSOR, HICON,
        ICONINFO, IDC_ARROW,
    },
};

use crate::{
    cursor_image::CursorImage,
    error::{Result, SysError},
};

use super::window::last_error;

/// An owned custom cursor.
#[derive(Debug)]
pub struct Cursor {
    handle: HCURSOR,
}

impl Cursor {
    /// Build a cursor from `image`.
    ///
    /// The pixels are copied; `image` may be dropped afterwards.
    pub fn create(image: &CursorImage<'_>) -> Result<Self> {
        let (width, height) = (image.width() as i32, image.height() as i32);
        let (hotspot_x, hotspot_y) = image.hotspot();

        // SAFETY: the pixel slice holds width * height 32-bit pixels
        // (checked by CursorImage::new) and is only read during the call.
        let colour = unsafe {
            CreateBitmap(width, height, 1, 32, Some(image.pixels().as_ptr().cast()))
        };
        // CreateIconIndirect ignores the mask's contents for a 32-bit colour
        // bitmap but still requires one of the same size.
        // SAFETY: no initial bits; the bitmap is left zeroed.
        let mask = unsafe { CreateBitmap(width, height, 1, 1, None) };

        let info = ICONINFO {
            fIcon: FALSE, // cursor, not icon
            xHotspot: hotspot_x,
            yHotspot: hotspot_y,
            hbmMask: mask,
            hbmColor: colour,
        };
        // SAFETY: info is fully initialised.  A null bitmap makes the call
        // fail cleanly; we report that below.
        let icon = unsafe { CreateIconIndirect(&info) };

        // CreateIconIndirect copies both bitmaps, so they go either way.
        delete_bitmap(mask);
        delete_bitmap(colour);

        let icon = icon.map_err(|e| {
            log::warn!("cursor: CreateIconIndirect ({width}x{height}) failed: {e}");
            SysError::from(e)
        })?;
        Ok(Self {
            handle: HCURSOR(icon.0),
        })
    }

    /// A fully transparent 1×1 cursor, for hiding the pointer.
    pub fn empty() -> Result<Self> {
        Self::create(&CursorImage::transparent())
    }

    /// `true` while this cursor is the one the system shows.
    pub fn is_active(&self) -> bool {
        // SAFETY: GetCursor has no preconditions.
        unsafe { GetCursor() } == self.handle
    }

    /// Destroy the cursor, restoring the default arrow first if it is the
    /// active one.
    pub fn free(self) -> Result<()> {
        let this = std::mem::ManuallyDrop::new(self);
        this.release()
    }

    fn release(&self) -> Result<()> {
        if self.is_active() {
            set(None);
        }
        // SAFETY: handle came from CreateIconIndirect and is released only
        // here, once (free suppresses Drop).
        unsafe { DestroyIcon(HICON(self.handle.0)) }.map_err(|_| last_error("DestroyIcon"))
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("cursor: release on drop failed: {e}");
        }
    }
}

/// Make `cursor` the system cursor; `None` restores the default arrow.
///
/// The previously active cursor is not reported; it carries nothing the
/// caller could act on.
pub fn set(cursor: Option<&Cursor>) {
    let handle = match cursor {
        Some(c) => c.handle,
        // SAFETY: IDC_ARROW is a built-in resource present on all Windows
        // versions; a null module selects the system cursors.
        None => match unsafe { LoadCursorW(None, IDC_ARROW) } {
            Ok(h) => h,
            Err(e) => {
                log::warn!("cursor: LoadCursorW(IDC_ARROW) failed: {e}");
                return;
            }
        },
    };
    // SAFETY: handle is a live cursor (owned by `cursor` or shared system).
    unsafe {
        let _ = SetCursor(handle);
    }
}

fn delete_bitmap(bitmap: HBITMAP) {
    if bitmap.0.is_null() {
        return;
    }
    // SAFETY: bitmap was created above, is not selected into any DC, and is
    // deleted exactly once.
    unsafe {
        let _ = DeleteObject(HGDIOBJ(bitmap.0));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
