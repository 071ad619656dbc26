// ── Cursor image ──────────────────────────────────────────────────────────────
//
// Validated pixel data for `platform::win32::cursor::Cursor::create`.
// No Win32 imports; usable from any module.

use crate::error::{Result, SysError};

const BYTES_PER_PIXEL: usize = 4;

static TRANSPARENT_PIXEL: [u8; BYTES_PER_PIXEL] = [0, 0, 0, 0];

/// A BGRA, bottom-up cursor image with its hotspot.
///
/// The pixels are only borrowed; the platform cursor keeps its own copy, so
/// the caller may drop the buffer once the cursor has been created.
#[derive(Debug, Clone, Copy)]
pub struct CursorImage<'a> {
    width: u32,
    height: u32,
    bgra: &'a [u8],
    hotspot_x: u32,
    hotspot_y: u32,
}

impl<'a> CursorImage<'a> {
    /// Wrap `bgra` as a `width` × `height` image.
    ///
    /// The hotspot is the offset from the top-left corner at which clicks
    /// register and must lie inside the image.
    pub fn new(
        width: u32,
        height: u32,
        bgra: &'a [u8],
        hotspot_x: u32,
        hotspot_y: u32,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SysError::InvalidArgument("cursor image has zero size"));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or(SysError::InvalidArgument("cursor image is too large"))?;
        if bgra.len() != expected {
            return Err(SysError::InvalidArgument(
                "cursor pixel buffer does not match width * height * 4",
            ));
        }
        if hotspot_x >= width || hotspot_y >= height {
            return Err(SysError::InvalidArgument("cursor hotspot lies outside the image"));
        }
        Ok(Self {
            width,
            height,
            bgra,
            hotspot_x,
            hotspot_y,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.bgra
    }

    pub fn hotspot(&self) -> (u32, u32) {
        (self.hotspot_x, self.hotspot_y)
    }
}

impl CursorImage<'static> {
    /// A single fully transparent pixel, for hiding the pointer.
    pub fn transparent() -> Self {
        Self {
            width: 1,
            height: 1,
            bgra: &TRANSPARENT_PIXEL,
            hotspot_x: 0,
            hotspot_y: 0,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_matching_buffer() {
        let px = vec![0xFFu8; 32 * 32 * 4];
        let img = CursorImage::new(32, 32, &px, 3, 4).expect("valid image");
        assert_eq!((img.width(), img.height()), (32, 32));
        assert_eq!(img.hotspot(), (3, 4));
        assert_eq!(img.pixels().len(), 4096);
    }

    #[test]
    fn rejects_short_buffer() {
        let px = vec![0u8; 15];
        assert!(matches!(
            CursorImage::new(2, 2, &px, 0, 0),
            Err(SysError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_zero_size() {
        assert!(CursorImage::new(0, 4, &[], 0, 0).is_err());
    }

    #[test]
    fn rejects_hotspot_outside() {
        let px = vec![0u8; 4 * 4 * 4];
        assert!(CursorImage::new(4, 4, &px, 4, 0).is_err());
        assert!(CursorImage::new(4, 4, &px, 0, 4).is_err());
    }

    #[test]
    fn rejects_overflowing_dimensions() {
        assert!(CursorImage::new(u32::MAX, u32::MAX, &[], 0, 0).is_err());
    }

    #[test]
    fn transparent_is_one_clear_pixel() {
        let img = CursorImage::transparent();
        assert_eq!((img.width(), img.height()), (1, 1));
        assert_eq!(img.pixels(), &[0, 0, 0, 0]);
        assert_eq!(img.hotspot(), (0, 0));
    }
}
