// ── Edge anchoring for dialog controls ────────────────────────────────────────
//
// Pure Rust geometry.  No Win32 imports; the dialog procedure in
// `platform::win32::error_dialog` feeds it rectangles and applies the result.

use bitflags::bitflags;

bitflags! {
    /// Which container edges a control keeps a fixed distance to.
    ///
    /// Anchoring to one edge of an axis moves the control along with that
    /// edge; anchoring to both stretches it.  Left and top are the implicit
    /// default and need not be set for a control that never moves.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Anchors: u8 {
        const LEFT   = 0x01;
        const RIGHT  = 0x02;
        const TOP    = 0x04;
        const BOTTOM = 0x08;
        const ALL    = 0x0f;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// Change in client size between two resize events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delta {
    pub dx: i32,
    pub dy: i32,
}

/// An axis-aligned rectangle stored as origin + size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Build from Win32-style edges (`right`/`bottom` exclusive).
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Express a screen-space rectangle relative to `origin`.
    pub fn relative_to(self, origin: Point) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
            ..self
        }
    }

    /// Apply a container resize of `delta` to a control with `anchors`.
    pub fn anchored(self, delta: Delta, anchors: Anchors) -> Self {
        let mut r = self;

        if anchors.contains(Anchors::RIGHT) {
            if anchors.contains(Anchors::LEFT) {
                r.width += delta.dx;
            } else {
                r.x += delta.dx;
            }
        }

        if anchors.contains(Anchors::BOTTOM) {
            if anchors.contains(Anchors::TOP) {
                r.height += delta.dy;
            } else {
                r.y += delta.dy;
            }
        }

        r
    }
}

// ── Per-dialog resize reference ──────────────────────────────────────────────

/// Client origin and previous client size of one open dialog.
///
/// The first resize after creation only establishes the reference size;
/// the origin is not known yet at that point (the move notification comes
/// later), so no control may be touched.
#[derive(Debug, Clone, Default)]
pub struct ResizeState {
    origin: Point,
    prev_size: Option<Size>,
}

impl ResizeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen position of the client area's top-left corner.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn record_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Record a new client size and return the change since the last one,
    /// or `None` on the first call.
    pub fn on_resize(&mut self, size: Size) -> Option<Delta> {
        let prev = self.prev_size.replace(size)?;
        Some(Delta {
            dx: size.width - prev.width,
            dy: size.height - prev.height,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const BUTTON: Rect = Rect { x: 10, y: 120, width: 75, height: 23 };
    const GROW: Delta = Delta { dx: 30, dy: 12 };

    #[test]
    fn from_edges_computes_size() {
        let r = Rect::from_edges(5, 7, 105, 57);
        assert_eq!(r, Rect { x: 5, y: 7, width: 100, height: 50 });
    }

    #[test]
    fn relative_to_subtracts_origin() {
        let r = Rect { x: 300, y: 200, width: 10, height: 10 };
        let c = r.relative_to(Point { x: 290, y: 180 });
        assert_eq!(c, Rect { x: 10, y: 20, width: 10, height: 10 });
    }

    #[test]
    fn left_bottom_moves_down_only() {
        let r = BUTTON.anchored(GROW, Anchors::LEFT | Anchors::BOTTOM);
        assert_eq!(r, Rect { y: 132, ..BUTTON });
    }

    #[test]
    fn right_bottom_translates_both_axes() {
        let r = BUTTON.anchored(GROW, Anchors::RIGHT | Anchors::BOTTOM);
        assert_eq!(r, Rect { x: 40, y: 132, ..BUTTON });
    }

    #[test]
    fn all_edges_stretches() {
        let r = BUTTON.anchored(GROW, Anchors::ALL);
        assert_eq!(r, Rect { width: 105, height: 35, ..BUTTON });
    }

    #[test]
    fn shrinking_reverses_growth() {
        let shrink = Delta { dx: -GROW.dx, dy: -GROW.dy };
        for anchors in [
            Anchors::LEFT | Anchors::BOTTOM,
            Anchors::RIGHT | Anchors::BOTTOM,
            Anchors::ALL,
        ] {
            assert_eq!(BUTTON.anchored(GROW, anchors).anchored(shrink, anchors), BUTTON);
        }
    }

    #[test]
    fn first_resize_only_sets_reference() {
        let mut s = ResizeState::new();
        assert_eq!(s.on_resize(Size { width: 400, height: 150 }), None);
        assert_eq!(
            s.on_resize(Size { width: 420, height: 140 }),
            Some(Delta { dx: 20, dy: -10 })
        );
    }

    #[test]
    fn deltas_chain_from_previous_size() {
        let mut s = ResizeState::new();
        s.on_resize(Size { width: 100, height: 100 });
        s.on_resize(Size { width: 150, height: 120 });
        assert_eq!(
            s.on_resize(Size { width: 140, height: 130 }),
            Some(Delta { dx: -10, dy: 10 })
        );
    }

    #[test]
    fn origin_is_recorded() {
        let mut s = ResizeState::new();
        assert_eq!(s.origin(), Point::default());
        s.record_origin(Point { x: 64, y: 48 });
        assert_eq!(s.origin(), Point { x: 64, y: 48 });
    }
}
