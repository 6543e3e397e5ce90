//! Cell-space geometry shared by the overlay manager.
//!
//! Panel positions are signed so that candidate positions computed during a
//! drag can fall outside the viewport before they are clamped back in.

use ratatui::layout::Rect;

use crate::constants::{PANEL_BORDER_MARGIN, TITLEBAR_HEIGHT, TOOLBAR_HEIGHT};

/// Top-left corner of a panel in viewport cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub left: i32,
    pub top: i32,
}

impl Position {
    pub const fn new(left: i32, top: i32) -> Self {
        Self { left, top }
    }
}

/// Rendered size of a panel, including its frame and title bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Footprint {
    pub width: u16,
    pub height: u16,
}

impl Footprint {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Snapshot of the host viewport size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.width, rect.height)
    }

    pub fn area(&self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }
}

/// Fixed margins applied by [`clamp`]: the border kept free on every edge
/// and the chrome rows reserved at the top of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampMargins {
    pub border: i32,
    pub top_offset: i32,
}

impl ClampMargins {
    pub const fn new(border: i32, top_offset: i32) -> Self {
        Self { border, top_offset }
    }

    /// Margins matching the shell chrome: one title bar row plus one toolbar row.
    pub const fn chrome() -> Self {
        Self::new(
            PANEL_BORDER_MARGIN,
            (TITLEBAR_HEIGHT + TOOLBAR_HEIGHT) as i32,
        )
    }

    pub const fn min_left(&self) -> i32 {
        self.border
    }

    pub const fn min_top(&self) -> i32 {
        self.top_offset + self.border
    }
}

impl Default for ClampMargins {
    fn default() -> Self {
        Self::chrome()
    }
}

/// Keep a panel of `footprint` inside `viewport`.
///
/// The upper bound is applied before the lower bound, so a viewport smaller
/// than the panel pins it to `(border, top_offset + border)` instead of
/// producing a negative coordinate.
pub fn clamp(
    position: Position,
    footprint: Footprint,
    viewport: Viewport,
    margins: ClampMargins,
) -> Position {
    let max_left = viewport.width as i32 - footprint.width as i32 - margins.border;
    let max_top = viewport.height as i32 - footprint.height as i32 - margins.border;
    Position {
        left: position.left.min(max_left).max(margins.min_left()),
        top: position.top.min(max_top).max(margins.min_top()),
    }
}

/// Signed rectangle used for panel regions before they are clipped to the
/// viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        if self.width == 0 || self.height == 0 {
            return false;
        }
        x >= self.x
            && x < self.x + self.width as i32
            && y >= self.y
            && y < self.y + self.height as i32
    }

    /// Intersect with `bounds`, returning `None` when nothing is visible.
    pub fn clip(&self, bounds: Rect) -> Option<Rect> {
        let left = self.x.max(bounds.x as i32);
        let top = self.y.max(bounds.y as i32);
        let right = (self.x + self.width as i32).min(bounds.x as i32 + bounds.width as i32);
        let bottom = (self.y + self.height as i32).min(bounds.y as i32 + bounds.height as i32);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect {
            x: left as u16,
            y: top as u16,
            width: (right - left) as u16,
            height: (bottom - top) as u16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDE_MARGINS: ClampMargins = ClampMargins::new(4, 43);

    #[test]
    fn clamp_keeps_in_range_positions() {
        let out = clamp(
            Position::new(100, 100),
            Footprint::new(200, 150),
            Viewport::new(800, 600),
            WIDE_MARGINS,
        );
        assert_eq!(out, Position::new(100, 100));
    }

    #[test]
    fn clamp_applies_upper_then_lower_bound() {
        let out = clamp(
            Position::new(680, 40),
            Footprint::new(200, 150),
            Viewport::new(800, 600),
            WIDE_MARGINS,
        );
        assert_eq!(out, Position::new(596, 47));
    }

    #[test]
    fn clamp_pins_to_top_left_when_viewport_is_too_small() {
        let out = clamp(
            Position::new(300, 300),
            Footprint::new(200, 150),
            Viewport::new(150, 150),
            WIDE_MARGINS,
        );
        assert_eq!(out, Position::new(4, 47));
    }

    #[test]
    fn clamp_is_idempotent_and_bounded() {
        let footprint = Footprint::new(30, 12);
        let viewports = [
            Viewport::new(0, 0),
            Viewport::new(20, 10),
            Viewport::new(80, 24),
            Viewport::new(200, 60),
        ];
        let positions = [-500, -4, 0, 3, 17, 90, 10_000];
        let margins = ClampMargins::chrome();
        for vp in viewports {
            let max_left = (vp.width as i32 - footprint.width as i32 - margins.border)
                .max(margins.min_left());
            let max_top = (vp.height as i32 - footprint.height as i32 - margins.border)
                .max(margins.min_top());
            for &left in &positions {
                for &top in &positions {
                    let once = clamp(Position::new(left, top), footprint, vp, margins);
                    let twice = clamp(once, footprint, vp, margins);
                    assert_eq!(once, twice, "not idempotent at {left},{top} in {vp:?}");
                    assert!(once.left >= margins.min_left() && once.left <= max_left);
                    assert!(once.top >= margins.min_top() && once.top <= max_top);
                }
            }
        }
    }

    #[test]
    fn float_rect_clip_and_contains() {
        let rect = FloatRect {
            x: -2,
            y: 1,
            width: 5,
            height: 3,
        };
        assert!(rect.contains(-2, 1));
        assert!(!rect.contains(3, 1));
        let bounds = Rect::new(0, 0, 10, 10);
        assert_eq!(rect.clip(bounds), Some(Rect::new(0, 1, 3, 3)));
        let outside = FloatRect {
            x: 20,
            y: 20,
            width: 2,
            height: 2,
        };
        assert_eq!(outside.clip(bounds), None);
    }
}
