use std::fmt;

use crate::content::PanelContent;
use crate::overlay::geometry::{FloatRect, Footprint, Position};

/// Width of the close control drawn as `[x]` in the title bar.
pub const CLOSE_CONTROL_WIDTH: u16 = 3;

/// The visual element backing a panel: its rendered footprint and the
/// container that holds the content instance while the panel is loaded.
///
/// Regions are derived from the footprint, so a panel never looks its parts
/// up by name.
pub struct PanelElement {
    footprint: Footprint,
    title_rows: u16,
    pub(crate) container: Option<Box<dyn PanelContent>>,
}

impl fmt::Debug for PanelElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelElement")
            .field("footprint", &self.footprint)
            .field("title_rows", &self.title_rows)
            .field("loaded", &self.container.is_some())
            .finish()
    }
}

/// Part of a panel under a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelHit {
    Close,
    TitleBar,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelRegions {
    pub frame: FloatRect,
    pub title_bar: FloatRect,
    pub close: FloatRect,
    pub content: FloatRect,
}

impl PanelRegions {
    pub fn hit(&self, x: i32, y: i32) -> Option<PanelHit> {
        if !self.frame.contains(x, y) {
            None
        } else if self.close.contains(x, y) {
            Some(PanelHit::Close)
        } else if self.title_bar.contains(x, y) {
            Some(PanelHit::TitleBar)
        } else {
            Some(PanelHit::Body)
        }
    }
}

impl PanelElement {
    pub fn new(footprint: Footprint) -> Self {
        Self::with_title_rows(footprint, 1)
    }

    pub fn with_title_rows(footprint: Footprint, title_rows: u16) -> Self {
        Self {
            footprint,
            title_rows: title_rows.max(1),
            container: None,
        }
    }

    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    pub fn is_loaded(&self) -> bool {
        self.container.is_some()
    }

    /// Title bar across the top `title_rows` rows with the close control at
    /// its right end; content inset below it and one cell from the other
    /// edges.
    pub fn regions(&self, origin: Position) -> PanelRegions {
        let Footprint { width, height } = self.footprint;
        let title_rows = self.title_rows.min(height);
        let frame = FloatRect {
            x: origin.left,
            y: origin.top,
            width,
            height,
        };
        let title_bar = FloatRect {
            height: title_rows,
            ..frame
        };
        let close_width = CLOSE_CONTROL_WIDTH.min(width.saturating_sub(2));
        let close = FloatRect {
            x: origin.left + width as i32 - 1 - close_width as i32,
            y: origin.top,
            width: close_width,
            height: height.min(1),
        };
        let content = FloatRect {
            x: origin.left + 1,
            y: origin.top + title_rows as i32,
            width: width.saturating_sub(2),
            height: height.saturating_sub(title_rows + 1),
        };
        PanelRegions {
            frame,
            title_bar,
            close,
            content,
        }
    }
}
