//! Floating overlay window manager.
//!
//! Panels float above the host application. Each panel owns its visibility,
//! position, drag state and lazily loaded content; the registry owns the
//! [`FocusStack`] that orders them and the single pointer capture used while
//! a panel is being dragged.

pub mod decorator;
pub mod element;
pub mod focus;
pub mod geometry;
pub mod panel;
pub mod pointer;
pub mod registry;
pub mod viewport;

use std::borrow::Borrow;
use std::fmt;

pub use decorator::{FrameDecorator, PanelDecorator};
pub use element::{PanelElement, PanelHit, PanelRegions};
pub use focus::FocusStack;
pub use geometry::{ClampMargins, FloatRect, Footprint, Position, Viewport, clamp};
pub use panel::{Panel, PanelSpec, PanelTransition};
pub use pointer::{DragState, PointerEvent, PointerKind};
pub use registry::PanelRegistry;
pub use viewport::ViewportMonitor;

/// Stable identifier of a panel, unique within a registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PanelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for PanelId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
