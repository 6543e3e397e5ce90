use crossterm::event::Event;
use tracing::trace;

use crate::overlay::geometry::Viewport;
use crate::overlay::registry::PanelRegistry;

/// Tracks the terminal size and keeps visible panels inside it.
///
/// Reclamping runs on every resize notification without any debounce; only
/// the host application's PTY resize is debounced (see `host`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewportMonitor {
    viewport: Viewport,
}

impl ViewportMonitor {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Record the new size and reclamp every visible panel. Returns how many
    /// panels moved.
    pub fn on_resize(&mut self, width: u16, height: u16, registry: &mut PanelRegistry) -> usize {
        self.viewport = Viewport::new(width, height);
        let moved = registry.reclamp_visible(self.viewport);
        trace!(width, height, moved, "viewport resized");
        moved
    }

    /// Feed a terminal event; only `Resize` is acted on.
    pub fn observe(&mut self, event: &Event, registry: &mut PanelRegistry) -> Option<usize> {
        match event {
            Event::Resize(width, height) => Some(self.on_resize(*width, *height, registry)),
            _ => None,
        }
    }
}
