use std::collections::BTreeMap;
use std::fmt;

use crossterm::event::{Event, MouseEvent, MouseEventKind};
use tracing::debug;

use crate::content::ContentLoader;
use crate::error::{ShellError, ShellResult};
use crate::overlay::PanelId;
use crate::overlay::decorator::PanelDecorator;
use crate::overlay::focus::FocusStack;
use crate::overlay::geometry::{ClampMargins, Viewport};
use crate::overlay::panel::{Panel, PanelSpec, PanelTransition};
use crate::overlay::pointer::{PointerEvent, PointerKind};
use crate::ui::UiFrame;
use crate::unlock::UnlockSignal;

/// All panels of the shell, keyed by id.
///
/// The registry owns the [`FocusStack`] and the pointer capture: while a
/// panel is being dragged every pointer event goes to it, wherever the
/// pointer is.
pub struct PanelRegistry {
    panels: BTreeMap<PanelId, Panel>,
    focus: FocusStack<PanelId>,
    capture: Option<PanelId>,
    loader: Box<dyn ContentLoader>,
}

impl fmt::Debug for PanelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelRegistry")
            .field("panels", &self.panels)
            .field("focus", &self.focus)
            .field("capture", &self.capture)
            .finish_non_exhaustive()
    }
}

impl PanelRegistry {
    pub fn from_specs(
        specs: impl IntoIterator<Item = PanelSpec>,
        margins: ClampMargins,
        loader: Box<dyn ContentLoader>,
    ) -> ShellResult<Self> {
        Self::from_panels(
            specs.into_iter().map(|spec| Panel::new(spec, margins)),
            loader,
        )
    }

    pub fn from_panels(
        panels: impl IntoIterator<Item = Panel>,
        loader: Box<dyn ContentLoader>,
    ) -> ShellResult<Self> {
        let mut map = BTreeMap::new();
        for panel in panels {
            let id = panel.id().clone();
            if map.contains_key(&id) {
                return Err(ShellError::DuplicatePanel(id));
            }
            map.insert(id, panel);
        }
        Ok(Self {
            panels: map,
            focus: FocusStack::new(),
            capture: None,
            loader,
        })
    }

    pub fn panel(&self, id: &str) -> Option<&Panel> {
        self.panels.get(id)
    }

    pub fn focus(&self) -> &FocusStack<PanelId> {
        &self.focus
    }

    pub fn capture(&self) -> Option<&PanelId> {
        self.capture.as_ref()
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.panels.get(id).is_some_and(Panel::is_visible)
    }

    /// Number of panels currently holding a content instance.
    pub fn loaded_count(&self) -> usize {
        self.panels.values().filter(|panel| panel.loaded()).count()
    }

    /// Toggle `id`: show it when hidden, hide it when visible. Unknown ids are
    /// ignored. Returns the new visibility.
    pub fn open(&mut self, id: &str, viewport: Viewport) -> Option<bool> {
        let Some(panel) = self.panels.get_mut(id) else {
            debug!(panel = id, "open ignored for unknown panel");
            return None;
        };
        let transition = panel.toggle(&mut self.focus, viewport, self.loader.as_mut());
        let visible = panel.is_visible();
        self.after_transition(id, transition);
        Some(visible)
    }

    pub fn show(&mut self, id: &str, viewport: Viewport) -> Option<bool> {
        let Some(panel) = self.panels.get_mut(id) else {
            debug!(panel = id, "show ignored for unknown panel");
            return None;
        };
        panel.show(&mut self.focus, viewport, self.loader.as_mut());
        Some(panel.is_visible())
    }

    pub fn hide(&mut self, id: &str) -> Option<bool> {
        let Some(panel) = self.panels.get_mut(id) else {
            debug!(panel = id, "hide ignored for unknown panel");
            return None;
        };
        let transition = panel.hide();
        self.after_transition(id, transition);
        Some(false)
    }

    /// Hide the topmost visible panel, if any.
    pub fn hide_topmost(&mut self) -> Option<PanelId> {
        let id = self.topmost()?;
        self.hide(id.as_str());
        Some(id)
    }

    pub fn bring_to_front(&mut self, id: &str) -> Option<u64> {
        let Some(panel) = self.panels.get(id) else {
            debug!(panel = id, "bring_to_front ignored for unknown panel");
            return None;
        };
        Some(self.focus.bring_to_front(panel.id()))
    }

    pub fn apply_signal(&mut self, signal: UnlockSignal, viewport: Viewport) -> Option<bool> {
        match signal {
            UnlockSignal::Open(id) => self.open(id.as_str(), viewport),
        }
    }

    /// Visible panels, bottom to top.
    pub fn draw_order(&self) -> Vec<PanelId> {
        self.focus
            .order()
            .into_iter()
            .filter(|id| self.is_visible(id.as_str()))
            .collect()
    }

    pub fn topmost(&self) -> Option<PanelId> {
        self.draw_order().pop()
    }

    /// Topmost visible panel under `(x, y)`.
    pub fn panel_at(&self, x: i32, y: i32) -> Option<PanelId> {
        self.draw_order()
            .into_iter()
            .rev()
            .find(|id| self.panels.get(id.as_str()).and_then(|p| p.hit(x, y)).is_some())
    }

    /// Route a pointer event. Returns whether a panel consumed it; unconsumed
    /// events belong to the host application.
    pub fn handle_pointer(&mut self, event: PointerEvent, viewport: Viewport) -> bool {
        match event.kind {
            PointerKind::Down => {
                if self.capture.is_some() {
                    self.release_pointer_capture();
                }
                let Some(id) = self.panel_at(event.x, event.y) else {
                    return false;
                };
                let Some(panel) = self.panels.get_mut(id.as_str()) else {
                    return false;
                };
                let transition = panel.pointer_down(event, &mut self.focus);
                self.after_transition(id.as_str(), transition);
                true
            }
            PointerKind::Move => {
                if let Some(id) = self.capture.clone() {
                    // No button held means the release happened where we could not see it.
                    if event.button.is_none() {
                        self.release_pointer_capture();
                        return true;
                    }
                    if let Some(panel) = self.panels.get_mut(id.as_str()) {
                        panel.drag_to(event.x, event.y, viewport);
                    }
                    return true;
                }
                self.forward_to_panel_at(event)
            }
            PointerKind::Up => {
                if self.capture.is_some() {
                    self.release_pointer_capture();
                    return true;
                }
                self.forward_to_panel_at(event)
            }
        }
    }

    /// Route a raw mouse event, including wheel scrolls which only ever go to
    /// the panel under the pointer.
    pub fn handle_mouse(&mut self, mouse: &MouseEvent, viewport: Viewport) -> bool {
        if let Some(pointer) = PointerEvent::from_mouse(mouse) {
            return self.handle_pointer(pointer, viewport);
        }
        if !matches!(
            mouse.kind,
            MouseEventKind::ScrollUp
                | MouseEventKind::ScrollDown
                | MouseEventKind::ScrollLeft
                | MouseEventKind::ScrollRight
        ) {
            return false;
        }
        let Some(id) = self.panel_at(mouse.column as i32, mouse.row as i32) else {
            return false;
        };
        if let Some(panel) = self.panels.get_mut(id.as_str()) {
            panel.forward_event(&Event::Mouse(*mouse));
        }
        true
    }

    /// End the drag held by the capture, as if the pointer had been released.
    /// Safe to call when nothing is captured.
    pub fn release_pointer_capture(&mut self) -> bool {
        let Some(id) = self.capture.take() else {
            return false;
        };
        if let Some(panel) = self.panels.get_mut(id.as_str()) {
            panel.end_drag();
        }
        debug!(panel = %id, "pointer capture released");
        true
    }

    /// Clamp every visible panel into `viewport`. Returns how many moved.
    pub fn reclamp_visible(&mut self, viewport: Viewport) -> usize {
        self.panels
            .values_mut()
            .filter(|panel| panel.is_visible())
            .map(|panel| panel.reclamp(viewport))
            .filter(|moved| *moved)
            .count()
    }

    /// Send a key or paste to the topmost panel.
    pub fn handle_key(&mut self, event: &Event) -> bool {
        let Some(id) = self.topmost() else {
            return false;
        };
        self.panels
            .get_mut(id.as_str())
            .is_some_and(|panel| panel.forward_event(event))
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, decorator: &dyn PanelDecorator) {
        let order = self.draw_order();
        let top = order.last().cloned();
        for id in order {
            let focused = top.as_ref() == Some(&id);
            if let Some(panel) = self.panels.get_mut(id.as_str()) {
                panel.render(frame, decorator, focused);
            }
        }
    }

    fn forward_to_panel_at(&mut self, event: PointerEvent) -> bool {
        let Some(id) = self.panel_at(event.x, event.y) else {
            return false;
        };
        if let Some(panel) = self.panels.get_mut(id.as_str()) {
            panel.forward_event(&event.to_event());
        }
        true
    }

    fn after_transition(&mut self, id: &str, transition: PanelTransition) {
        match transition {
            PanelTransition::DragStarted => {
                self.capture = Some(PanelId::from(id));
            }
            PanelTransition::Hidden if self.capture.as_ref().is_some_and(|c| c.as_str() == id) => {
                self.capture = None;
            }
            _ => {}
        }
    }
}
