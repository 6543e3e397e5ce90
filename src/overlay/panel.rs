use crossterm::event::Event;
use tracing::{debug, warn};

use crate::content::{ContentContext, ContentLoader, ContentSource, UnavailableView};
use crate::overlay::PanelId;
use crate::overlay::decorator::PanelDecorator;
use crate::overlay::element::{PanelElement, PanelHit, PanelRegions};
use crate::overlay::focus::FocusStack;
use crate::overlay::geometry::{ClampMargins, Footprint, Position, Viewport, clamp};
use crate::overlay::pointer::{DragState, PointerEvent};
use crate::ui::UiFrame;

/// Declarative configuration of one panel.
#[derive(Debug, Clone)]
pub struct PanelSpec {
    pub id: PanelId,
    pub title: String,
    pub source: ContentSource,
    pub default_position: Position,
    pub footprint: Footprint,
    /// Rows taken by the title bar, the drag handle.
    pub title_rows: u16,
    /// Gated panels are only shown through the unlock prompt.
    pub gated: bool,
}

impl PanelSpec {
    pub fn new(id: impl Into<PanelId>, title: impl Into<String>, source: ContentSource) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            source,
            default_position: Position::default(),
            footprint: Footprint::new(40, 12),
            title_rows: 1,
            gated: false,
        }
    }

    pub fn at(mut self, left: i32, top: i32) -> Self {
        self.default_position = Position::new(left, top);
        self
    }

    pub fn sized(mut self, width: u16, height: u16) -> Self {
        self.footprint = Footprint::new(width, height);
        self
    }

    pub fn title_rows(mut self, rows: u16) -> Self {
        self.title_rows = rows;
        self
    }

    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }
}

/// Outcome of a state-transition call on a [`Panel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelTransition {
    Shown { loaded_now: bool },
    Hidden,
    DragStarted,
    Dragged(Position),
    DragEnded,
    Focused,
    Ignored,
}

/// One floating overlay.
#[derive(Debug)]
pub struct Panel {
    spec: PanelSpec,
    element: Option<PanelElement>,
    position: Position,
    visible: bool,
    drag: DragState,
    margins: ClampMargins,
}

impl Panel {
    pub fn new(spec: PanelSpec, margins: ClampMargins) -> Self {
        let element = PanelElement::with_title_rows(spec.footprint, spec.title_rows);
        let mut panel = Self::detached(spec, margins);
        panel.element = Some(element);
        panel
    }

    /// A panel whose visual element was never attached. Every operation that
    /// needs the element is a logged no-op.
    pub fn detached(spec: PanelSpec, margins: ClampMargins) -> Self {
        Self {
            position: spec.default_position,
            spec,
            element: None,
            visible: false,
            drag: DragState::Idle,
            margins,
        }
    }

    pub fn id(&self) -> &PanelId {
        &self.spec.id
    }

    pub fn spec(&self) -> &PanelSpec {
        &self.spec
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn loaded(&self) -> bool {
        self.element.as_ref().is_some_and(PanelElement::is_loaded)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn footprint(&self) -> Option<Footprint> {
        self.element.as_ref().map(PanelElement::footprint)
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn regions(&self) -> Option<PanelRegions> {
        self.element
            .as_ref()
            .map(|element| element.regions(self.position))
    }

    /// Part of the panel under `(x, y)`; hidden panels are never hit.
    pub fn hit(&self, x: i32, y: i32) -> Option<PanelHit> {
        if !self.visible {
            return None;
        }
        self.regions()?.hit(x, y)
    }

    pub fn toggle(
        &mut self,
        focus: &mut FocusStack<PanelId>,
        viewport: Viewport,
        loader: &mut dyn ContentLoader,
    ) -> PanelTransition {
        if self.visible {
            self.hide()
        } else {
            self.show(focus, viewport, loader)
        }
    }

    /// Load content if needed, come to the front and clamp into `viewport`.
    pub fn show(
        &mut self,
        focus: &mut FocusStack<PanelId>,
        viewport: Viewport,
        loader: &mut dyn ContentLoader,
    ) -> PanelTransition {
        if self.visible {
            return PanelTransition::Ignored;
        }
        let Some(element) = self.element.as_mut() else {
            warn!(panel = %self.spec.id, "show requested before panel element is attached");
            return PanelTransition::Ignored;
        };
        self.position = clamp(self.position, element.footprint(), viewport, self.margins);
        let regions = element.regions(self.position);
        let area = regions.content.clip(viewport.area()).unwrap_or_default();
        let loaded_now = element.container.is_none();
        if loaded_now {
            let content = match loader.load(&self.spec.source, area) {
                Ok(content) => content,
                Err(err) => {
                    warn!(panel = %self.spec.id, source = %self.spec.source, %err, "content failed to load");
                    Box::new(UnavailableView::new(&self.spec.source))
                }
            };
            element.container = Some(content);
        }
        if let Some(content) = element.container.as_mut() {
            content.resize(area);
        }
        let z = focus.bring_to_front(&self.spec.id);
        self.visible = true;
        debug!(panel = %self.spec.id, z, loaded_now, left = self.position.left, top = self.position.top, "panel shown");
        PanelTransition::Shown { loaded_now }
    }

    /// Drop the content and become hidden. Ends any drag in progress; the
    /// caller owns the pointer capture and must release it.
    pub fn hide(&mut self) -> PanelTransition {
        if !self.visible {
            return PanelTransition::Ignored;
        }
        self.drag = DragState::Idle;
        if let Some(element) = self.element.as_mut() {
            element.container = None;
        }
        self.visible = false;
        debug!(panel = %self.spec.id, "panel hidden");
        PanelTransition::Hidden
    }

    /// Re-apply the clamp against a new viewport and resize the content to
    /// the part of the panel now on screen. Returns whether the position
    /// changed.
    pub fn reclamp(&mut self, viewport: Viewport) -> bool {
        if !self.visible {
            return false;
        }
        let Some(element) = self.element.as_mut() else {
            warn!(panel = %self.spec.id, "reclamp requested before panel element is attached");
            return false;
        };
        let next = clamp(self.position, element.footprint(), viewport, self.margins);
        let moved = next != self.position;
        self.position = next;
        let area = element
            .regions(next)
            .content
            .clip(viewport.area())
            .unwrap_or_default();
        if let Some(content) = element.container.as_mut() {
            content.resize(area);
        }
        moved
    }

    /// Pointer-down somewhere on the panel. The close control hides, the
    /// title bar starts a drag and the body focuses and forwards to content.
    pub fn pointer_down(
        &mut self,
        event: PointerEvent,
        focus: &mut FocusStack<PanelId>,
    ) -> PanelTransition {
        let Some(hit) = self.hit(event.x, event.y) else {
            return PanelTransition::Ignored;
        };
        match hit {
            PanelHit::Close => self.hide(),
            PanelHit::TitleBar => {
                let Some(button) = event.button else {
                    return PanelTransition::Ignored;
                };
                if self.drag.is_dragging() {
                    return PanelTransition::Ignored;
                }
                focus.bring_to_front(&self.spec.id);
                self.drag = DragState::Dragging {
                    pointer: button,
                    offset_x: event.x - self.position.left,
                    offset_y: event.y - self.position.top,
                };
                debug!(panel = %self.spec.id, "drag started");
                PanelTransition::DragStarted
            }
            PanelHit::Body => {
                focus.bring_to_front(&self.spec.id);
                self.forward_event(&event.to_event());
                PanelTransition::Focused
            }
        }
    }

    /// Move the panel so the grab point follows the pointer, clamped.
    pub fn drag_to(&mut self, x: i32, y: i32, viewport: Viewport) -> PanelTransition {
        let DragState::Dragging {
            offset_x, offset_y, ..
        } = self.drag
        else {
            return PanelTransition::Ignored;
        };
        let Some(footprint) = self.footprint() else {
            return PanelTransition::Ignored;
        };
        let candidate = Position::new(x - offset_x, y - offset_y);
        self.position = clamp(candidate, footprint, viewport, self.margins);
        PanelTransition::Dragged(self.position)
    }

    pub fn end_drag(&mut self) -> PanelTransition {
        if !self.drag.is_dragging() {
            return PanelTransition::Ignored;
        }
        self.drag = DragState::Idle;
        debug!(panel = %self.spec.id, left = self.position.left, top = self.position.top, "drag ended");
        PanelTransition::DragEnded
    }

    pub fn forward_event(&mut self, event: &Event) -> bool {
        if !self.visible {
            return false;
        }
        self.element
            .as_mut()
            .and_then(|element| element.container.as_mut())
            .is_some_and(|content| content.handle_event(event))
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, decorator: &dyn PanelDecorator, focused: bool) {
        if !self.visible {
            return;
        }
        let Some(element) = self.element.as_mut() else {
            return;
        };
        let regions = element.regions(self.position);
        decorator.render_panel(frame, &regions, &self.spec.title, focused);
        let Some(area) = regions.content.clip(frame.area()) else {
            return;
        };
        if let Some(content) = element.container.as_mut() {
            content.render(frame, area, &ContentContext::new(focused));
        }
    }
}
