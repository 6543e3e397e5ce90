use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::MouseButton;
use ratatui::layout::Rect;

use term_overlay::content::{
    ContentContext, ContentError, ContentLoader, ContentSource, PanelContent,
};
use term_overlay::overlay::{
    ClampMargins, Footprint, PanelId, PanelRegistry, PanelSpec, PointerEvent, Position, Viewport,
    ViewportMonitor, clamp,
};
use term_overlay::ui::UiFrame;
use term_overlay::unlock::UnlockSignal;

const WIDE_MARGINS: ClampMargins = ClampMargins::new(4, 43);

/// Counts live instances so tests can observe drops.
struct Probe {
    serial: usize,
    live: Rc<Cell<usize>>,
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

impl PanelContent for Probe {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &ContentContext) {
        frame.set_string(area.x, area.y, &format!("#{}", self.serial), Default::default());
    }
}

#[derive(Clone, Default)]
struct CountingLoader {
    loads: Rc<Cell<usize>>,
    live: Rc<Cell<usize>>,
}

impl ContentLoader for CountingLoader {
    fn load(
        &mut self,
        _source: &ContentSource,
        _area: Rect,
    ) -> Result<Box<dyn PanelContent>, ContentError> {
        self.loads.set(self.loads.get() + 1);
        self.live.set(self.live.get() + 1);
        Ok(Box::new(Probe {
            serial: self.loads.get(),
            live: Rc::clone(&self.live),
        }))
    }
}

fn big_panel_registry(loader: CountingLoader) -> PanelRegistry {
    let spec = PanelSpec::new("board", "Board", ContentSource::document("board.md"))
        .at(100, 100)
        .sized(200, 150)
        .title_rows(12);
    PanelRegistry::from_specs([spec], WIDE_MARGINS, Box::new(loader)).unwrap()
}

#[test]
fn focus_values_strictly_increase() {
    let loader = CountingLoader::default();
    let specs = ["a", "b", "c"].map(|id| PanelSpec::new(id, id, ContentSource::EventLog));
    let mut registry =
        PanelRegistry::from_specs(specs, ClampMargins::chrome(), Box::new(loader)).unwrap();
    let mut last = 0;
    for id in ["a", "b", "a", "c", "c", "b"] {
        let z = registry.bring_to_front(id).unwrap();
        assert!(z > last, "z-order went from {last} to {z}");
        last = z;
    }
    assert_eq!(registry.bring_to_front("ghost"), None);
    assert_eq!(registry.focus().counter(), last);
}

#[test]
fn clamp_is_idempotent_and_bounded() {
    let viewports = [Viewport::new(800, 600), Viewport::new(150, 150), Viewport::new(0, 0)];
    let footprint = Footprint::new(200, 150);
    for viewport in viewports {
        for (left, top) in [(-500, -500), (0, 0), (100, 100), (5000, 5000)] {
            let once = clamp(Position::new(left, top), footprint, viewport, WIDE_MARGINS);
            let twice = clamp(once, footprint, viewport, WIDE_MARGINS);
            assert_eq!(once, twice);
            assert!(once.left >= 4);
            assert!(once.top >= 47);
        }
    }
}

#[test]
fn drag_follows_pointer_and_clamps() {
    let mut registry = big_panel_registry(CountingLoader::default());
    let viewport = Viewport::new(800, 600);
    registry.open("board", viewport);
    assert_eq!(
        registry.panel("board").unwrap().position(),
        Position::new(100, 100)
    );

    assert!(registry.handle_pointer(PointerEvent::down(MouseButton::Left, 120, 110), viewport));
    registry.handle_pointer(PointerEvent::moved(Some(MouseButton::Left), 700, 50), viewport);
    assert_eq!(
        registry.panel("board").unwrap().position(),
        Position::new(596, 47)
    );
    registry.handle_pointer(PointerEvent::up(MouseButton::Left, 700, 50), viewport);
    assert!(registry.capture().is_none());
    assert!(!registry.panel("board").unwrap().is_dragging());
}

#[test]
fn shrinking_viewport_pins_panel_to_corner() {
    let mut registry = big_panel_registry(CountingLoader::default());
    let mut monitor = ViewportMonitor::new(Viewport::new(800, 600));
    registry.open("board", monitor.viewport());
    let z = registry.focus().z_index(&PanelId::from("board"));

    monitor.on_resize(150, 150, &mut registry);
    let panel = registry.panel("board").unwrap();
    assert_eq!(panel.position(), Position::new(4, 47));
    assert!(panel.loaded());
    assert_eq!(registry.focus().z_index(&PanelId::from("board")), z);
}

#[test]
fn content_loads_on_show_and_drops_on_hide() {
    let loader = CountingLoader::default();
    let loads = Rc::clone(&loader.loads);
    let live = Rc::clone(&loader.live);
    let mut registry = big_panel_registry(loader);
    let viewport = Viewport::new(800, 600);

    assert_eq!(registry.loaded_count(), 0);
    assert_eq!(registry.open("board", viewport), Some(true));
    assert_eq!((loads.get(), live.get()), (1, 1));

    let area = Rect::new(0, 0, 800, 600);
    let mut buffer = ratatui::buffer::Buffer::empty(area);
    registry.render(
        &mut UiFrame::from_parts(area, &mut buffer),
        &term_overlay::overlay::FrameDecorator,
    );
    assert_eq!(buffer[(101, 112)].symbol(), "#");
    assert_eq!(buffer[(102, 112)].symbol(), "1");

    assert_eq!(registry.open("board", viewport), Some(false));
    assert_eq!((loads.get(), live.get()), (1, 0));
    assert!(!registry.panel("board").unwrap().loaded());

    registry.open("board", viewport);
    assert_eq!((loads.get(), live.get()), (2, 1));
}

#[test]
fn opening_twice_returns_to_hidden() {
    let mut registry = big_panel_registry(CountingLoader::default());
    let viewport = Viewport::new(800, 600);
    registry.open("board", viewport);
    registry.open("board", viewport);
    assert!(!registry.is_visible("board"));
    assert!(registry.draw_order().is_empty());
}

#[test]
fn unknown_ids_change_nothing() {
    let loader = CountingLoader::default();
    let loads = Rc::clone(&loader.loads);
    let mut registry = big_panel_registry(loader);
    let viewport = Viewport::new(800, 600);
    let counter = registry.focus().counter();
    assert_eq!(registry.open("leaderbored", viewport), None);
    assert_eq!(registry.hide("leaderbored"), None);
    assert_eq!(registry.focus().counter(), counter);
    assert_eq!(loads.get(), 0);
}

#[test]
fn capture_loss_ends_the_drag() {
    let mut registry = big_panel_registry(CountingLoader::default());
    let viewport = Viewport::new(800, 600);
    registry.open("board", viewport);
    registry.handle_pointer(PointerEvent::down(MouseButton::Left, 150, 101), viewport);
    assert!(registry.panel("board").unwrap().is_dragging());

    assert!(registry.release_pointer_capture());
    assert!(!registry.panel("board").unwrap().is_dragging());
    let before = registry.panel("board").unwrap().position();
    assert!(!registry.handle_pointer(PointerEvent::moved(None, 10, 10), viewport));
    assert_eq!(registry.panel("board").unwrap().position(), before);
}

#[test]
fn unlock_signal_opens_the_named_panel() {
    let mut registry = big_panel_registry(CountingLoader::default());
    let viewport = Viewport::new(800, 600);
    let opened = registry.apply_signal(UnlockSignal::Open(PanelId::from("board")), viewport);
    assert_eq!(opened, Some(true));
    assert_eq!(
        registry.topmost().as_ref().map(PanelId::as_str),
        Some("board")
    );
}
