use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use term_overlay::app::{App, Config};
use term_overlay::appearance::FilterMode;
use term_overlay::content::{
    ContentContext, ContentError, ContentLoader, ContentSource, PanelContent,
};
use term_overlay::drivers::{InputDriver, ScriptedDriver};
use term_overlay::event_loop::{ControlFlow, EventLoop};
use term_overlay::overlay::Viewport;
use term_overlay::prefs::{KEY_FILTER, PreferenceStore};
use term_overlay::ui::UiFrame;

struct Blank;

impl PanelContent for Blank {
    fn render(&mut self, _frame: &mut UiFrame<'_>, _area: Rect, _ctx: &ContentContext) {}
}

struct BlankLoader;

impl ContentLoader for BlankLoader {
    fn load(
        &mut self,
        _source: &ContentSource,
        _area: Rect,
    ) -> Result<Box<dyn PanelContent>, ContentError> {
        Ok(Box::new(Blank))
    }
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn click(column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

fn app_with_code(code: Option<&str>) -> App {
    let config = Config {
        unlock_code: code.map(str::to_string),
        ..Config::default()
    };
    App::new(
        &config,
        Box::new(BlankLoader),
        None,
        PreferenceStore::in_memory(),
        Viewport::new(100, 40),
    )
    .unwrap()
}

fn draw(app: &mut App) -> Buffer {
    let area = Rect::new(0, 0, 100, 40);
    let mut buffer = Buffer::empty(area);
    app.draw(&mut UiFrame::from_parts(area, &mut buffer));
    buffer
}

fn row(buffer: &Buffer, y: u16) -> String {
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol().to_string())
        .collect()
}

#[test]
fn scripted_session_unlocks_a_tool_and_quits() {
    let mut app = app_with_code(Some("42"));
    let script = [
        key(KeyCode::F(2)),
        key(KeyCode::F(3)),
        key(KeyCode::Char('4')),
        key(KeyCode::Char('2')),
        key(KeyCode::Enter),
        Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)),
        key(KeyCode::F(2)),
    ];
    let mut event_loop = EventLoop::new(ScriptedDriver::new(script), Duration::ZERO);
    event_loop
        .run(|_, event| {
            let now = Instant::now();
            match event {
                Some(event) => app.handle_event(&event, now),
                None => app.tick(now),
            }
            Ok(if app.should_quit() {
                ControlFlow::Quit
            } else {
                ControlFlow::Continue
            })
        })
        .unwrap();

    assert!(app.registry().is_visible("leaderboard"));
    assert!(app.registry().is_visible("tool-a"));
    assert!(!app.gate().is_active());
    assert!(!event_loop.into_driver().is_drained());
}

#[test]
fn gated_tool_stays_closed_on_wrong_code() {
    let mut app = app_with_code(Some("42"));
    let now = Instant::now();
    app.handle_event(&key(KeyCode::F(4)), now);
    assert!(app.gate().is_active());
    for event in [key(KeyCode::Char('7')), key(KeyCode::Enter)] {
        app.handle_event(&event, now);
    }
    assert!(app.gate().is_active());
    assert!(!app.registry().is_visible("tool-b"));

    // Shortcuts are swallowed while the prompt is up.
    app.handle_event(&key(KeyCode::F(2)), now);
    assert!(!app.registry().is_visible("leaderboard"));
    app.handle_event(&key(KeyCode::Esc), now);
    assert!(!app.gate().is_active());
}

#[test]
fn without_a_code_the_tools_never_open() {
    let mut app = app_with_code(None);
    let now = Instant::now();
    app.handle_event(&key(KeyCode::F(3)), now);
    app.handle_event(&key(KeyCode::Enter), now);
    assert!(!app.registry().is_visible("tool-a"));
}

#[test]
fn toolbar_click_toggles_and_panel_renders() {
    let mut app = app_with_code(None);
    draw(&mut app);
    let now = Instant::now();
    app.handle_event(&click(3, 1), now);
    assert!(app.registry().is_visible("leaderboard"));

    let buffer = draw(&mut app);
    let position = app.registry().panel("leaderboard").unwrap().position();
    assert!(row(&buffer, position.top as u16).contains("Leaderboard"));

    // Close control sits at the right end of the title bar.
    let close_x = (position.left + 48 - 3) as u16;
    app.handle_event(&click(close_x, position.top as u16), now);
    assert!(!app.registry().is_visible("leaderboard"));
}

#[test]
fn focus_loss_releases_a_drag() {
    let mut app = app_with_code(None);
    let now = Instant::now();
    app.handle_event(&key(KeyCode::F(2)), now);
    let position = app.registry().panel("leaderboard").unwrap().position();
    app.handle_event(&click(position.left as u16 + 4, position.top as u16), now);
    assert!(app.registry().capture().is_some());

    app.handle_event(&Event::FocusLost, now);
    assert!(app.registry().capture().is_none());
    assert!(!app.registry().panel("leaderboard").unwrap().is_dragging());
}

#[test]
fn resize_reclamps_visible_panels() {
    let mut app = app_with_code(None);
    let now = Instant::now();
    app.handle_event(&key(KeyCode::F(2)), now);
    app.handle_event(&Event::Resize(30, 12), now);
    assert_eq!(app.viewport(), Viewport::new(30, 12));
    let position = app.registry().panel("leaderboard").unwrap().position();
    assert_eq!((position.left, position.top), (1, 3));
}

#[test]
fn filter_cycle_is_persisted_and_drawn() {
    let mut app = app_with_code(None);
    let now = Instant::now();
    app.handle_event(&key(KeyCode::F(7)), now);
    assert_eq!(app.appearance().filter, FilterMode::On);
    assert_eq!(app.prefs().get(KEY_FILTER), Some("on"));
    let buffer = draw(&mut app);
    assert!(row(&buffer, 1).contains("Filter: on"));
}

#[test]
fn close_topmost_hides_the_most_recent_panel() {
    let mut app = app_with_code(Some("x"));
    let now = Instant::now();
    app.handle_event(&key(KeyCode::F(2)), now);
    assert!(app.request_panel("nope").is_err());
    app.handle_event(&key(KeyCode::F(6)), now);
    assert!(!app.registry().is_visible("leaderboard"));
    app.handle_event(&key(KeyCode::F(6)), now);
}

#[test]
fn opening_the_unlock_prompt_ends_a_drag() {
    let mut app = app_with_code(Some("42"));
    let now = Instant::now();
    app.handle_event(&key(KeyCode::F(2)), now);
    let start = app.registry().panel("leaderboard").unwrap().position();
    app.handle_event(&click(start.left as u16 + 4, start.top as u16), now);
    assert!(app.registry().capture().is_some());

    app.handle_event(&key(KeyCode::F(3)), now);
    assert!(app.gate().is_active());
    assert!(app.registry().capture().is_none());

    app.handle_event(&mouse(MouseEventKind::Up(MouseButton::Left), 50, 20), now);
    app.handle_event(&key(KeyCode::Esc), now);
    app.handle_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 40, 20), now);
    let panel = app.registry().panel("leaderboard").unwrap();
    assert!(!panel.is_dragging());
    assert_eq!(panel.position(), start);
}

#[test]
fn buttonless_move_during_a_drag_releases_it() {
    let mut app = app_with_code(None);
    let now = Instant::now();
    app.handle_event(&key(KeyCode::F(2)), now);
    let start = app.registry().panel("leaderboard").unwrap().position();
    app.handle_event(&click(start.left as u16 + 4, start.top as u16), now);
    assert!(app.registry().capture().is_some());

    app.handle_event(&mouse(MouseEventKind::Moved, 40, 20), now);
    let panel = app.registry().panel("leaderboard").unwrap();
    assert!(app.registry().capture().is_none());
    assert!(!panel.is_dragging());
    assert_eq!(panel.position(), start);
}

#[test]
fn disabling_mouse_capture_ends_a_drag_and_reaches_the_driver() {
    let mut app = app_with_code(None);
    let now = Instant::now();
    app.handle_event(&key(KeyCode::F(2)), now);
    let start = app.registry().panel("leaderboard").unwrap().position();
    app.handle_event(&click(start.left as u16 + 4, start.top as u16), now);
    assert!(app.registry().capture().is_some());

    let mut event_loop =
        EventLoop::new(ScriptedDriver::new([key(KeyCode::F(9))]), Duration::ZERO);
    let mut ticks = 0;
    event_loop
        .run(|input, event| {
            match event {
                Some(event) => app.handle_event(&event, Instant::now()),
                None => {
                    if let Some(enabled) = app.take_mouse_capture_change() {
                        input.set_mouse_capture(enabled)?;
                    }
                    ticks += 1;
                }
            }
            Ok(if ticks > 1 {
                ControlFlow::Quit
            } else {
                ControlFlow::Continue
            })
        })
        .unwrap();

    assert!(!app.mouse_capture_enabled());
    assert!(app.registry().capture().is_none());
    assert!(!app.registry().panel("leaderboard").unwrap().is_dragging());
    assert_eq!(event_loop.driver().mouse_capture(), Some(false));
    assert_eq!(app.take_mouse_capture_change(), None);
}
