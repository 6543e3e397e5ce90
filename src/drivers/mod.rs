pub mod console;

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::backend::Backend;

use crate::ui::UiFrame;

pub trait InputDriver {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;
    fn read(&mut self) -> io::Result<Event>;
    fn set_mouse_capture(&mut self, _enabled: bool) -> io::Result<()> {
        Ok(())
    }
}

impl<T: InputDriver + ?Sized> InputDriver for &mut T {
    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        (**self).poll(timeout)
    }

    fn read(&mut self) -> io::Result<Event> {
        (**self).read()
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        (**self).set_mouse_capture(enabled)
    }
}

pub trait OutputDriver {
    type Backend: Backend;

    fn enter(&mut self) -> io::Result<()>;
    fn exit(&mut self) -> io::Result<()>;

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(UiFrame<'_>);
}

/// Drop key releases and fold Shift+Tab into BackTab so every terminal
/// reports the same key stream.
pub fn normalize_event(event: Event) -> Option<Event> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Release => None,
        Event::Key(mut key) => {
            if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
                key.code = KeyCode::BackTab;
                key.modifiers.remove(KeyModifiers::SHIFT);
            }
            Some(Event::Key(key))
        }
        other => Some(other),
    }
}

/// Input driver fed from a fixed queue of events; reports no input once the
/// queue is drained.
#[derive(Debug, Default)]
pub struct ScriptedDriver {
    events: VecDeque<Event>,
    mouse_capture: Option<bool>,
}

impl ScriptedDriver {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
            mouse_capture: None,
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn mouse_capture(&self) -> Option<bool> {
        self.mouse_capture
    }

    pub fn is_drained(&self) -> bool {
        self.events.is_empty()
    }
}

impl InputDriver for ScriptedDriver {
    fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
        Ok(!self.events.is_empty())
    }

    fn read(&mut self) -> io::Result<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }

    fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        self.mouse_capture = Some(enabled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    #[test]
    fn normalize_drops_releases_and_maps_backtab() {
        let mut release = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(normalize_event(Event::Key(release)).is_none());

        let shifted = KeyEvent::new(KeyCode::Tab, KeyModifiers::SHIFT);
        let Some(Event::Key(key)) = normalize_event(Event::Key(shifted)) else {
            panic!("expected key event");
        };
        assert_eq!(key.code, KeyCode::BackTab);
        assert!(!key.modifiers.contains(KeyModifiers::SHIFT));
        assert!(normalize_event(Event::Resize(10, 20)).is_some());
    }

    fn read_one(mut driver: impl InputDriver) -> io::Result<Event> {
        driver.read()
    }

    #[test]
    fn scripted_driver_drains_in_order() {
        let mut driver = ScriptedDriver::new([Event::FocusLost, Event::FocusGained]);
        assert!(driver.poll(Duration::ZERO).unwrap());
        assert_eq!(read_one(&mut driver).unwrap(), Event::FocusLost);
        assert_eq!(driver.read().unwrap(), Event::FocusGained);
        assert!(!driver.poll(Duration::ZERO).unwrap());
        assert!(read_one(&mut driver).is_err());
        driver.set_mouse_capture(true).unwrap();
        assert_eq!(driver.mouse_capture(), Some(true));
    }
}
