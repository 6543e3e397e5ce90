use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// Single-threaded pump between the input driver and the shell.
///
/// The handler sees `None` once per iteration (the tick used for drawing and
/// debounce deadlines) and `Some(event)` for every queued input event. PTY
/// readers run on their own threads and only feed buffers this loop drains.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll(&mut self) -> io::Result<Option<Event>> {
        if self.driver.poll(self.poll_interval)? {
            Ok(Some(self.driver.read()?))
        } else {
            Ok(None)
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if handler(&mut self.driver, None)? == ControlFlow::Quit {
                return Ok(());
            }

            if self.driver.poll(self.poll_interval)? {
                // Drain bursts (drags, wheel) before the next tick.
                loop {
                    let event = self.driver.read()?;
                    if handler(&mut self.driver, Some(event))? == ControlFlow::Quit {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::ZERO)? {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ScriptedDriver;

    #[test]
    fn run_drains_burst_between_ticks() {
        let driver = ScriptedDriver::new([Event::FocusGained, Event::FocusLost, Event::Resize(3, 4)]);
        let mut event_loop = EventLoop::new(driver, Duration::ZERO);
        let mut seen = Vec::new();
        event_loop
            .run(|_, event| {
                match event {
                    Some(ev) => seen.push(Some(ev)),
                    None if seen.len() > 3 => return Ok(ControlFlow::Quit),
                    None => seen.push(None),
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(
            seen,
            vec![
                None,
                Some(Event::FocusGained),
                Some(Event::FocusLost),
                Some(Event::Resize(3, 4)),
            ]
        );
    }

    #[test]
    fn quit_from_event_stops_without_draining() {
        let driver = ScriptedDriver::new([Event::FocusGained, Event::FocusLost]);
        let mut event_loop = EventLoop::new(driver, Duration::ZERO);
        event_loop
            .run(|_, event| {
                Ok(if event.is_some() {
                    ControlFlow::Quit
                } else {
                    ControlFlow::Continue
                })
            })
            .unwrap();
        assert!(!event_loop.into_driver().is_drained());
    }

    #[test]
    fn poll_returns_none_when_idle() {
        let mut event_loop = EventLoop::new(ScriptedDriver::default(), Duration::ZERO);
        assert_eq!(event_loop.poll().unwrap(), None);
        event_loop.driver().push(Event::FocusLost);
        assert_eq!(event_loop.poll().unwrap(), Some(Event::FocusLost));
    }
}
