//! The host application: a program in a PTY drawn across the whole viewport
//! beneath the panels.

use std::fmt;
use std::time::{Duration, Instant};

use crossterm::event::Event;
use portable_pty::{CommandBuilder, PtySize};
use ratatui::layout::Rect;
use tracing::debug;

use crate::constants::HOST_RESIZE_DEBOUNCE;
use crate::content::pty::PtyResult;
use crate::content::{ContentContext, PanelContent, TerminalView};
use crate::ui::UiFrame;

/// Holds the latest value until no new one has arrived for `quiet`.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Replace any pending value and restart the quiet period.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Take the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (_, since) = self.pending.as_ref()?;
        if now.saturating_duration_since(*since) < self.quiet {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

pub struct HostView {
    content: Box<dyn PanelContent>,
    area: Rect,
    resize: Debounce<Rect>,
}

impl fmt::Debug for HostView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostView")
            .field("area", &self.area)
            .field("resize", &self.resize)
            .finish_non_exhaustive()
    }
}

impl HostView {
    pub fn new(content: Box<dyn PanelContent>, area: Rect) -> Self {
        Self {
            content,
            area,
            resize: Debounce::new(HOST_RESIZE_DEBOUNCE),
        }
    }

    pub fn spawn(command: CommandBuilder, area: Rect) -> PtyResult<Self> {
        let size = PtySize {
            rows: area.height.max(1),
            cols: area.width.max(1),
            pixel_width: 0,
            pixel_height: 0,
        };
        let view = TerminalView::spawn(command, size)?;
        Ok(Self::new(Box::new(view), area))
    }

    /// Area the host content currently occupies.
    pub fn area(&self) -> Rect {
        self.area
    }

    /// Queue a resize; the content only sees it after the debounce window.
    pub fn request_resize(&mut self, area: Rect, now: Instant) {
        self.resize.push(area, now);
    }

    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    /// Apply a settled resize. Returns whether one was applied.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(area) = self.resize.poll(now) else {
            return false;
        };
        if area == self.area {
            return false;
        }
        debug!(width = area.width, height = area.height, "host resized");
        self.area = area;
        self.content.resize(area);
        true
    }

    pub fn handle_event(&mut self, event: &Event) -> bool {
        self.content.handle_event(event)
    }

    pub fn finished(&mut self) -> bool {
        self.content.finished()
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, focused: bool) {
        let area = self.area.intersection(frame.area());
        self.content
            .render(frame, area, &ContentContext::new(focused));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn debounce_waits_for_quiet_period() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(50));
        debounce.push(1, start);
        assert_eq!(debounce.poll(start + Duration::from_millis(30)), None);
        debounce.push(2, start + Duration::from_millis(40));
        assert_eq!(debounce.poll(start + Duration::from_millis(60)), None);
        assert_eq!(debounce.poll(start + Duration::from_millis(90)), Some(2));
        assert_eq!(debounce.poll(start + Duration::from_millis(200)), None);
        assert!(!debounce.is_pending());
    }

    struct Recorder(Rc<RefCell<Vec<Rect>>>);

    impl PanelContent for Recorder {
        fn resize(&mut self, area: Rect) {
            self.0.borrow_mut().push(area);
        }

        fn render(&mut self, _frame: &mut UiFrame<'_>, _area: Rect, _ctx: &ContentContext) {}
    }

    #[test]
    fn host_resize_is_deferred_until_settled() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut host = HostView::new(
            Box::new(Recorder(Rc::clone(&seen))),
            Rect::new(0, 2, 80, 22),
        );
        let start = Instant::now();
        host.request_resize(Rect::new(0, 2, 100, 30), start);
        host.request_resize(Rect::new(0, 2, 120, 40), start + Duration::from_millis(10));
        assert!(!host.tick(start + Duration::from_millis(20)));
        assert!(seen.borrow().is_empty());
        assert!(host.tick(start + HOST_RESIZE_DEBOUNCE + Duration::from_millis(10)));
        assert_eq!(*seen.borrow(), vec![Rect::new(0, 2, 120, 40)]);
        assert_eq!(host.area(), Rect::new(0, 2, 120, 40));
    }

    #[test]
    fn resize_to_same_area_is_skipped() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let area = Rect::new(0, 0, 10, 10);
        let mut host = HostView::new(Box::new(Recorder(Rc::clone(&seen))), area);
        let start = Instant::now();
        host.request_resize(area, start);
        assert!(!host.tick(start + Duration::from_secs(1)));
        assert!(seen.borrow().is_empty());
    }
}
