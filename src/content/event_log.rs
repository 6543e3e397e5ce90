//! In-memory ring buffer fed by the tracing subscriber, plus the panel view
//! that tails it.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::Paragraph;

use crate::constants::EVENT_LOG_MAX_LINES;
use crate::content::{ContentContext, PanelContent};
use crate::ui::UiFrame;

static GLOBAL_LOG: OnceLock<EventLogHandle> = OnceLock::new();
static PANIC_HOOK: OnceLock<()> = OnceLock::new();

/// Install `handle` as the process-wide log sink. Returns `false` when one is
/// already installed.
pub fn install_global(handle: EventLogHandle) -> bool {
    GLOBAL_LOG.set(handle).is_ok()
}

pub fn global() -> Option<EventLogHandle> {
    GLOBAL_LOG.get().cloned()
}

/// Chain a panic hook that copies the panic message and location into the
/// global log before the previous hook runs.
pub fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Some(handle) = GLOBAL_LOG.get() {
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "<non-string panic>".to_string());
            handle.push(format!("panic: {message}"));
            if let Some(location) = info.location() {
                handle.push(format!(
                    "  at {}:{}:{}",
                    location.file(),
                    location.line(),
                    location.column()
                ));
            }
        }
        previous(info);
    }));
}

#[derive(Debug)]
struct Ring {
    lines: VecDeque<String>,
    capacity: usize,
    total: u64,
}

#[derive(Clone, Debug)]
pub struct EventLogHandle {
    inner: Arc<Mutex<Ring>>,
}

impl EventLogHandle {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Ring {
                lines: VecDeque::new(),
                capacity: capacity.max(1),
                total: 0,
            })),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut ring) = self.inner.lock() {
            ring.lines.push_back(line.into());
            ring.total += 1;
            while ring.lines.len() > ring.capacity {
                ring.lines.pop_front();
            }
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|ring| ring.lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of lines ever pushed, including evicted ones.
    pub fn total(&self) -> u64 {
        self.inner.lock().map(|ring| ring.total).unwrap_or(0)
    }

    pub fn writer(&self) -> EventLogWriter {
        EventLogWriter {
            handle: self.clone(),
            partial: Vec::new(),
        }
    }
}

impl Default for EventLogHandle {
    fn default() -> Self {
        Self::new(EVENT_LOG_MAX_LINES)
    }
}

/// `io::Write` adapter that splits formatter output into log lines.
#[derive(Debug)]
pub struct EventLogWriter {
    handle: EventLogHandle,
    partial: Vec<u8>,
}

impl EventLogWriter {
    fn emit(&self, bytes: &[u8]) {
        for line in String::from_utf8_lossy(bytes).split('\n') {
            let line = line.trim_end_matches('\r');
            if !line.is_empty() {
                self.handle.push(line.to_string());
            }
        }
    }
}

impl Write for EventLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.extend_from_slice(buf);
        if let Some(end) = self.partial.iter().rposition(|b| *b == b'\n') {
            let complete: Vec<u8> = self.partial.drain(..=end).collect();
            self.emit(&complete);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let rest = std::mem::take(&mut self.partial);
        self.emit(&rest);
        Ok(())
    }
}

impl Drop for EventLogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Tails the event log; scrolling up detaches from the tail until the view is
/// scrolled back to the bottom.
#[derive(Debug)]
pub struct EventLogView {
    handle: EventLogHandle,
    offset: usize,
    follow: bool,
    rows: usize,
    len: usize,
}

impl EventLogView {
    pub fn new(handle: EventLogHandle) -> Self {
        Self {
            handle,
            offset: 0,
            follow: true,
            rows: 0,
            len: 0,
        }
    }

    pub fn new_with_handle(capacity: usize) -> (Self, EventLogHandle) {
        let handle = EventLogHandle::new(capacity);
        (Self::new(handle.clone()), handle)
    }

    pub fn following(&self) -> bool {
        self.follow
    }

    fn bottom(&self) -> usize {
        self.len.saturating_sub(self.rows.max(1))
    }

    fn scroll_by(&mut self, delta: isize) {
        let next = (self.offset as isize + delta).clamp(0, self.bottom() as isize);
        self.offset = next as usize;
        self.follow = self.offset >= self.bottom();
    }
}

impl PanelContent for EventLogView {
    fn resize(&mut self, area: Rect) {
        self.rows = area.height as usize;
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ContentContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let lines = self.handle.snapshot();
        self.rows = area.height as usize;
        self.len = lines.len();
        self.offset = if self.follow {
            self.bottom()
        } else {
            self.offset.min(self.bottom())
        };
        frame.fill(area, Style::default());
        let style = if ctx.focused() {
            Style::default()
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        let text = Text::from(lines.into_iter().map(Line::from).collect::<Vec<_>>());
        let top = self.offset.min(u16::MAX as usize) as u16;
        frame.render_widget(Paragraph::new(text).style(style).scroll((top, 0)), area);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        let page = self.rows.max(1) as isize;
        let delta = match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Up => -1,
                KeyCode::Down => 1,
                KeyCode::PageUp => -page,
                KeyCode::PageDown => page,
                KeyCode::Home => -(self.len as isize),
                KeyCode::End => self.len as isize,
                _ => return false,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => -3,
                MouseEventKind::ScrollDown => 3,
                _ => return false,
            },
            _ => return false,
        };
        self.scroll_by(delta);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use ratatui::buffer::Buffer;

    #[test]
    fn ring_evicts_oldest_lines() {
        let handle = EventLogHandle::new(3);
        for line in ["one", "two", "three", "four"] {
            handle.push(line);
        }
        assert_eq!(handle.snapshot(), vec!["two", "three", "four"]);
        assert_eq!(handle.total(), 4);
    }

    #[test]
    fn writer_splits_lines_and_flushes_partial() {
        let handle = EventLogHandle::new(10);
        let mut writer = handle.writer();
        writer.write_all(b"first\r\nsecond\npart").unwrap();
        assert_eq!(handle.snapshot(), vec!["first", "second"]);
        writer.flush().unwrap();
        assert_eq!(handle.snapshot(), vec!["first", "second", "part"]);
    }

    #[test]
    fn view_follows_tail_until_scrolled_up() {
        let (mut view, handle) = EventLogView::new_with_handle(50);
        for i in 0..20 {
            handle.push(format!("line {i}"));
        }
        let area = Rect::new(0, 0, 12, 5);
        let mut buf = Buffer::empty(area);
        let ctx = ContentContext::new(true);
        view.render(&mut UiFrame::from_parts(area, &mut buf), area, &ctx);
        assert_eq!(buf.cell((0, 4)).map(|c| c.symbol()), Some("l"));
        assert!(view.following());

        let up = Event::Key(KeyEvent::new(KeyCode::PageUp, KeyModifiers::NONE));
        assert!(view.handle_event(&up));
        assert!(!view.following());

        let end = Event::Key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE));
        assert!(view.handle_event(&end));
        assert!(view.following());
    }
}
