//! Read-only markdown document panel.

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};
use pulldown_cmark::{Event as MdEvent, Options, Parser, Tag, TagEnd};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;

use crate::content::{ContentContext, PanelContent};
use crate::ui::UiFrame;

#[derive(Debug)]
pub struct DocumentView {
    lines: Vec<Line<'static>>,
    offset: usize,
    viewport_rows: usize,
}

impl DocumentView {
    pub fn from_markdown(raw: &str) -> Self {
        Self {
            lines: MarkdownLines::render(raw),
            offset: 0,
            viewport_rows: 0,
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Plain text of each rendered line, without styling.
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
            .collect()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.viewport_rows.max(1))
    }

    fn scroll_by(&mut self, delta: isize) {
        let next = self.offset as isize + delta;
        self.offset = next.clamp(0, self.max_offset() as isize) as usize;
    }
}

impl PanelContent for DocumentView {
    fn resize(&mut self, area: Rect) {
        self.viewport_rows = area.height as usize;
        self.offset = self.offset.min(self.max_offset());
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &ContentContext) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.viewport_rows = area.height as usize;
        self.offset = self.offset.min(self.max_offset());
        frame.fill(area, Style::default());
        let top = self.offset.min(u16::MAX as usize) as u16;
        let paragraph = Paragraph::new(Text::from(self.lines.clone())).scroll((top, 0));
        frame.render_widget(paragraph, area);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        let page = self.viewport_rows.max(1) as isize;
        let delta = match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Up | KeyCode::Char('k') => -1,
                KeyCode::Down | KeyCode::Char('j') => 1,
                KeyCode::PageUp => -page,
                KeyCode::PageDown | KeyCode::Char(' ') => page,
                KeyCode::Home => isize::MIN / 2,
                KeyCode::End => isize::MAX / 2,
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

#[derive(Debug, Default)]
struct ListState {
    next_number: Option<u64>,
}

#[derive(Debug, Default)]
struct MarkdownLines {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    bold: usize,
    italic: usize,
    in_code_block: bool,
    lists: Vec<ListState>,
    table_row: Option<Vec<String>>,
    table_cell: String,
    table_header: bool,
}

impl MarkdownLines {
    fn render(raw: &str) -> Vec<Line<'static>> {
        let mut out = Self::default();
        for event in Parser::new_ext(raw, Options::all()) {
            out.push_event(event);
        }
        out.break_line();
        while out.lines.last().is_some_and(|line| line.spans.is_empty()) {
            out.lines.pop();
        }
        out.lines
    }

    fn style(&self) -> Style {
        let mut style = Style::default();
        if self.bold > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.in_code_block {
            style = Style::default().fg(Color::Yellow);
        }
        style
    }

    fn break_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn blank_line(&mut self) {
        self.break_line();
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn text(&mut self, text: &str) {
        if self.table_row.is_some() {
            self.table_cell.push_str(text);
            return;
        }
        let style = self.style();
        let mut parts = text.split('\n').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                self.current.push(Span::styled(part.to_string(), style));
            }
            if parts.peek().is_some() {
                self.break_line();
            }
        }
    }

    fn push_event(&mut self, event: MdEvent<'_>) {
        match event {
            MdEvent::Start(tag) => self.start(tag),
            MdEvent::End(tag) => self.end(tag),
            MdEvent::Text(text) => self.text(&text),
            MdEvent::Code(code) => {
                if self.table_row.is_some() {
                    self.table_cell.push_str(&code);
                } else {
                    self.current
                        .push(Span::styled(code.to_string(), Style::default().fg(Color::Yellow)));
                }
            }
            MdEvent::SoftBreak => self.text(" "),
            MdEvent::HardBreak => self.break_line(),
            MdEvent::Rule => {
                self.break_line();
                self.lines.push(Line::from("─".repeat(24)));
                self.lines.push(Line::default());
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Strong | Tag::Heading { .. } => self.bold += 1,
            Tag::Emphasis => self.italic += 1,
            Tag::CodeBlock(_) => {
                self.break_line();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                self.break_line();
                self.lists.push(ListState { next_number: start });
            }
            Tag::Item => {
                self.break_line();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut().and_then(|l| l.next_number.as_mut()) {
                    Some(number) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    None => "- ".to_string(),
                };
                self.current
                    .push(Span::raw(format!("{}{marker}", "  ".repeat(depth))));
            }
            Tag::TableHead => {
                self.table_header = true;
                self.table_row = Some(Vec::new());
            }
            Tag::TableRow => self.table_row = Some(Vec::new()),
            Tag::TableCell => self.table_cell.clear(),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::Heading(_) => {
                self.bold = self.bold.saturating_sub(1);
                self.blank_line();
            }
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.break_line();
                }
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.blank_line();
            }
            TagEnd::Item => self.break_line(),
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::TableCell => {
                let cell = std::mem::take(&mut self.table_cell);
                if let Some(row) = self.table_row.as_mut() {
                    row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => {
                let header = std::mem::take(&mut self.table_header);
                if let Some(row) = self.table_row.take() {
                    let style = if header {
                        Style::default().add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    self.lines.push(Line::styled(row.join(" │ "), style));
                }
            }
            TagEnd::Table => self.blank_line(),
            _ => {}
        }
    }
}
