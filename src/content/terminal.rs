use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use portable_pty::{CommandBuilder, PtySize};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use vt100::{MouseProtocolEncoding, MouseProtocolMode};

use crate::constants::TERMINAL_SCROLLBACK_LEN;
use crate::content::pty::{PtyResult, PtySession};
use crate::content::{ContentContext, PanelContent};
use crate::ui::UiFrame;

const SCROLLBACK_PAGE: usize = 10;

/// A PTY child drawn from its `vt100` screen.
pub struct TerminalView {
    session: PtySession,
    last_area: Rect,
}

impl TerminalView {
    pub fn spawn(command: CommandBuilder, size: PtySize) -> PtyResult<Self> {
        let session = PtySession::spawn(command, size, TERMINAL_SCROLLBACK_LEN)?;
        Ok(Self {
            session,
            last_area: Rect::default(),
        })
    }

    pub fn has_exited(&mut self) -> bool {
        self.session.has_exited()
    }

    pub fn size(&self) -> PtySize {
        self.session.size()
    }

    fn page_scrollback(&mut self, up: bool) {
        let current = self.session.scrollback();
        let next = if up {
            current.saturating_add(SCROLLBACK_PAGE)
        } else {
            current.saturating_sub(SCROLLBACK_PAGE)
        };
        self.session.set_scrollback(next);
    }

    fn forward_mouse(&mut self, mouse: &MouseEvent) -> bool {
        let area = self.last_area;
        let inside = mouse.column >= area.x
            && mouse.column < area.x.saturating_add(area.width)
            && mouse.row >= area.y
            && mouse.row < area.y.saturating_add(area.height);
        if !inside {
            return false;
        }
        let screen = self.session.screen();
        if screen.mouse_protocol_encoding() != MouseProtocolEncoding::Sgr
            || !mouse_event_allowed(screen.mouse_protocol_mode(), mouse.kind)
        {
            return false;
        }
        let local = MouseEvent {
            column: mouse.column - area.x,
            row: mouse.row - area.y,
            ..*mouse
        };
        self.write(&sgr_mouse_bytes(local))
    }

    fn write(&mut self, bytes: &[u8]) -> bool {
        if bytes.is_empty() {
            return false;
        }
        if let Err(err) = self.session.write_bytes(bytes) {
            tracing::warn!(%err, "terminal input write failed");
        }
        true
    }

    fn draw_screen(&mut self, frame: &mut UiFrame<'_>, area: Rect, focused: bool) {
        let show_cursor = self.session.scrollback() == 0;
        let screen = self.session.screen();
        let buffer = frame.buffer_mut();
        let visible = area.intersection(buffer.area);
        if visible.width == 0 || visible.height == 0 {
            return;
        }
        let first_col = visible.x - area.x;
        let first_row = visible.y - area.y;
        for row in first_row..first_row + visible.height {
            for col in first_col..first_col + visible.width {
                let Some(target) = buffer.cell_mut((area.x + col, area.y + row)) else {
                    continue;
                };
                target.reset();
                let Some(cell) = screen.cell(row, col) else {
                    target.set_symbol(" ");
                    continue;
                };
                let symbol = if cell.is_wide_continuation() {
                    ' '
                } else {
                    cell.contents().chars().next().unwrap_or(' ')
                };
                let mut utf8 = [0u8; 4];
                target
                    .set_symbol(symbol.encode_utf8(&mut utf8))
                    .set_style(cell_style(cell, screen));
            }
        }
        if focused && show_cursor && !screen.hide_cursor() {
            let (row, col) = screen.cursor_position();
            if row < area.height
                && col < area.width
                && let Some(cell) = buffer.cell_mut((area.x + col, area.y + row))
            {
                cell.set_style(cell.style().add_modifier(Modifier::REVERSED));
            }
        }
    }
}

impl PanelContent for TerminalView {
    fn resize(&mut self, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let size = PtySize {
            rows: area.height,
            cols: area.width,
            pixel_width: 0,
            pixel_height: 0,
        };
        if let Err(err) = self.session.resize(size) {
            tracing::warn!(%err, "terminal resize failed");
        }
    }

    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ContentContext) {
        self.last_area = area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.draw_screen(frame, area, ctx.focused());
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if key.modifiers.contains(KeyModifiers::SHIFT)
                    && matches!(key.code, KeyCode::PageUp | KeyCode::PageDown)
                    && !self.session.alternate_screen()
                {
                    self.page_scrollback(key.code == KeyCode::PageUp);
                    return true;
                }
                let bytes = key_to_bytes(*key);
                if !bytes.is_empty() && self.session.scrollback() > 0 {
                    self.session.set_scrollback(0);
                }
                self.write(&bytes)
            }
            Event::Mouse(mouse) => self.forward_mouse(mouse),
            Event::Paste(text) => self.write(text.as_bytes()),
            _ => false,
        }
    }

    fn finished(&mut self) -> bool {
        self.session.has_exited()
    }
}

#[cfg(unix)]
pub fn default_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "bash".to_string())
}

#[cfg(windows)]
pub fn default_shell() -> String {
    std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
}

pub fn default_shell_command() -> CommandBuilder {
    let mut cmd = CommandBuilder::new(default_shell());
    if let Ok(cwd) = std::env::current_dir() {
        cmd.cwd(cwd);
    }
    cmd
}

pub(crate) fn key_to_bytes(key: KeyEvent) -> Vec<u8> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => match ctrl_char(c) {
            Some(byte) => vec![byte],
            None => c.to_string().into_bytes(),
        },
        KeyCode::Char(c) => c.to_string().into_bytes(),
        KeyCode::Enter => vec![b'\r'],
        KeyCode::Backspace => vec![0x7f],
        KeyCode::Esc => vec![0x1b],
        KeyCode::Tab => vec![b'\t'],
        KeyCode::BackTab => b"\x1b[Z".to_vec(),
        KeyCode::Up => b"\x1b[A".to_vec(),
        KeyCode::Down => b"\x1b[B".to_vec(),
        KeyCode::Right => b"\x1b[C".to_vec(),
        KeyCode::Left => b"\x1b[D".to_vec(),
        KeyCode::Home => b"\x1b[H".to_vec(),
        KeyCode::End => b"\x1b[F".to_vec(),
        KeyCode::Delete => b"\x1b[3~".to_vec(),
        KeyCode::PageUp => b"\x1b[5~".to_vec(),
        KeyCode::PageDown => b"\x1b[6~".to_vec(),
        _ => Vec::new(),
    }
}

fn ctrl_char(c: char) -> Option<u8> {
    let lower = c.to_ascii_lowercase();
    lower
        .is_ascii_lowercase()
        .then(|| lower as u8 - b'a' + 1)
}

fn mouse_event_allowed(mode: MouseProtocolMode, kind: MouseEventKind) -> bool {
    match mode {
        MouseProtocolMode::None => false,
        MouseProtocolMode::Press => matches!(kind, MouseEventKind::Down(_)),
        MouseProtocolMode::PressRelease => {
            matches!(kind, MouseEventKind::Down(_) | MouseEventKind::Up(_))
        }
        MouseProtocolMode::ButtonMotion => matches!(
            kind,
            MouseEventKind::Down(_) | MouseEventKind::Up(_) | MouseEventKind::Drag(_)
        ),
        MouseProtocolMode::AnyMotion => true,
    }
}

fn button_code(button: MouseButton) -> u16 {
    match button {
        MouseButton::Left => 0,
        MouseButton::Middle => 1,
        MouseButton::Right => 2,
    }
}

fn sgr_mouse_bytes(mouse: MouseEvent) -> Vec<u8> {
    let (mut code, release) = match mouse.kind {
        MouseEventKind::Down(button) => (button_code(button), false),
        MouseEventKind::Up(_) => (3, true),
        MouseEventKind::Drag(button) => (32 + button_code(button), false),
        MouseEventKind::Moved => (35, false),
        MouseEventKind::ScrollUp => (64, false),
        MouseEventKind::ScrollDown => (65, false),
        MouseEventKind::ScrollLeft => (66, false),
        MouseEventKind::ScrollRight => (67, false),
    };
    for (modifier, bit) in [
        (KeyModifiers::SHIFT, 4),
        (KeyModifiers::ALT, 8),
        (KeyModifiers::CONTROL, 16),
    ] {
        if mouse.modifiers.contains(modifier) {
            code |= bit;
        }
    }
    let suffix = if release { 'm' } else { 'M' };
    format!(
        "\x1b[<{code};{};{}{suffix}",
        mouse.column.saturating_add(1),
        mouse.row.saturating_add(1)
    )
    .into_bytes()
}

fn cell_style(cell: &vt100::Cell, screen: &vt100::Screen) -> Style {
    let mut style = Style::default();
    let mut fg = vt_color(cell.fgcolor()).or_else(|| vt_color(screen.fgcolor()));
    if cell.bold()
        && let Some(Color::Indexed(idx)) = fg
        && idx < 8
    {
        fg = Some(Color::Indexed(idx + 8));
    }
    if let Some(fg) = fg {
        style = style.fg(fg);
    }
    if let Some(bg) = vt_color(cell.bgcolor()).or_else(|| vt_color(screen.bgcolor())) {
        style = style.bg(bg);
    }
    let flags = [
        (cell.bold(), Modifier::BOLD),
        (cell.dim(), Modifier::DIM),
        (cell.italic(), Modifier::ITALIC),
        (cell.underline(), Modifier::UNDERLINED),
        (cell.inverse(), Modifier::REVERSED),
    ];
    for (on, modifier) in flags {
        if on {
            style = style.add_modifier(modifier);
        }
    }
    style
}

fn vt_color(color: vt100::Color) -> Option<Color> {
    match color {
        vt100::Color::Default => None,
        vt100::Color::Idx(idx) => Some(Color::Indexed(idx)),
        vt100::Color::Rgb(r, g, b) => Some(Color::Rgb(r, g, b)),
    }
}
