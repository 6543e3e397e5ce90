//! Challenge prompt guarding the diagnostic panels.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use tracing::{info, warn};

use crate::overlay::PanelId;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string, truncate_to_width};

const PROMPT_WIDTH: u16 = 36;
const PROMPT_HEIGHT: u16 = 5;
const MAX_INPUT: usize = 64;

/// Emitted by the gate once the code is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockSignal {
    Open(PanelId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateResponse {
    /// The gate is not prompting; the key belongs to someone else.
    Ignored,
    Consumed,
    Cancelled,
    Rejected,
    Signal(UnlockSignal),
}

/// Modal prompt asking for the unlock code before a gated panel opens.
///
/// With no code configured the gate never accepts anything.
#[derive(Debug, Clone, Default)]
pub struct UnlockGate {
    code: Option<String>,
    target: Option<PanelId>,
    input: String,
    rejected: bool,
}

impl UnlockGate {
    pub fn new(code: Option<String>) -> Self {
        Self {
            code: code.filter(|code| !code.is_empty()),
            ..Self::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        self.code.is_some()
    }

    /// Start prompting for `target`, discarding any half-typed input.
    pub fn open(&mut self, target: PanelId) {
        info!(panel = %target, "unlock requested");
        self.target = Some(target);
        self.input.clear();
        self.rejected = false;
    }

    pub fn is_active(&self) -> bool {
        self.target().is_some()
    }

    pub fn target(&self) -> Option<&PanelId> {
        self.target.as_ref()
    }

    pub fn cancel(&mut self) {
        self.target = None;
        self.input.clear();
        self.rejected = false;
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> GateResponse {
        if !self.is_active() || key.kind == KeyEventKind::Release {
            return GateResponse::Ignored;
        }
        match key.code {
            KeyCode::Esc => {
                self.cancel();
                GateResponse::Cancelled
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.pop();
                GateResponse::Consumed
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                if self.input.chars().count() < MAX_INPUT {
                    self.input.push(c);
                }
                self.rejected = false;
                GateResponse::Consumed
            }
            _ => GateResponse::Consumed,
        }
    }

    fn submit(&mut self) -> GateResponse {
        let accepted = self
            .code
            .as_deref()
            .is_some_and(|code| code == self.input);
        if !accepted {
            warn!("unlock code rejected");
            self.input.clear();
            self.rejected = true;
            return GateResponse::Rejected;
        }
        let Some(target) = self.target.take() else {
            return GateResponse::Ignored;
        };
        info!(panel = %target, "unlock accepted");
        self.input.clear();
        self.rejected = false;
        GateResponse::Signal(UnlockSignal::Open(target))
    }

    /// Centered prompt box inside `area`.
    pub fn rect_for(area: Rect) -> Rect {
        let width = PROMPT_WIDTH.min(area.width);
        let height = PROMPT_HEIGHT.min(area.height);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        }
    }

    pub fn render(&self, frame: &mut UiFrame<'_>, area: Rect) {
        let Some(target) = self.target() else {
            return;
        };
        let rect = Self::rect_for(area);
        if rect.width < 4 || rect.height < 3 {
            return;
        }
        let base = Style::default().fg(theme::prompt_fg()).bg(theme::prompt_bg());
        frame.fill(rect, base);
        let inner_width = (rect.width - 2) as usize;
        let title = truncate_to_width(&format!("Unlock {target}"), inner_width);
        let masked = truncate_to_width(
            &format!("code: {}", "*".repeat(self.input.chars().count())),
            inner_width,
        );
        let buffer = frame.buffer_mut();
        let bounds = rect.intersection(buffer.area);
        safe_set_string(
            buffer,
            bounds,
            rect.x + 1,
            rect.y,
            &title,
            base.add_modifier(Modifier::BOLD),
        );
        safe_set_string(buffer, bounds, rect.x + 1, rect.y + 2, &masked, base);
        if self.rejected && rect.height >= 4 {
            let hint = if self.code.is_some() {
                "incorrect code"
            } else {
                "locked"
            };
            safe_set_string(
                buffer,
                bounds,
                rect.x + 1,
                rect.y + 3,
                &truncate_to_width(hint, inner_width),
                base.fg(theme::prompt_error_fg()),
            );
        }
    }
}
