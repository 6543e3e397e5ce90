//! Title bar and toolbar rows at the top of the screen.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use crate::appearance::Appearance;
use crate::constants::{TITLEBAR_HEIGHT, TOOLBAR_HEIGHT};
use crate::keybindings::{Action, KeyBindings, PanelSlot};
use crate::overlay::PanelRegistry;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string, truncate_to_width};

const PKG_NAME: &str = env!("CARGO_PKG_NAME");
const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const CHROME_HEIGHT: u16 = TITLEBAR_HEIGHT + TOOLBAR_HEIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ToolbarHit {
    action: Action,
    rect: Rect,
}

#[derive(Debug, Default)]
pub struct Chrome {
    hostname: Option<String>,
    hits: Vec<ToolbarHit>,
}

impl Chrome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen area left for the host application.
    pub fn host_area(screen: Rect) -> Rect {
        let offset = CHROME_HEIGHT.min(screen.height);
        Rect {
            x: screen.x,
            y: screen.y + offset,
            width: screen.width,
            height: screen.height - offset,
        }
    }

    /// Toolbar action under `(x, y)`, from the last render.
    pub fn hit(&self, x: u16, y: u16) -> Option<Action> {
        self.hits
            .iter()
            .find(|hit| hit.rect.contains((x, y).into()))
            .map(|hit| hit.action)
    }

    pub fn render(
        &mut self,
        frame: &mut UiFrame<'_>,
        bindings: &KeyBindings,
        registry: &PanelRegistry,
        appearance: Appearance,
    ) {
        self.hits.clear();
        let screen = frame.area();
        if screen.width == 0 || screen.height == 0 {
            return;
        }
        self.render_title(frame, screen);
        if screen.height > TITLEBAR_HEIGHT {
            self.render_toolbar(frame, screen, bindings, registry, appearance);
        }
    }

    fn hostname(&mut self) -> &str {
        self.hostname.get_or_insert_with(|| {
            hostname::get()
                .ok()
                .and_then(|name| name.into_string().ok())
                .unwrap_or_else(|| "unknown-host".to_string())
        })
    }

    fn render_title(&mut self, frame: &mut UiFrame<'_>, screen: Rect) {
        let row = Rect {
            height: TITLEBAR_HEIGHT,
            ..screen
        };
        let style = Style::default()
            .fg(theme::titlebar_fg())
            .bg(theme::titlebar_bg());
        frame.fill(row, style);
        let host = self.hostname().to_string();
        let buffer = frame.buffer_mut();
        let bounds = row.intersection(buffer.area);
        safe_set_string(
            buffer,
            bounds,
            row.x + 1,
            row.y,
            &format!("{PKG_NAME} {PKG_VERSION}"),
            style.add_modifier(Modifier::BOLD),
        );
        let host = truncate_to_width(&host, row.width as usize);
        let width = host.chars().count() as u16;
        let x = row.right().saturating_sub(width + 1).max(row.x);
        safe_set_string(buffer, bounds, x, row.y, &host, style);
    }

    fn render_toolbar(
        &mut self,
        frame: &mut UiFrame<'_>,
        screen: Rect,
        bindings: &KeyBindings,
        registry: &PanelRegistry,
        appearance: Appearance,
    ) {
        let row = Rect {
            y: screen.y + TITLEBAR_HEIGHT,
            height: TOOLBAR_HEIGHT,
            ..screen
        };
        let base = Style::default()
            .fg(theme::toolbar_fg())
            .bg(theme::toolbar_bg());
        frame.fill(row, base);

        let mut buttons: Vec<(Action, String, Style)> = PanelSlot::ALL
            .into_iter()
            .map(|slot| {
                let gated = registry
                    .panel(slot.id())
                    .is_some_and(|panel| panel.spec().gated);
                let style = if registry.is_visible(slot.id()) {
                    base.fg(theme::toolbar_active_fg())
                        .add_modifier(Modifier::BOLD)
                } else if gated {
                    base.fg(theme::toolbar_locked_fg())
                } else {
                    base
                };
                (Action::TogglePanel(slot), slot.label().to_string(), style)
            })
            .collect();
        buttons.push((
            Action::CycleFilter,
            format!("Filter: {}", appearance.filter),
            base,
        ));
        buttons.push((
            Action::CycleBackground,
            format!("Bg: {}", appearance.background),
            base,
        ));
        buttons.push((Action::Quit, "Quit".to_string(), base));

        let buffer = frame.buffer_mut();
        let bounds = row.intersection(buffer.area);
        let mut x = row.x + 1;
        for (action, label, style) in buttons {
            let text = match bindings.hint(action) {
                Some(hint) => format!("[{hint} {label}]"),
                None => format!("[{label}]"),
            };
            let width = text.chars().count() as u16;
            if x >= row.right() {
                break;
            }
            safe_set_string(buffer, bounds, x, row.y, &text, style);
            let visible = width.min(row.right() - x);
            self.hits.push(ToolbarHit {
                action,
                rect: Rect::new(x, row.y, visible, 1),
            });
            x = x.saturating_add(width + 1);
        }
    }
}
