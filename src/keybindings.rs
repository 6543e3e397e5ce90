use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// The three panels the shell declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelSlot {
    Leaderboard,
    ToolA,
    ToolB,
}

impl PanelSlot {
    pub const ALL: [PanelSlot; 3] = [PanelSlot::Leaderboard, PanelSlot::ToolA, PanelSlot::ToolB];

    pub const fn id(self) -> &'static str {
        match self {
            PanelSlot::Leaderboard => "leaderboard",
            PanelSlot::ToolA => "tool-a",
            PanelSlot::ToolB => "tool-b",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PanelSlot::Leaderboard => "Leaderboard",
            PanelSlot::ToolA => "Tool A",
            PanelSlot::ToolB => "Tool B",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.id() == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    TogglePanel(PanelSlot),
    CloseTopmost,
    CycleFilter,
    CycleBackground,
    ToggleMouseCapture,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Quit => f.write_str("Quit"),
            Action::TogglePanel(slot) => write!(f, "Toggle {}", slot.label()),
            Action::CloseTopmost => f.write_str("Close topmost panel"),
            Action::CycleFilter => f.write_str("Cycle CRT filter"),
            Action::CycleBackground => f.write_str("Cycle background"),
            Action::ToggleMouseCapture => f.write_str("Toggle mouse capture"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts: Vec<String> = [
            (KeyModifiers::CONTROL, "Ctrl"),
            (KeyModifiers::SHIFT, "Shift"),
            (KeyModifiers::ALT, "Alt"),
        ]
        .into_iter()
        .filter(|(modifier, _)| self.mods.contains(*modifier))
        .map(|(_, name)| name.to_string())
        .collect();
        parts.push(match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Esc => "Esc".to_string(),
            other => format!("{other:?}"),
        });
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// F2 leaderboard, F3/F4 gated tools, F6 close topmost, F7 filter,
    /// F8 background, F9 mouse capture, Ctrl+Q quit.
    pub fn standard() -> Self {
        let mut kb = Self::new();
        kb.add(
            Action::Quit,
            KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        kb.add(
            Action::TogglePanel(PanelSlot::Leaderboard),
            KeyCombo::plain(KeyCode::F(2)),
        );
        kb.add(
            Action::TogglePanel(PanelSlot::ToolA),
            KeyCombo::plain(KeyCode::F(3)),
        );
        kb.add(
            Action::TogglePanel(PanelSlot::ToolB),
            KeyCombo::plain(KeyCode::F(4)),
        );
        kb.add(Action::CloseTopmost, KeyCombo::plain(KeyCode::F(6)));
        kb.add(Action::CycleFilter, KeyCombo::plain(KeyCode::F(7)));
        kb.add(Action::CycleBackground, KeyCombo::plain(KeyCode::F(8)));
        kb.add(Action::ToggleMouseCapture, KeyCombo::plain(KeyCode::F(9)));
        kb
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|combo| combo.matches(key)))
    }

    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        self.map
            .iter()
            .find(|(_, list)| list.iter().any(|combo| combo.matches(key)))
            .map(|(action, _)| *action)
    }

    /// Display form of the first combo bound to `action`, for toolbar hints.
    pub fn hint(&self, action: Action) -> Option<String> {
        self.map
            .get(&action)
            .and_then(|list| list.first())
            .map(KeyCombo::display)
    }
}
