use crossterm::event::{Event, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// Pointer input in viewport coordinates, stripped down to what the drag
/// protocol needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub button: Option<MouseButton>,
    pub x: i32,
    pub y: i32,
}

impl PointerEvent {
    pub fn down(button: MouseButton, x: i32, y: i32) -> Self {
        Self {
            kind: PointerKind::Down,
            button: Some(button),
            x,
            y,
        }
    }

    pub fn moved(button: Option<MouseButton>, x: i32, y: i32) -> Self {
        Self {
            kind: PointerKind::Move,
            button,
            x,
            y,
        }
    }

    pub fn up(button: MouseButton, x: i32, y: i32) -> Self {
        Self {
            kind: PointerKind::Up,
            button: Some(button),
            x,
            y,
        }
    }

    /// Scroll wheel events are not pointer transitions and map to `None`.
    pub fn from_mouse(mouse: &MouseEvent) -> Option<Self> {
        let x = mouse.column as i32;
        let y = mouse.row as i32;
        match mouse.kind {
            MouseEventKind::Down(button) => Some(Self::down(button, x, y)),
            MouseEventKind::Drag(button) => Some(Self::moved(Some(button), x, y)),
            MouseEventKind::Moved => Some(Self::moved(None, x, y)),
            MouseEventKind::Up(button) => Some(Self::up(button, x, y)),
            _ => None,
        }
    }

    /// Rebuild the terminal event so it can be forwarded to panel content.
    pub fn to_event(self) -> Event {
        let kind = match (self.kind, self.button) {
            (PointerKind::Down, Some(button)) => MouseEventKind::Down(button),
            (PointerKind::Down, None) => MouseEventKind::Down(MouseButton::Left),
            (PointerKind::Move, Some(button)) => MouseEventKind::Drag(button),
            (PointerKind::Move, None) => MouseEventKind::Moved,
            (PointerKind::Up, Some(button)) => MouseEventKind::Up(button),
            (PointerKind::Up, None) => MouseEventKind::Up(MouseButton::Left),
        };
        Event::Mouse(MouseEvent {
            kind,
            column: self.x.clamp(0, u16::MAX as i32) as u16,
            row: self.y.clamp(0, u16::MAX as i32) as u16,
            modifiers: KeyModifiers::NONE,
        })
    }
}

/// Per-panel drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        pointer: MouseButton,
        offset_x: i32,
        offset_y: i32,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }
}
