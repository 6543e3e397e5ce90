use ratatui::style::Color;

// Shell palette. Kept as small helpers so call sites read as roles rather
// than concrete colors.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);

pub fn accent() -> Color {
    let (r, g, b) = ACCENT_RGB;
    Color::Rgb(r, g, b)
}

// Panels
pub fn panel_bg() -> Color {
    Color::Black
}
pub fn panel_border() -> Color {
    Color::DarkGray
}
pub fn header_fg() -> Color {
    Color::White
}
pub fn header_bg() -> Color {
    Color::DarkGray
}
pub fn header_focused_bg() -> Color {
    Color::Blue
}
pub fn close_fg() -> Color {
    Color::LightRed
}

// Title bar / toolbar
pub fn titlebar_bg() -> Color {
    Color::Blue
}
pub fn titlebar_fg() -> Color {
    Color::White
}
pub fn toolbar_bg() -> Color {
    Color::DarkGray
}
pub fn toolbar_fg() -> Color {
    Color::White
}
pub fn toolbar_active_fg() -> Color {
    accent()
}
pub fn toolbar_locked_fg() -> Color {
    Color::Gray
}

// Unlock prompt
pub fn prompt_bg() -> Color {
    Color::Black
}
pub fn prompt_fg() -> Color {
    Color::White
}
pub fn prompt_error_fg() -> Color {
    Color::LightRed
}
