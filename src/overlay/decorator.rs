use ratatui::style::{Modifier, Style};

use crate::overlay::element::PanelRegions;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

/// Draws the chrome of a floating panel: border, title bar and close control.
pub trait PanelDecorator: std::fmt::Debug {
    fn render_panel(
        &self,
        frame: &mut UiFrame<'_>,
        regions: &PanelRegions,
        title: &str,
        focused: bool,
    );
}

/// Single-line box with the title bar drawn over the top border.
#[derive(Debug, Default)]
pub struct FrameDecorator;

impl PanelDecorator for FrameDecorator {
    fn render_panel(
        &self,
        frame: &mut UiFrame<'_>,
        regions: &PanelRegions,
        title: &str,
        focused: bool,
    ) {
        let bounds = frame.area();
        let Some(visible) = regions.frame.clip(bounds) else {
            return;
        };
        frame.fill(visible, Style::default().bg(theme::panel_bg()));

        let border = Style::default()
            .fg(theme::panel_border())
            .bg(theme::panel_bg());
        let left = regions.frame.x;
        let right = regions.frame.x + regions.frame.width as i32 - 1;
        let top = regions.frame.y;
        let bottom = regions.frame.y + regions.frame.height as i32 - 1;
        let buffer = frame.buffer_mut();
        let mut put = |x: i32, y: i32, symbol: &str, style: Style| {
            if x < 0 || y < 0 {
                return;
            }
            let (x, y) = (x as u16, y as u16);
            let inside = x >= visible.x
                && x < visible.x.saturating_add(visible.width)
                && y >= visible.y
                && y < visible.y.saturating_add(visible.height);
            if inside && let Some(cell) = buffer.cell_mut((x, y)) {
                cell.set_symbol(symbol).set_style(style);
            }
        };
        for y in top + 1..bottom {
            put(left, y, "│", border);
            put(right, y, "│", border);
        }
        if bottom > top {
            for x in left + 1..right {
                put(x, bottom, "─", border);
            }
            put(left, bottom, "└", border);
            put(right, bottom, "┘", border);
        }

        let header = if focused {
            Style::default()
                .fg(theme::header_fg())
                .bg(theme::header_focused_bg())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(theme::header_fg())
                .bg(theme::header_bg())
        };
        for x in left..=right {
            put(x, top, " ", header);
        }

        let bar = regions.title_bar;
        if let Some(bar_rect) = bar.clip(bounds) {
            let title_room = bar
                .width
                .saturating_sub(regions.close.width)
                .saturating_sub(3);
            let label: String = title.chars().take(title_room as usize).collect();
            let start = bar.x + 1;
            if start >= 0 {
                safe_set_string(buffer, bar_rect, start as u16, bar_rect.y, &label, header);
            }
        }
        if regions.close.width > 0
            && let Some(close_rect) = regions.close.clip(bounds)
        {
            let close_style = header.fg(theme::close_fg());
            let skip = (close_rect.x as i32 - regions.close.x) as usize;
            let glyph: String = "[x]".chars().skip(skip).collect();
            safe_set_string(
                buffer,
                close_rect,
                close_rect.x,
                close_rect.y,
                &glyph,
                close_style,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::element::PanelElement;
    use crate::overlay::geometry::{Footprint, Position};
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
            .collect()
    }

    #[test]
    fn draws_title_close_and_border() {
        let area = Rect::new(0, 0, 16, 5);
        let mut buf = Buffer::empty(area);
        let regions = PanelElement::new(Footprint::new(12, 4)).regions(Position::new(1, 0));
        FrameDecorator.render_panel(
            &mut UiFrame::from_parts(area, &mut buf),
            &regions,
            "board",
            true,
        );
        assert_eq!(row(&buf, 0), "  board  [x]    ");
        assert_eq!(row(&buf, 1), " │          │   ");
        assert_eq!(row(&buf, 3), " └──────────┘   ");
    }

    #[test]
    fn partially_offscreen_panel_is_clipped() {
        let area = Rect::new(0, 0, 6, 3);
        let mut buf = Buffer::empty(area);
        let regions = PanelElement::new(Footprint::new(10, 3)).regions(Position::new(-8, 0));
        FrameDecorator.render_panel(
            &mut UiFrame::from_parts(area, &mut buf),
            &regions,
            "title",
            false,
        );
        assert_eq!(row(&buf, 0), "]     ");
        assert_eq!(row(&buf, 2), "─┘    ");
    }
}
