//! Background palette and the CRT-style scanline filter.

use std::fmt;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier};
use tracing::warn;

use crate::prefs::{KEY_BACKGROUND, KEY_FILTER, PreferenceStore};

/// Every `SCANLINE_GAP`th row is dimmed.
pub const SCANLINE_GAP: u16 = 2;

/// Where the scanline filter applies: nowhere, the host area, or the whole
/// screen including panels and chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Off,
    On,
    Both,
}

impl FilterMode {
    pub const ALL: [FilterMode; 3] = [FilterMode::Off, FilterMode::On, FilterMode::Both];

    /// Parse a stored value. Empty means off; unknown values are `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "" | "off" => Some(FilterMode::Off),
            "on" => Some(FilterMode::On),
            "both" => Some(FilterMode::Both),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            FilterMode::Off => "off",
            FilterMode::On => "on",
            FilterMode::Both => "both",
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            FilterMode::Off => FilterMode::On,
            FilterMode::On => FilterMode::Both,
            FilterMode::Both => FilterMode::Off,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background painted behind the host application where it leaves the
/// terminal default color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    #[default]
    Default,
    Midnight,
    Forest,
    Amber,
    Slate,
}

impl Background {
    pub const ALL: [Background; 5] = [
        Background::Default,
        Background::Midnight,
        Background::Forest,
        Background::Amber,
        Background::Slate,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return Some(Background::Default);
        }
        Self::ALL
            .into_iter()
            .find(|bg| bg.as_str().eq_ignore_ascii_case(value))
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Background::Default => "default",
            Background::Midnight => "midnight",
            Background::Forest => "forest",
            Background::Amber => "amber",
            Background::Slate => "slate",
        }
    }

    /// `None` keeps the terminal's own background.
    pub const fn color(self) -> Option<Color> {
        match self {
            Background::Default => None,
            Background::Midnight => Some(Color::Rgb(16, 18, 40)),
            Background::Forest => Some(Color::Rgb(14, 32, 20)),
            Background::Amber => Some(Color::Rgb(40, 26, 6)),
            Background::Slate => Some(Color::Rgb(34, 38, 44)),
        }
    }

    pub fn cycle(self) -> Self {
        let index = Self::ALL.iter().position(|bg| *bg == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Appearance {
    pub filter: FilterMode,
    pub background: Background,
}

impl Appearance {
    /// Read both settings, falling back to defaults on unknown values.
    pub fn from_prefs(prefs: &PreferenceStore) -> Self {
        let filter = prefs.get(KEY_FILTER).map_or(Some(FilterMode::Off), FilterMode::parse);
        let background = prefs
            .get(KEY_BACKGROUND)
            .map_or(Some(Background::Default), Background::parse);
        if filter.is_none() {
            warn!(value = ?prefs.get(KEY_FILTER), "unknown filter preference");
        }
        if background.is_none() {
            warn!(value = ?prefs.get(KEY_BACKGROUND), "unknown background preference");
        }
        Self {
            filter: filter.unwrap_or_default(),
            background: background.unwrap_or_default(),
        }
    }

    pub fn cycle_filter(&mut self, prefs: &mut PreferenceStore) -> FilterMode {
        self.filter = self.filter.cycle();
        if let Err(err) = prefs.set(KEY_FILTER, self.filter.as_str()) {
            warn!(%err, "failed to persist filter");
        }
        self.filter
    }

    pub fn cycle_background(&mut self, prefs: &mut PreferenceStore) -> Background {
        self.background = self.background.cycle();
        if let Err(err) = prefs.set(KEY_BACKGROUND, self.background.as_str()) {
            warn!(%err, "failed to persist background");
        }
        self.background
    }

    /// Fill cells in `area` that still use the terminal default background.
    pub fn paint_background(&self, buffer: &mut Buffer, area: Rect) {
        let Some(color) = self.background.color() else {
            return;
        };
        let area = area.intersection(buffer.area);
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if let Some(cell) = buffer.cell_mut((x, y))
                    && cell.bg == Color::Reset
                {
                    cell.set_bg(color);
                }
            }
        }
    }

    /// Scanlines over the host application only; drawn before the panels.
    pub fn filter_host(&self, buffer: &mut Buffer, host: Rect) {
        if self.filter == FilterMode::On {
            apply_scanlines(buffer, host);
        }
    }

    /// Scanlines over everything; drawn last.
    pub fn filter_screen(&self, buffer: &mut Buffer, screen: Rect) {
        if self.filter == FilterMode::Both {
            apply_scanlines(buffer, screen);
        }
    }
}

pub fn apply_scanlines(buffer: &mut Buffer, area: Rect) {
    let area = area.intersection(buffer.area);
    for y in (area.top()..area.bottom()).filter(|y| (y - area.top()) % SCANLINE_GAP == 1) {
        for x in area.left()..area.right() {
            if let Some(cell) = buffer.cell_mut((x, y)) {
                cell.modifier.insert(Modifier::DIM);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_parsing_treats_empty_as_off() {
        assert_eq!(FilterMode::parse(""), Some(FilterMode::Off));
        assert_eq!(FilterMode::parse("both"), Some(FilterMode::Both));
        assert_eq!(FilterMode::parse("sepia"), None);
        assert_eq!(FilterMode::Both.cycle(), FilterMode::Off);
    }

    #[test]
    fn background_cycles_through_every_palette() {
        let mut bg = Background::Default;
        for _ in 0..Background::ALL.len() {
            bg = bg.cycle();
        }
        assert_eq!(bg, Background::Default);
        assert_eq!(Background::parse("Amber"), Some(Background::Amber));
    }

    #[test]
    fn unknown_preferences_fall_back_to_defaults() {
        let mut prefs = PreferenceStore::in_memory();
        prefs.set(KEY_FILTER, "bogus").unwrap();
        prefs.set(KEY_BACKGROUND, "forest").unwrap();
        let appearance = Appearance::from_prefs(&prefs);
        assert_eq!(appearance.filter, FilterMode::Off);
        assert_eq!(appearance.background, Background::Forest);
    }

    #[test]
    fn cycling_persists_choice() {
        let mut prefs = PreferenceStore::in_memory();
        let mut appearance = Appearance::default();
        assert_eq!(appearance.cycle_filter(&mut prefs), FilterMode::On);
        assert_eq!(prefs.get(KEY_FILTER), Some("on"));
        appearance.cycle_background(&mut prefs);
        assert_eq!(prefs.get(KEY_BACKGROUND), Some("midnight"));
    }

    #[test]
    fn on_mode_dims_alternate_host_rows_only() {
        let screen = Rect::new(0, 0, 4, 6);
        let host = Rect::new(0, 2, 4, 4);
        let mut buffer = Buffer::empty(screen);
        let appearance = Appearance {
            filter: FilterMode::On,
            background: Background::Default,
        };
        appearance.filter_host(&mut buffer, host);
        appearance.filter_screen(&mut buffer, screen);
        let dimmed: Vec<bool> = (0..6)
            .map(|y| buffer[(0, y)].modifier.contains(Modifier::DIM))
            .collect();
        assert_eq!(dimmed, vec![false, false, false, true, false, true]);
    }

    #[test]
    fn background_only_fills_default_cells() {
        let area = Rect::new(0, 0, 2, 1);
        let mut buffer = Buffer::empty(area);
        buffer[(1, 0)].set_bg(Color::Red);
        let appearance = Appearance {
            filter: FilterMode::Off,
            background: Background::Slate,
        };
        appearance.paint_background(&mut buffer, area);
        assert_eq!(buffer[(0, 0)].bg, Background::Slate.color().unwrap());
        assert_eq!(buffer[(1, 0)].bg, Color::Red);
    }
}
