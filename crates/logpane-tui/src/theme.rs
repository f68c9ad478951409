//! Color palette and the style set handed to every render call.

use ratatui::style::{Color, Modifier, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_PRIMARY: Color = Color::Rgb(210, 210, 225);
pub const C_SECONDARY: Color = Color::Rgb(115, 115, 138);
pub const C_MUTED: Color = Color::Rgb(72, 72, 88);
pub const C_ACCENT: Color = Color::Rgb(255, 95, 95);
pub const C_SELECTION_BG: Color = Color::Rgb(28, 28, 40);
pub const C_EDITING_BG: Color = Color::Rgb(40, 36, 20);
pub const C_FILTER_BG: Color = Color::Rgb(20, 20, 32);
pub const C_FILTER_FG: Color = Color::Rgb(255, 200, 80);
pub const C_MATCH_BG: Color = Color::Rgb(255, 200, 80);
pub const C_MATCH_FG: Color = Color::Rgb(18, 18, 18);
pub const C_HEADER: Color = Color::Rgb(120, 100, 200);
pub const C_MODE_NORMAL: Color = Color::Rgb(115, 115, 138);
pub const C_MODE_LOG: Color = Color::Rgb(120, 100, 200);
pub const C_MODE_FILTER: Color = Color::Rgb(255, 200, 80);
pub const C_MODE_PAUSED: Color = Color::Rgb(255, 184, 80);

// ── Style set ─────────────────────────────────────────────────────────────────

/// Styles for the log view. Built once at startup and only read afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub text: Style,
    pub header: Style,
    pub filter_idle: Style,
    pub filter_editing: Style,
    pub filter_applied: Style,
    pub filter_suffix: Style,
    pub selected: Style,
    pub selected_editing: Style,
    pub highlight: Style,
    pub footer: Style,
    pub footer_unfocused: Style,
    pub placeholder: Style,
    pub status: Style,
    pub error: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Style::default().fg(C_PRIMARY),
            header: Style::default().fg(C_HEADER).add_modifier(Modifier::BOLD),
            filter_idle: Style::default().fg(C_MUTED),
            filter_editing: Style::default().fg(C_FILTER_FG).bg(C_FILTER_BG),
            filter_applied: Style::default().fg(C_FILTER_FG),
            filter_suffix: Style::default().fg(C_SECONDARY),
            selected: Style::default()
                .bg(C_SELECTION_BG)
                .fg(C_PRIMARY)
                .add_modifier(Modifier::BOLD),
            selected_editing: Style::default().bg(C_EDITING_BG).fg(C_PRIMARY),
            highlight: Style::default().fg(C_MATCH_FG).bg(C_MATCH_BG),
            footer: Style::default().fg(C_SECONDARY),
            footer_unfocused: Style::default().fg(C_MUTED),
            placeholder: Style::default().fg(C_MUTED),
            status: Style::default().fg(C_MUTED),
            error: Style::default().fg(C_ACCENT),
        }
    }
}

/// Every style without colors, for terminals where colors are unwanted.
pub fn monochrome() -> Theme {
    let plain = Style::default();
    Theme {
        text: plain,
        header: plain.add_modifier(Modifier::BOLD),
        filter_idle: plain.add_modifier(Modifier::DIM),
        filter_editing: plain.add_modifier(Modifier::UNDERLINED),
        filter_applied: plain,
        filter_suffix: plain.add_modifier(Modifier::DIM),
        selected: plain.add_modifier(Modifier::REVERSED),
        selected_editing: plain.add_modifier(Modifier::UNDERLINED),
        highlight: plain.add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        footer: plain,
        footer_unfocused: plain.add_modifier(Modifier::DIM),
        placeholder: plain.add_modifier(Modifier::DIM),
        status: plain.add_modifier(Modifier::DIM),
        error: plain.add_modifier(Modifier::BOLD),
    }
}
