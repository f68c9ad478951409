//! Status bar: bottom line with input mode, counts, and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::keymap::{self, Screen};
use crate::page::LogsPage;
use crate::theme::{Theme, C_MODE_FILTER, C_MODE_LOG, C_MODE_NORMAL, C_MODE_PAUSED};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Log,
    Filter,
}

impl InputMode {
    pub fn for_screen(screen: Screen, capturing_input: bool) -> Self {
        match (screen, capturing_input) {
            (_, true) => Self::Filter,
            (Screen::Logs, false) => Self::Normal,
            (Screen::SingleLog, false) => Self::Log,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Log => "LOG",
            Self::Filter => "FILTER",
        }
    }

    pub fn color(self) -> ratatui::style::Color {
        match self {
            Self::Normal => C_MODE_NORMAL,
            Self::Log => C_MODE_LOG,
            Self::Filter => C_MODE_FILTER,
        }
    }
}

/// Last thing worth telling the user, e.g. a source ending.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub text: String,
    pub error: bool,
}

/// `shown/total`, plus the held-back count while paused.
pub fn counts(page: &LogsPage) -> String {
    let shown = page.view().visible_rows().len();
    let mut s = format!("{}/{}", shown, page.len());
    if page.is_paused() {
        s.push_str(&format!(" +{} held", page.held_count()));
    }
    s
}

/// Counts always describe the log stream, whichever page is open.
pub fn draw(
    frame: &mut Frame,
    area: Rect,
    page: &LogsPage,
    screen: Screen,
    capturing_input: bool,
    notice: Option<&Notice>,
    theme: &Theme,
) {
    let mode = InputMode::for_screen(screen, capturing_input);

    let mut spans = vec![Span::styled(
        format!(" {} ", mode.label()),
        Style::default().fg(mode.color()).add_modifier(Modifier::BOLD),
    )];
    if page.is_paused() {
        spans.push(Span::styled(
            "PAUSED ",
            Style::default().fg(C_MODE_PAUSED).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled(counts(page), theme.status));
    if let Some(notice) = notice {
        let style = if notice.error { theme.error } else { theme.status };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(notice.text.clone(), style));
    }
    spans.push(Span::styled(keymap::hints(screen, capturing_input), theme.status));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
