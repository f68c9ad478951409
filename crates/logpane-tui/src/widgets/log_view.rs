//! LogView: draws a filterable page: header with the filter label, content
//! rows with match highlighting and the selection, then the footer.
//!
//! Highlighting runs on each drawn row after wrapping and panning, so a match
//! split across a wrap boundary is not highlighted, and a needle that matches
//! the `...` continuation marker highlights the marker.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use logpane_core::{FilterableViewport, LabelState, Record, SelectionStyle};

use crate::theme::Theme;

pub fn draw<T: Record>(frame: &mut Frame, area: Rect, view: &FilterableViewport<T>, theme: &Theme) {
    if area.height == 0 || area.width == 0 {
        return;
    }
    let surface = view.surface();

    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    let header = surface.header_lines();
    if header.len() == 1 {
        lines.push(header_line(view, theme));
    } else {
        lines.extend(header.into_iter().map(|h| Line::styled(h, theme.header)));
    }

    if let Some(placeholder) = view.placeholder() {
        lines.push(Line::styled(placeholder.to_string(), theme.placeholder));
        frame.render_widget(Paragraph::new(lines), area);
        return;
    }

    let row_style = |item: usize| {
        if !surface.is_selected(item) {
            return theme.text;
        }
        match surface.selection_style() {
            SelectionStyle::Applied => theme.selected,
            SelectionStyle::Editing => theme.selected_editing,
        }
    };
    for row in surface.visible_lines() {
        let base = row_style(row.item);
        lines.push(Line::from(highlight_spans(
            &row.text,
            surface.highlight(),
            base,
            theme.highlight,
        )));
    }

    if let Some(footer) = surface.footer() {
        let style = if surface.is_focused() {
            theme.footer
        } else {
            theme.footer_unfocused
        };
        lines.push(Line::styled(footer, style));
    }

    frame.render_widget(Paragraph::new(lines), area);

    if view.is_capturing_input() {
        let label = view.filter().label();
        let offset = view.top_header().width() + 1 + label.prefix.width() + view.filter().cursor();
        let x = area.x + (offset as u16).min(area.width.saturating_sub(1));
        frame.set_cursor_position((x, area.y));
    }
}

fn header_line<T: Record>(view: &FilterableViewport<T>, theme: &Theme) -> Line<'static> {
    let label = view.filter().label();
    let label_style = match label.state {
        LabelState::Idle => theme.filter_idle,
        LabelState::Editing => theme.filter_editing,
        LabelState::Applied => theme.filter_applied,
    };
    let mut spans = vec![
        Span::styled(view.top_header().to_string(), theme.header),
        Span::raw(" "),
        Span::styled(format!("{}{}", label.prefix, label.text), label_style),
    ];
    if !label.suffix.is_empty() {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(label.suffix, theme.filter_suffix));
    }
    Line::from(spans)
}

/// Split `text` into spans, styling every occurrence of `needle`.
pub fn highlight_spans(
    text: &str,
    needle: &str,
    base: Style,
    highlight: Style,
) -> Vec<Span<'static>> {
    if needle.is_empty() {
        return vec![Span::styled(text.to_string(), base)];
    }
    let mut spans = Vec::new();
    let mut last = 0;
    for (start, matched) in text.match_indices(needle) {
        if start > last {
            spans.push(Span::styled(text[last..start].to_string(), base));
        }
        spans.push(Span::styled(matched.to_string(), base.patch(highlight)));
        last = start + matched.len();
    }
    if last < text.len() || spans.is_empty() {
        spans.push(Span::styled(text[last..].to_string(), base));
    }
    spans
}
