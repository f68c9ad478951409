//! SingleLogPage: one log opened on its own, JSON pretty-printed, with the
//! same filtering as the logs page.
//!
//! Rows are plain strings: a `timestamp | source` line, then the body.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use logpane_core::{
    match_rendered, Effect, Event, FilterHints, FilterableViewport, FilterableViewportConfig,
    RenderableString, Viewport,
};

use crate::page::{PageLog, TimestampFormat};

const HEADER: &str = "Single Log, esc for Logs";
const JSON_INDENT: &[u8] = b"    ";

pub struct SingleLogPage {
    viewport: FilterableViewport<RenderableString>,
    log: Option<PageLog>,
}

impl SingleLogPage {
    pub fn new(width: usize, height: usize) -> Self {
        let mut viewport = FilterableViewport::new(FilterableViewportConfig {
            top_header: HEADER.to_string(),
            start_with_context: true,
            can_toggle_context: false,
            start_selection_enabled: false,
            start_wrap: true,
            width,
            height,
            all_rows: Vec::new(),
            matches_filter: match_rendered(),
            view_when_empty: String::new(),
            hints: FilterHints::default(),
        });
        viewport.set_focus(true, false);
        Self {
            viewport,
            log: None,
        }
    }

    /// Show `log`. Showing the log already on screen keeps the scroll position.
    pub fn show_log(&mut self, log: &PageLog) {
        if self.log.as_ref() == Some(log) {
            return;
        }
        debug!("single log: showing log {}", log.seq);
        let mut rows = vec![RenderableString::new(log_header(log))];
        rows.extend(format_json(&log.text).into_iter().map(RenderableString::new));
        self.viewport.set_all_rows(rows);
        self.log = Some(log.clone());
    }

    pub fn handle_event(&mut self, event: Event) -> Vec<Effect> {
        self.viewport.handle_event(event)
    }

    pub fn is_capturing_input(&self) -> bool {
        self.viewport.is_capturing_input()
    }

    /// An applied filter takes `esc` before leaving the page does.
    pub fn has_applied_filter(&self) -> bool {
        self.viewport.filter().has_text()
    }

    pub fn set_dimensions(&mut self, width: usize, height: usize) {
        self.viewport.set_dimensions(width, height);
    }

    pub fn view(&self) -> &FilterableViewport<RenderableString> {
        &self.viewport
    }

    pub fn surface(&self) -> &Viewport<RenderableString> {
        self.viewport.surface()
    }

    pub fn log(&self) -> Option<&PageLog> {
        self.log.as_ref()
    }
}

fn log_header(log: &PageLog) -> String {
    format!(
        "{} | {}",
        TimestampFormat::Full.render(&log.timestamp),
        log.source.full
    )
}

/// Lines of `input` pretty-printed when it is a JSON object, otherwise
/// `input` as is. Escaped newlines and tabs inside strings are expanded.
pub fn format_json(input: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(input) else {
        return vec![input.to_string()];
    };

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(JSON_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut ser).is_err() {
        return vec![input.to_string()];
    }
    let Ok(pretty) = String::from_utf8(buf) else {
        return vec![input.to_string()];
    };

    pretty
        .lines()
        .flat_map(|line| {
            if line.contains("\\n") || line.contains("\\t") {
                line.replace("\\t", "    ")
                    .split("\\n")
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            } else {
                vec![line.to_string()]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{Local, TimeZone};
    use tui_input::InputRequest;

    use crate::tail::SourceName;

    fn log(seq: u64, text: &str) -> PageLog {
        PageLog {
            seq,
            timestamp: Local.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            text: text.to_string(),
            source: Arc::new(SourceName {
                short: "api.log".to_string(),
                full: "/var/log/api.log".to_string(),
            }),
            ended: false,
            current_timestamp: String::new(),
            current_source: String::new(),
        }
    }

    fn rows(page: &SingleLogPage) -> Vec<String> {
        page.view()
            .all_rows()
            .iter()
            .map(|r| r.content.clone())
            .collect()
    }

    #[test]
    fn test_plain_text_is_one_line() {
        assert_eq!(format_json("not json"), vec!["not json"]);
        assert_eq!(format_json("[1, 2]"), vec!["[1, 2]"]);
        assert_eq!(format_json(""), vec![""]);
    }

    #[test]
    fn test_json_object_pretty_printed() {
        let lines = format_json(r#"{"level":"info","msg":"ok","n":3}"#);
        assert_eq!(
            lines,
            vec![
                "{",
                r#"    "level": "info","#,
                r#"    "msg": "ok","#,
                r#"    "n": 3"#,
                "}",
            ]
        );
    }

    #[test]
    fn test_escaped_newlines_and_tabs_expand() {
        let lines = format_json(r#"{"trace":"at a\n\tat b"}"#);
        assert_eq!(
            lines,
            vec!["{", r#"    "trace": "at a"#, r#"    at b""#, "}"]
        );
    }

    #[test]
    fn test_show_log_rows() {
        let mut page = SingleLogPage::new(60, 10);
        page.show_log(&log(4, r#"{"msg":"hi"}"#));
        let rows = rows(&page);
        assert!(rows[0].starts_with("2024-01-01T10:00:00.000"));
        assert!(rows[0].ends_with(" | /var/log/api.log"));
        assert_eq!(&rows[1..], &["{", r#"    "msg": "hi""#, "}"]);
        assert_eq!(page.log().map(|l| l.seq), Some(4));
        assert!(page.view().header().starts_with(HEADER));
    }

    #[test]
    fn test_filter_within_log_keeps_context() {
        let mut page = SingleLogPage::new(60, 10);
        page.show_log(&log(1, r#"{"a":"x","b":"y"}"#));
        page.handle_event(Event::StartFilter);
        page.handle_event(Event::FilterInput(InputRequest::InsertChar('y')));
        page.handle_event(Event::Accept);
        assert!(page.has_applied_filter());
        assert_eq!(page.view().visible_rows().len(), 5);
        assert_eq!(page.view().filter().matching_indexes(), &[3]);

        // context is pinned on for this page
        page.viewport.toggle_show_context();
        assert!(page.view().filter().context_enabled());

        page.handle_event(Event::Clear);
        assert!(!page.has_applied_filter());
    }

    #[test]
    fn test_same_log_keeps_scroll() {
        let mut page = SingleLogPage::new(80, 6);
        let body: Vec<String> = (0..10).map(|i| format!("\"k{i}\":{i}")).collect();
        let text = format!("{{{}}}", body.join(","));
        page.show_log(&log(1, &text));
        page.handle_event(Event::Navigate(logpane_core::Navigation::Down));
        assert_eq!(page.surface().visible_lines()[0].item, 1);

        page.show_log(&log(1, &text));
        assert_eq!(page.surface().visible_lines()[0].item, 1);
    }
}
