//! LogsPage: the ordered, filterable log view.
//!
//! Logs live in an `OrderedStore` keyed by `(timestamp, seq)`; every mutation
//! hands the full ordered snapshot to the filterable viewport. Stickiness
//! follows the order so the newest log stays selected as lines arrive.

use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

use logpane_core::{
    match_rendered, Effect, Event, FilterHints, FilterMode, FilterableViewport,
    FilterableViewportConfig, OrderedStore, Record, Viewport,
};

use crate::tail::{LogLine, SourceName};

const EMPTY_PLACEHOLDER: &str = "No logs yet";
const ENDED_SUFFIX: &str = " [ended]";

// ── Display formats ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampFormat {
    #[default]
    None,
    Short,
    Full,
}

impl TimestampFormat {
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Short,
            Self::Short => Self::Full,
            Self::Full => Self::None,
        }
    }

    pub fn render(self, ts: &DateTime<Local>) -> String {
        match self {
            Self::None => String::new(),
            Self::Short => ts.format("%H:%M:%S").to_string(),
            Self::Full => ts.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    #[default]
    Short,
    None,
    Full,
}

impl SourceFormat {
    pub fn next(self) -> Self {
        match self {
            Self::Short => Self::None,
            Self::None => Self::Full,
            Self::Full => Self::Short,
        }
    }

    pub fn render(self, name: &SourceName, ended: bool) -> String {
        let mut label = match self {
            Self::Short => name.short.clone(),
            Self::None => String::new(),
            Self::Full => name.full.clone(),
        };
        if ended && !label.is_empty() {
            label.push_str(ENDED_SUFFIX);
        }
        label
    }
}

// ── PageLog ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PageLog {
    pub seq: u64,
    pub timestamp: DateTime<Local>,
    pub text: String,
    pub source: Arc<SourceName>,
    pub ended: bool,
    pub current_timestamp: String,
    pub current_source: String,
}

impl PageLog {
    fn restyle(&mut self, timestamps: TimestampFormat, sources: SourceFormat) {
        self.current_timestamp = timestamps.render(&self.timestamp);
        self.current_source = sources.render(&self.source, self.ended);
    }
}

impl Record for PageLog {
    fn render(&self) -> String {
        let mut prefix = self.current_timestamp.clone();
        if !self.current_source.is_empty() {
            if !prefix.is_empty() {
                prefix.push(' ');
            }
            prefix.push_str(&self.current_source);
        }
        if prefix.is_empty() {
            return self.text.clone();
        }
        if !self.text.is_empty() {
            prefix.push(' ');
        }
        prefix.push_str(&self.text);
        prefix
    }
}

/// Same line: text, instant and arrival order. Used to keep the selection on
/// a log as the content around it changes; rendering state is ignored.
impl PartialEq for PageLog {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq && self.timestamp == other.timestamp && self.text == other.text
    }
}

// ── LogsPage ─────────────────────────────────────────────────────────────────

pub struct PageOptions {
    pub descending: bool,
    pub context: bool,
    pub wrap: bool,
    pub timestamps: TimestampFormat,
    pub sources: SourceFormat,
    pub width: usize,
    pub height: usize,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            descending: false,
            context: true,
            wrap: false,
            timestamps: TimestampFormat::None,
            sources: SourceFormat::Short,
            width: 80,
            height: 24,
        }
    }
}

type LogKey = (DateTime<Local>, u64);

pub struct LogsPage {
    store: OrderedStore<LogKey, PageLog>,
    viewport: FilterableViewport<PageLog>,
    timestamps: TimestampFormat,
    sources: SourceFormat,
    next_seq: u64,
    paused: bool,
    held: Vec<LogLine>,
}

impl LogsPage {
    pub fn new(opts: PageOptions) -> Self {
        let store = OrderedStore::new(!opts.descending, |log: &PageLog| (log.timestamp, log.seq));
        let mut viewport = FilterableViewport::new(FilterableViewportConfig {
            top_header: header_for(store.is_ascending()),
            start_with_context: opts.context,
            can_toggle_context: true,
            start_selection_enabled: true,
            start_wrap: opts.wrap,
            width: opts.width,
            height: opts.height,
            all_rows: Vec::new(),
            matches_filter: match_rendered(),
            view_when_empty: EMPTY_PLACEHOLDER.to_string(),
            hints: FilterHints::default(),
        });
        viewport.set_maintain_selection(true);
        viewport.set_focus(true, true);

        let mut page = Self {
            store,
            viewport,
            timestamps: opts.timestamps,
            sources: opts.sources,
            next_seq: 0,
            paused: false,
            held: Vec::new(),
        };
        page.set_stickiness_for_order();
        page
    }

    // ── Input ────────────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: Event) -> Vec<Effect> {
        self.viewport.handle_event(event)
    }

    pub fn is_capturing_input(&self) -> bool {
        self.viewport.is_capturing_input()
    }

    /// Seed the filter, e.g. from the command line.
    pub fn apply_filter(&mut self, text: &str, regex: bool) {
        let mode = if regex {
            FilterMode::Regex
        } else {
            FilterMode::Plain
        };
        self.viewport.apply_filter(text, mode);
    }

    // ── Logs ─────────────────────────────────────────────────────────────────

    /// Merge a batch of new lines. While paused the batch is held back.
    pub fn append(&mut self, lines: Vec<LogLine>) {
        if lines.is_empty() {
            return;
        }
        if self.paused {
            self.held.extend(lines);
            return;
        }
        debug!("appending {} logs", lines.len());
        for line in lines {
            let mut log = PageLog {
                seq: self.next_seq,
                timestamp: line.timestamp,
                text: line.text,
                source: line.source,
                ended: false,
                current_timestamp: String::new(),
                current_source: String::new(),
            };
            self.next_seq += 1;
            log.restyle(self.timestamps, self.sources);
            self.store.insert(log);
        }
        self.refresh_rows();
    }

    pub fn clear(&mut self) {
        self.store.remove_all();
        self.held.clear();
        self.refresh_rows();
    }

    /// Flag every log from `source` as coming from a source that has ended.
    pub fn mark_source_ended(&mut self, source: &SourceName) {
        let (timestamps, sources) = (self.timestamps, self.sources);
        self.rewrite_logs(|log| {
            if *log.source == *source {
                log.ended = true;
                log.restyle(timestamps, sources);
            }
        });
    }

    pub fn cycle_timestamps(&mut self) {
        self.timestamps = self.timestamps.next();
        self.restyle_all();
    }

    pub fn cycle_sources(&mut self) {
        self.sources = self.sources.next();
        self.restyle_all();
    }

    fn restyle_all(&mut self) {
        let (timestamps, sources) = (self.timestamps, self.sources);
        self.rewrite_logs(|log| log.restyle(timestamps, sources));
    }

    fn rewrite_logs(&mut self, mut f: impl FnMut(&mut PageLog)) {
        let mut logs = self.store.ordered_snapshot();
        logs.iter_mut().for_each(&mut f);
        self.store.replace_all(logs);
        self.refresh_rows();
    }

    pub fn reverse_order(&mut self) {
        self.store.toggle_direction();
        self.set_stickiness_for_order();
        self.viewport
            .set_top_header(header_for(self.store.is_ascending()));
        self.refresh_rows();
    }

    pub fn toggle_context(&mut self) {
        self.viewport.toggle_show_context();
    }

    pub fn toggle_wrap(&mut self) -> Vec<Effect> {
        self.viewport.handle_event(Event::ToggleWrap)
    }

    /// Pause or resume. Resuming merges everything held while paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        if !self.paused {
            let held = std::mem::take(&mut self.held);
            self.append(held);
        }
        self.paused
    }

    pub fn scroll_up_by_one(&mut self) {
        let idx = self.viewport.selection_index();
        self.viewport.set_selection_index(idx.saturating_sub(1));
    }

    pub fn scroll_down_by_one(&mut self) {
        let idx = self.viewport.selection_index();
        self.viewport.set_selection_index(idx + 1);
    }

    fn refresh_rows(&mut self) {
        self.viewport.set_all_rows(self.store.ordered_snapshot());
    }

    fn set_stickiness_for_order(&mut self) {
        let ascending = self.store.is_ascending();
        self.viewport.set_top_sticky(!ascending);
        self.viewport.set_bottom_sticky(ascending);
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn set_dimensions(&mut self, width: usize, height: usize) {
        self.viewport.set_dimensions(width, height);
    }

    pub fn view(&self) -> &FilterableViewport<PageLog> {
        &self.viewport
    }

    pub fn surface(&self) -> &Viewport<PageLog> {
        self.viewport.surface()
    }

    pub fn selected_log(&self) -> Option<&PageLog> {
        self.viewport.selection()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn is_ascending(&self) -> bool {
        self.store.is_ascending()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    pub fn timestamp_format(&self) -> TimestampFormat {
        self.timestamps
    }

    pub fn source_format(&self) -> SourceFormat {
        self.sources
    }
}

fn header_for(ascending: bool) -> String {
    let order = if ascending { "Ascending" } else { "Descending" };
    format!("Logs, {}", order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use logpane_core::DisplaySurface;
    use tui_input::InputRequest;

    fn source(name: &str) -> Arc<SourceName> {
        Arc::new(SourceName {
            short: name.to_string(),
            full: format!("/var/log/{}", name),
        })
    }

    fn line(secs: u32, text: &str) -> LogLine {
        LogLine {
            source: source("app.log"),
            timestamp: Local.with_ymd_and_hms(2024, 1, 1, 10, 0, secs).unwrap(),
            text: text.to_string(),
        }
    }

    fn page(descending: bool) -> LogsPage {
        LogsPage::new(PageOptions {
            descending,
            sources: SourceFormat::None,
            width: 60,
            height: 10,
            ..PageOptions::default()
        })
    }

    fn texts(page: &LogsPage) -> Vec<String> {
        page.view()
            .visible_rows()
            .iter()
            .map(|l| l.text.clone())
            .collect()
    }

    #[test]
    fn test_append_orders_by_timestamp() {
        let mut p = page(false);
        p.append(vec![line(3, "c"), line(1, "a")]);
        p.append(vec![line(2, "b")]);
        assert_eq!(texts(&p), vec!["a", "b", "c"]);
        assert_eq!(p.view().header(), "Logs, Ascending '/' or 'r' to filter");
    }

    #[test]
    fn test_same_timestamp_lines_coexist() {
        let mut p = page(false);
        p.append(vec![line(1, "first"), line(1, "second")]);
        assert_eq!(texts(&p), vec!["first", "second"]);
    }

    #[test]
    fn test_reverse_order_moves_stickiness() {
        let mut p = page(false);
        p.append(vec![line(1, "a"), line(2, "b")]);
        p.handle_event(Event::Navigate(logpane_core::Navigation::Bottom));
        assert_eq!(p.selected_log().map(|l| l.text.as_str()), Some("b"));
        p.append(vec![line(3, "c")]);
        assert_eq!(p.selected_log().map(|l| l.text.as_str()), Some("c"));

        p.reverse_order();
        assert!(!p.is_ascending());
        assert_eq!(texts(&p), vec!["c", "b", "a"]);
        assert!(p.view().header().starts_with("Logs, Descending"));

        p.handle_event(Event::Navigate(logpane_core::Navigation::Top));
        p.append(vec![line(4, "d")]);
        assert_eq!(p.selected_log().map(|l| l.text.as_str()), Some("d"));
    }

    #[test]
    fn test_cycle_timestamps() {
        let mut p = page(false);
        p.append(vec![line(5, "hello")]);
        assert_eq!(p.view().visible_rows()[0].render(), "hello");

        p.cycle_timestamps();
        assert_eq!(p.timestamp_format(), TimestampFormat::Short);
        assert_eq!(p.view().visible_rows()[0].render(), "10:00:05 hello");

        p.cycle_timestamps();
        let full = p.view().visible_rows()[0].render();
        assert!(full.starts_with("2024-01-01T10:00:05.000"), "{full}");

        p.cycle_timestamps();
        assert_eq!(p.timestamp_format(), TimestampFormat::None);
    }

    #[test]
    fn test_source_labels_and_ended() {
        let mut p = page(false);
        p.cycle_sources();
        assert_eq!(p.source_format(), SourceFormat::Full);
        p.append(vec![line(1, "x")]);
        assert_eq!(p.view().visible_rows()[0].render(), "/var/log/app.log x");

        p.mark_source_ended(&source("app.log"));
        assert_eq!(
            p.view().visible_rows()[0].render(),
            "/var/log/app.log [ended] x"
        );
        p.cycle_sources();
        assert_eq!(p.view().visible_rows()[0].render(), "app.log [ended] x");
    }

    #[test]
    fn test_filter_over_logs() {
        let mut p = page(false);
        p.append(vec![line(1, "GET /a"), line(2, "POST /b"), line(3, "GET /c")]);
        p.toggle_context();
        p.handle_event(Event::StartFilter);
        for c in "GET".chars() {
            p.handle_event(Event::FilterInput(InputRequest::InsertChar(c)));
        }
        p.handle_event(Event::Accept);
        assert_eq!(texts(&p), vec!["GET /a", "GET /c"]);

        p.toggle_context();
        assert_eq!(texts(&p).len(), 3);
        assert_eq!(p.view().filter().matching_indexes(), &[0, 2]);
    }

    #[test]
    fn test_pause_holds_lines() {
        let mut p = page(false);
        p.append(vec![line(1, "a")]);
        assert!(p.toggle_pause());
        p.append(vec![line(2, "b"), line(3, "c")]);
        assert_eq!(p.len(), 1);
        assert_eq!(p.held_count(), 2);

        assert!(!p.toggle_pause());
        assert_eq!(p.len(), 3);
        assert_eq!(p.held_count(), 0);
    }

    #[test]
    fn test_clear_and_nudge() {
        let mut p = page(false);
        p.append(vec![line(1, "a"), line(2, "b"), line(3, "c")]);
        // bottom sticky while ascending
        assert_eq!(p.view().selection_index(), 2);
        p.handle_event(Event::Navigate(logpane_core::Navigation::Top));
        p.scroll_down_by_one();
        assert_eq!(p.view().selection_index(), 1);
        p.scroll_up_by_one();
        p.scroll_up_by_one();
        assert_eq!(p.view().selection_index(), 0);

        p.clear();
        assert!(p.is_empty());
        assert_eq!(p.view().placeholder(), Some(EMPTY_PLACEHOLDER));
        assert!(p.surface().items().is_empty());
    }

    #[test]
    fn test_equality_ignores_rendering() {
        let mut a = PageLog {
            seq: 0,
            timestamp: Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            text: "x".to_string(),
            source: source("a"),
            ended: false,
            current_timestamp: String::new(),
            current_source: String::new(),
        };
        let b = a.clone();
        a.restyle(TimestampFormat::Full, SourceFormat::Full);
        a.ended = true;
        assert_eq!(a, b);

        a.seq = 9;
        assert_ne!(a, b);
    }

    #[test]
    fn test_selection_stays_on_duplicate_line() {
        let mut p = page(false);
        p.append(vec![line(1, "dup"), line(1, "dup"), line(5, "z")]);
        assert_eq!(p.view().selection_index(), 2);
        p.handle_event(Event::Navigate(logpane_core::Navigation::Up));
        assert_eq!(p.selected_log().map(|l| l.seq), Some(1));

        p.append(vec![line(0, "early")]);
        assert_eq!(texts(&p), vec!["early", "dup", "dup", "z"]);
        assert_eq!(p.view().selection_index(), 2);
        assert_eq!(p.selected_log().map(|l| l.seq), Some(1));
    }
}
