//! FilterableViewport: a `Filter` composed with a display surface over any
//! record type.
//!
//! Decides which records are visible, drives match navigation and keeps the
//! header in sync with the filter. Selection and scroll stay with the surface;
//! this type only issues requests to it.

use tracing::debug;

use crate::event::{Effect, Event};
use crate::filter::{Filter, FilterHints, FilterMode, MatchStep};
use crate::record::Record;
use crate::surface::{DisplaySurface, SelectionStyle};
use crate::viewport::Viewport;

/// Decides whether a record matches the filter. All domain knowledge about
/// the record lives here.
pub type MatchPredicate<T> = Box<dyn Fn(&T, &Filter) -> bool + Send + Sync>;

pub struct FilterableViewportConfig<T> {
    pub top_header: String,
    pub start_with_context: bool,
    pub can_toggle_context: bool,
    pub start_selection_enabled: bool,
    pub start_wrap: bool,
    pub width: usize,
    pub height: usize,
    pub all_rows: Vec<T>,
    pub matches_filter: MatchPredicate<T>,
    pub view_when_empty: String,
    pub hints: FilterHints,
}

/// Predicate that runs the filter against each record's rendered text.
pub fn match_rendered<T: Record>() -> MatchPredicate<T> {
    Box::new(|record: &T, filter: &Filter| filter.matches(&record.render()))
}

pub struct FilterableViewport<T, S = Viewport<T>> {
    filter: Filter,
    surface: S,
    all_rows: Vec<T>,
    matches_filter: MatchPredicate<T>,
    top_header: String,
    view_when_empty: String,
}

impl<T: Record> FilterableViewport<T, Viewport<T>> {
    pub fn new(config: FilterableViewportConfig<T>) -> Self {
        let surface = Viewport::new(config.width, config.height);
        Self::with_surface(config, surface)
    }
}

impl<T: Record, S: DisplaySurface<T>> FilterableViewport<T, S> {
    pub fn with_surface(config: FilterableViewportConfig<T>, mut surface: S) -> Self {
        let mut filter = Filter::new(config.hints);
        filter.set_context_enabled(config.start_with_context);
        filter.set_context_toggle_allowed(config.can_toggle_context);

        surface.set_dimensions(config.width, config.height);
        surface.set_selection_enabled(config.start_selection_enabled);
        surface.set_wrap(config.start_wrap);
        surface.set_selection_style(SelectionStyle::Applied);

        let mut fv = Self {
            filter,
            surface,
            all_rows: config.all_rows,
            matches_filter: config.matches_filter,
            top_header: config.top_header,
            view_when_empty: config.view_when_empty,
        };
        fv.update_visible_rows();
        fv.update_header();
        fv
    }

    /// Single entry point for input. Returns follow-ups for the caller.
    pub fn handle_event(&mut self, event: Event) -> Vec<Effect> {
        let effects = self.dispatch(event);
        // any change to the filter should show in the header
        self.update_header();
        effects
    }

    fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        // clearing is available whatever the filter focus
        if event == Event::Clear {
            self.clear_filter();
            return vec![Effect::FilterCleared];
        }

        let mut effects = Vec::new();
        if self.filter.is_focused() {
            if event == Event::Accept {
                self.surface.set_selection_style(SelectionStyle::Applied);
                self.filter.blur();
                return vec![Effect::FilterApplied];
            }
        } else {
            match event {
                Event::Navigate(nav) => {
                    self.surface.navigate(nav);
                    return effects;
                }
                Event::NextMatch | Event::PrevMatch => {
                    if !self.filter.context_enabled() || !self.filter.has_text() {
                        return effects;
                    }
                    let step = if event == Event::NextMatch {
                        MatchStep::Next
                    } else {
                        MatchStep::Prev
                    };
                    self.filter.advance_match(step);
                    if self.filter.has_contextual_matches() {
                        let idx = self.filter.current_match_index();
                        self.scroll_to_item(idx);
                        effects.push(Effect::MatchFocused(idx));
                    }
                    return effects;
                }
                Event::StartFilter | Event::StartRegexFilter => {
                    let was_regex = self.filter.is_regex();
                    let regex = event == Event::StartRegexFilter;
                    self.filter.set_mode(if regex {
                        FilterMode::Regex
                    } else {
                        FilterMode::Plain
                    });
                    self.filter.focus();
                    // same text can match differently under the other mode
                    if was_regex != regex {
                        self.update_visible_rows();
                    }
                    self.surface.set_selection_style(SelectionStyle::Editing);
                    return vec![Effect::FilterFocused];
                }
                Event::ToggleWrap => {
                    let wrap = !self.surface.wrap();
                    self.surface.set_wrap(wrap);
                    return vec![Effect::WrapToggled(wrap)];
                }
                _ => {}
            }
        }

        let prev_value = self.filter.value().to_string();
        if let Event::FilterInput(request) = event {
            self.filter.edit(request);
        }

        if self.filter.value() != prev_value {
            let value = self.filter.value().to_string();
            self.surface.set_highlight(&value);
            self.update_visible_rows();

            // with context, restart at the first match
            if self.filter.context_enabled() {
                self.filter.reset_match_cursor();
                let idx = self.filter.current_match_index();
                self.scroll_to_item(idx);
                if self.filter.has_contextual_matches() {
                    effects.push(Effect::MatchFocused(idx));
                }
            }
            effects.push(Effect::FilterChanged(value));
        }
        effects
    }

    // ── Rows ─────────────────────────────────────────────────────────────────

    /// Replace every row. Appending is done by merging first and calling this
    /// with the full result. With context, match navigation restarts at the
    /// first match.
    pub fn set_all_rows(&mut self, rows: Vec<T>) {
        self.all_rows = rows;
        self.update_visible_rows();
        if self.filter.context_enabled() && self.filter.has_text() {
            self.filter.reset_match_cursor();
            if self.filter.has_contextual_matches() {
                let idx = self.filter.current_match_index();
                self.scroll_to_item(idx);
            }
        }
        self.update_header();
    }

    pub fn all_rows(&self) -> &[T] {
        &self.all_rows
    }

    /// Rows currently handed to the surface.
    pub fn visible_rows(&self) -> &[T] {
        self.surface.items()
    }

    fn update_visible_rows(&mut self) {
        debug!("updating visible rows over {} records", self.all_rows.len());

        if self.filter.context_enabled() && self.filter.has_text() {
            let matching: Vec<usize> = self
                .all_rows
                .iter()
                .enumerate()
                .filter(|(_, row)| (self.matches_filter)(row, &self.filter))
                .map(|(i, _)| i)
                .collect();
            self.filter.set_matching_indexes(matching);
            self.surface.set_content(self.all_rows.clone());
        } else if self.filter.has_text() {
            let filtered: Vec<T> = self
                .all_rows
                .iter()
                .filter(|row| (self.matches_filter)(row, &self.filter))
                .cloned()
                .collect();
            self.surface.set_content(filtered);
        } else {
            self.surface.set_content(self.all_rows.clone());
        }
    }

    // ── Context ──────────────────────────────────────────────────────────────

    /// Flip between context and matches-only filtering, if allowed.
    pub fn toggle_show_context(&mut self) {
        if !self.filter.context_toggle_allowed() {
            return;
        }
        let enabled = !self.filter.context_enabled();
        self.filter.set_context_enabled(enabled);
        self.update_visible_rows();
        self.update_header();
    }

    // ── Header ───────────────────────────────────────────────────────────────

    pub fn set_top_header(&mut self, top_header: impl Into<String>) {
        self.top_header = top_header.into();
        self.update_header();
    }

    pub fn top_header(&self) -> &str {
        &self.top_header
    }

    /// `"<top header> <filter label>"`
    pub fn header(&self) -> String {
        format!("{} {}", self.top_header, self.filter.label())
    }

    fn update_header(&mut self) {
        let header = self.header();
        self.surface.set_header(vec![header]);
    }

    // ── Selection and surface passthroughs ───────────────────────────────────

    fn scroll_to_item(&mut self, idx: usize) {
        if self.surface.selection_enabled() {
            self.surface.set_selected_index(idx);
        } else {
            self.surface.scroll_to_index(idx);
        }
    }

    pub fn selection(&self) -> Option<&T> {
        self.surface.selected_item()
    }

    pub fn selection_index(&self) -> usize {
        self.surface.selected_index()
    }

    pub fn set_selection_index(&mut self, idx: usize) {
        self.surface.set_selected_index(idx);
    }

    pub fn set_top_sticky(&mut self, sticky: bool) {
        self.surface.set_top_sticky(sticky);
    }

    pub fn set_bottom_sticky(&mut self, sticky: bool) {
        self.surface.set_bottom_sticky(sticky);
    }

    pub fn set_maintain_selection(&mut self, maintain: bool) {
        self.surface.set_maintain_selection(maintain);
    }

    pub fn set_dimensions(&mut self, width: usize, height: usize) {
        self.surface.set_dimensions(width, height);
    }

    pub fn set_focus(&mut self, focused: bool, selection_enabled: bool) {
        self.surface.set_selection_enabled(selection_enabled);
        self.surface.set_focused(focused);
        self.update_header();
    }

    /// True while the filter is being edited and should receive all keys.
    pub fn is_capturing_input(&self) -> bool {
        self.filter.is_focused()
    }

    /// Text to show instead of the surface when there are no rows at all.
    pub fn placeholder(&self) -> Option<&str> {
        if self.all_rows.is_empty() {
            Some(&self.view_when_empty)
        } else {
            None
        }
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Seed the filter programmatically, e.g. from the command line.
    pub fn apply_filter(&mut self, text: &str, mode: FilterMode) {
        self.filter.set_mode(mode);
        self.filter.set_text(text);
        self.surface.set_highlight(text);
        self.update_visible_rows();
        self.filter.reset_match_cursor();
        self.update_header();
    }

    fn clear_filter(&mut self) {
        self.filter.blur_and_clear();
        self.surface.set_highlight("");
        self.surface.set_selection_style(SelectionStyle::Applied);
        self.update_visible_rows();
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}
