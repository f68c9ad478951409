//! Filter: text query, plain/regex mode, and contextual match bookkeeping.
//!
//! The filter knows nothing about the record type. It owns the query text
//! (edited through a `tui_input::Input`), the compiled pattern when in regex
//! mode, and the list of record indexes that currently match when filtering
//! with context.

use std::fmt;

use regex::Regex;
use tracing::debug;
use tui_input::{Input, InputRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Plain,
    Regex,
}

/// Which way to move through the contextual matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStep {
    Next,
    Prev,
}

/// Key names shown in the filter label. Purely cosmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterHints {
    pub filter: String,
    pub regex: String,
    pub next_match: String,
    pub prev_match: String,
}

impl Default for FilterHints {
    fn default() -> Self {
        Self {
            filter: "/".to_string(),
            regex: "r".to_string(),
            next_match: "n".to_string(),
            prev_match: "N".to_string(),
        }
    }
}

/// Visual treatment the label should get.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelState {
    /// No filter text, not editing.
    Idle,
    /// Filter input has focus.
    Editing,
    /// Filter text applied, input blurred.
    Applied,
}

/// The rendered filter label, split so renderers can style each part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterLabel {
    pub state: LabelState,
    pub prefix: String,
    pub text: String,
    pub suffix: String,
}

impl fmt::Display for FilterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix, self.text)?;
        if !self.suffix.is_empty() {
            write!(f, " {}", self.suffix)?;
        }
        Ok(())
    }
}

pub struct Filter {
    input: Input,
    mode: FilterMode,
    regex: Option<Regex>,
    context: bool,
    context_toggle_allowed: bool,
    matching_indexes: Vec<usize>,
    match_cursor: usize,
    focused: bool,
    hints: FilterHints,
}

impl Filter {
    pub fn new(hints: FilterHints) -> Self {
        Self {
            input: Input::default(),
            mode: FilterMode::Plain,
            regex: None,
            context: false,
            context_toggle_allowed: true,
            matching_indexes: Vec::new(),
            match_cursor: 0,
            focused: false,
            hints,
        }
    }

    // ── Text and mode ────────────────────────────────────────────────────────

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn has_text(&self) -> bool {
        !self.input.value().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    /// Replace the filter text. In regex mode the pattern is recompiled; a
    /// pattern that fails to compile is dropped and matching falls back to
    /// substring containment.
    pub fn set_text(&mut self, text: &str) {
        self.input = Input::new(text.to_string());
        self.recompile();
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn is_regex(&self) -> bool {
        self.mode == FilterMode::Regex
    }

    /// True when in regex mode and the current text compiled.
    pub fn has_valid_regex(&self) -> bool {
        self.regex.is_some()
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
        self.recompile();
    }

    /// Apply an edit operation to the text. Ignored unless focused.
    pub fn edit(&mut self, request: InputRequest) {
        if !self.focused {
            return;
        }
        if self.input.handle(request).is_some() {
            self.recompile();
        }
    }

    /// Cursor column within the text, for renderers that draw a caret.
    pub fn cursor(&self) -> usize {
        self.input.visual_cursor()
    }

    pub fn matches(&self, candidate: &str) -> bool {
        if self.is_empty() {
            return true;
        }
        match (&self.mode, &self.regex) {
            (FilterMode::Regex, Some(re)) => re.is_match(candidate),
            _ => candidate.contains(self.value()),
        }
    }

    fn recompile(&mut self) {
        if self.mode != FilterMode::Regex {
            self.regex = None;
            return;
        }
        self.regex = match Regex::new(self.value()) {
            Ok(re) => Some(re),
            Err(e) => {
                debug!("filter: invalid regex {:?}: {}", self.value(), e);
                None
            }
        };
    }

    // ── Focus ────────────────────────────────────────────────────────────────

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        // park the cursor at the end so the applied label reads whole
        self.input.handle(InputRequest::GoToEnd);
        self.focused = false;
    }

    pub fn blur_and_clear(&mut self) {
        self.blur();
        self.input.reset();
        self.regex = None;
        self.matching_indexes.clear();
        self.match_cursor = 0;
    }

    // ── Context ──────────────────────────────────────────────────────────────

    pub fn context_enabled(&self) -> bool {
        self.context
    }

    pub fn set_context_enabled(&mut self, enabled: bool) {
        self.context = enabled;
    }

    pub fn context_toggle_allowed(&self) -> bool {
        self.context_toggle_allowed
    }

    pub fn set_context_toggle_allowed(&mut self, allowed: bool) {
        self.context_toggle_allowed = allowed;
    }

    // ── Contextual matches ───────────────────────────────────────────────────

    pub fn matching_indexes(&self) -> &[usize] {
        &self.matching_indexes
    }

    pub fn match_count(&self) -> usize {
        self.matching_indexes.len()
    }

    pub fn match_cursor(&self) -> usize {
        self.match_cursor
    }

    pub fn has_contextual_matches(&self) -> bool {
        self.context && !self.matching_indexes.is_empty()
    }

    /// Replace the matching indexes. The cursor is kept, only pulled back in
    /// range if the new list is shorter.
    pub fn set_matching_indexes(&mut self, indexes: Vec<usize>) {
        self.matching_indexes = indexes;
        if self.matching_indexes.is_empty() {
            self.match_cursor = 0;
        } else if self.match_cursor >= self.matching_indexes.len() {
            self.match_cursor = self.matching_indexes.len() - 1;
        }
    }

    pub fn reset_match_cursor(&mut self) {
        self.match_cursor = 0;
    }

    /// Move the match cursor one step, wrapping at both ends.
    pub fn advance_match(&mut self, step: MatchStep) {
        let len = self.matching_indexes.len();
        if len == 0 {
            return;
        }
        self.match_cursor = match step {
            MatchStep::Next => {
                if self.match_cursor + 1 >= len {
                    0
                } else {
                    self.match_cursor + 1
                }
            }
            MatchStep::Prev => {
                if self.match_cursor == 0 || self.match_cursor > len {
                    len - 1
                } else {
                    self.match_cursor - 1
                }
            }
        };
    }

    /// Record index of the current contextual match, or 0 when there is none.
    pub fn current_match_index(&self) -> usize {
        if !self.context {
            return 0;
        }
        self.matching_indexes
            .get(self.match_cursor)
            .copied()
            .unwrap_or(0)
    }

    // ── Label ────────────────────────────────────────────────────────────────

    pub fn label(&self) -> FilterLabel {
        if self.is_empty() {
            let (state, text) = if self.focused {
                let text = match self.mode {
                    FilterMode::Regex => "type to regex filter".to_string(),
                    FilterMode::Plain => "type to filter".to_string(),
                };
                (LabelState::Editing, text)
            } else {
                (
                    LabelState::Idle,
                    format!(
                        "'{}' or '{}' to filter",
                        self.hints.filter, self.hints.regex
                    ),
                )
            };
            return FilterLabel {
                state,
                prefix: String::new(),
                text,
                suffix: String::new(),
            };
        }

        let prefix = match (self.mode, self.regex.is_some()) {
            (FilterMode::Regex, true) => "regex filter: ",
            (FilterMode::Regex, false) => "invalid regex: ",
            (FilterMode::Plain, _) => "filter: ",
        };

        let count = self.matching_indexes.len();
        let suffix = if !self.context {
            "(matches only)".to_string()
        } else if count == 0 {
            "(no matches)".to_string()
        } else if self.focused {
            format!("({}/{}, enter to apply)", self.match_cursor + 1, count)
        } else {
            format!(
                "({}/{}, {}/{} to cycle)",
                self.match_cursor + 1,
                count,
                self.hints.next_match,
                self.hints.prev_match
            )
        };

        FilterLabel {
            state: if self.focused {
                LabelState::Editing
            } else {
                LabelState::Applied
            },
            prefix: prefix.to_string(),
            text: self.value().to_string(),
            suffix,
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::new(FilterHints::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> Filter {
        let mut f = Filter::default();
        f.focus();
        for c in text.chars() {
            f.edit(InputRequest::InsertChar(c));
        }
        f
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let f = Filter::default();
        assert!(f.matches("anything"));
        assert!(f.matches(""));
    }

    #[test]
    fn test_plain_substring() {
        let mut f = Filter::default();
        f.set_text("one");
        assert!(f.matches("item one"));
        assert!(!f.matches("item two"));
    }

    #[test]
    fn test_regex_mode() {
        let mut f = Filter::default();
        f.set_mode(FilterMode::Regex);
        f.set_text("^item (one|two)$");
        assert!(f.has_valid_regex());
        assert!(f.matches("item two"));
        assert!(!f.matches("another item"));
    }

    #[test]
    fn test_invalid_regex_falls_back_to_substring() {
        let mut f = Filter::default();
        f.set_mode(FilterMode::Regex);
        f.set_text("[");
        assert!(!f.has_valid_regex());

        let mut plain = Filter::default();
        plain.set_text("[");
        for candidate in ["a[b", "ab", "[", ""] {
            assert_eq!(f.matches(candidate), plain.matches(candidate), "{candidate:?}");
        }
        assert!(f.label().prefix.starts_with("invalid regex"));
    }

    #[test]
    fn test_mode_switch_recompiles() {
        let mut f = Filter::default();
        f.set_text("a.c");
        assert!(!f.matches("abc"));
        f.set_mode(FilterMode::Regex);
        assert!(f.matches("abc"));
        f.set_mode(FilterMode::Plain);
        assert!(!f.matches("abc"));
        assert!(f.matches("xa.cx"));
    }

    #[test]
    fn test_edits_ignored_when_blurred() {
        let mut f = Filter::default();
        f.edit(InputRequest::InsertChar('x'));
        assert!(f.is_empty());

        let mut f = typed("abc");
        f.edit(InputRequest::DeletePrevChar);
        assert_eq!(f.value(), "ab");
    }

    #[test]
    fn test_advance_match_wraps() {
        let mut f = Filter::default();
        f.set_context_enabled(true);
        f.set_matching_indexes(vec![2, 5, 9]);

        f.advance_match(MatchStep::Prev);
        assert_eq!(f.match_cursor(), 2);
        assert_eq!(f.current_match_index(), 9);

        f.advance_match(MatchStep::Next);
        assert_eq!(f.match_cursor(), 0);
        f.advance_match(MatchStep::Next);
        f.advance_match(MatchStep::Next);
        f.advance_match(MatchStep::Next);
        assert_eq!(f.match_cursor(), 0);
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut f = Filter::default();
        f.set_context_enabled(true);
        f.set_matching_indexes(vec![0, 1, 2, 3]);
        let steps = [
            MatchStep::Next,
            MatchStep::Prev,
            MatchStep::Prev,
            MatchStep::Prev,
            MatchStep::Next,
            MatchStep::Prev,
            MatchStep::Prev,
            MatchStep::Prev,
            MatchStep::Prev,
        ];
        for step in steps {
            f.advance_match(step);
            assert!(f.match_cursor() < f.match_count());
        }

        f.set_matching_indexes(vec![7]);
        assert_eq!(f.match_cursor(), 0);
        f.set_matching_indexes(vec![]);
        f.advance_match(MatchStep::Next);
        assert_eq!(f.match_cursor(), 0);
        assert_eq!(f.current_match_index(), 0);
    }

    #[test]
    fn test_set_matching_indexes_keeps_cursor() {
        let mut f = Filter::default();
        f.set_context_enabled(true);
        f.set_matching_indexes(vec![1, 2, 3]);
        f.advance_match(MatchStep::Next);
        f.set_matching_indexes(vec![4, 5, 6, 7]);
        assert_eq!(f.match_cursor(), 1);
        assert_eq!(f.current_match_index(), 5);
    }

    #[test]
    fn test_current_match_zero_without_context() {
        let mut f = Filter::default();
        f.set_matching_indexes(vec![3]);
        assert_eq!(f.current_match_index(), 0);
    }

    #[test]
    fn test_labels() {
        let f = Filter::default();
        assert_eq!(f.label().state, LabelState::Idle);
        assert_eq!(f.label().to_string(), "'/' or 'r' to filter");

        let mut f = Filter::default();
        f.focus();
        assert_eq!(f.label().to_string(), "type to filter");
        f.set_mode(FilterMode::Regex);
        assert_eq!(f.label().to_string(), "type to regex filter");

        let mut f = typed("one");
        assert_eq!(f.label().to_string(), "filter: one (matches only)");

        f.set_context_enabled(true);
        assert_eq!(f.label().suffix, "(no matches)");

        f.set_matching_indexes(vec![0, 4]);
        assert_eq!(f.label().suffix, "(1/2, enter to apply)");

        f.blur();
        assert_eq!(f.label().state, LabelState::Applied);
        assert_eq!(f.label().suffix, "(1/2, n/N to cycle)");
    }

    #[test]
    fn test_blur_and_clear() {
        let mut f = typed("one");
        f.set_context_enabled(true);
        f.set_matching_indexes(vec![0, 1]);
        f.advance_match(MatchStep::Next);
        f.blur_and_clear();
        assert!(!f.is_focused());
        assert!(f.is_empty());
        assert!(f.matching_indexes().is_empty());
        assert_eq!(f.match_cursor(), 0);
    }
}
