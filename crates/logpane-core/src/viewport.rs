//! Viewport: headless scrollable window over a list of records.
//!
//! Terminology:
//! - item: one record in the content
//! - line: one terminal row; with wrap enabled an item may span several
//! - visible: vertically within the window
//!
//! Vertical position is `top_item` plus `top_offset`, the number of wrapped
//! lines of the top item scrolled out of view. Rendering is left to the
//! caller: `header_lines`, `visible_lines` and `footer` give the text of every
//! row to draw.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::event::Navigation;
use crate::record::Record;
use crate::surface::{DisplaySurface, SelectionStyle};

const CONTINUATION: &str = "...";

/// One terminal row of content and the item it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleLine {
    pub item: usize,
    pub text: String,
}

struct VisibleContent {
    lines: Vec<VisibleLine>,
    show_footer: bool,
}

pub struct Viewport<T> {
    items: Vec<T>,
    header: Vec<String>,
    width: usize,
    height: usize,
    selection_enabled: bool,
    wrap: bool,
    highlight: String,
    top_sticky: bool,
    bottom_sticky: bool,
    maintain_selection: bool,
    selected: usize,
    top_item: usize,
    top_offset: usize,
    x_offset: usize,
    selection_style: SelectionStyle,
    focused: bool,
}

impl<T: Record> Viewport<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            items: Vec::new(),
            header: Vec::new(),
            width,
            height,
            selection_enabled: false,
            wrap: false,
            highlight: String::new(),
            top_sticky: false,
            bottom_sticky: false,
            maintain_selection: false,
            selected: 0,
            top_item: 0,
            top_offset: 0,
            x_offset: 0,
            selection_style: SelectionStyle::Applied,
            focused: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn highlight(&self) -> &str {
        &self.highlight
    }

    pub fn selection_style(&self) -> SelectionStyle {
        self.selection_style
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn x_offset(&self) -> usize {
        self.x_offset
    }

    /// Whether `item` should be drawn as the selection.
    pub fn is_selected(&self, item: usize) -> bool {
        self.selection_enabled && item == self.selected
    }

    // ── Rows to draw ─────────────────────────────────────────────────────────

    /// Header rows that fit. The header takes precedence over content.
    pub fn header_lines(&self) -> Vec<String> {
        if self.height == 0 {
            return Vec::new();
        }
        let lines: Vec<String> = if self.wrap {
            self.header
                .iter()
                .flat_map(|h| wrap_text(h, self.width))
                .collect()
        } else {
            self.header.clone()
        };
        lines.into_iter().take(self.height).collect()
    }

    /// Content rows, already wrapped or panned and truncated to the width.
    pub fn visible_lines(&self) -> Vec<VisibleLine> {
        let content = self.visible_content();
        if self.wrap {
            return content.lines;
        }
        content
            .lines
            .into_iter()
            .map(|line| VisibleLine {
                item: line.item,
                text: pan(&line.text, self.x_offset, self.width),
            })
            .collect()
    }

    /// Scroll position summary, e.g. `"40% (4/10)"`, when content overflows.
    pub fn footer(&self) -> Option<String> {
        let content = self.visible_content();
        if !content.show_footer {
            return None;
        }
        let last = content.lines.last()?;
        let denominator = self.items.len();
        let mut numerator = self.selected + 1;
        if !self.selection_enabled {
            numerator = last.item + 1;
            if self.wrap && numerator == denominator && !self.is_scrolled_to_bottom() {
                return Some(format!("99% ({}/{})", numerator, denominator));
            }
        }
        Some(format!(
            "{}% ({}/{})",
            numerator * 100 / denominator.max(1),
            numerator,
            denominator
        ))
    }

    fn visible_content(&self) -> VisibleContent {
        let empty = VisibleContent {
            lines: Vec::new(),
            show_footer: false,
        };
        if self.width == 0 || self.items.is_empty() {
            return empty;
        }
        let after_header = self.height.saturating_sub(self.header_lines().len());
        if after_header == 0 {
            return empty;
        }

        let mut lines = Vec::with_capacity(after_header);
        let mut idx = self.top_item.min(self.items.len() - 1);
        let mut skip = self.top_offset;
        while idx < self.items.len() && lines.len() < after_header {
            for text in self.item_lines(idx).into_iter().skip(skip) {
                lines.push(VisibleLine { item: idx, text });
                if lines.len() == after_header {
                    break;
                }
            }
            skip = 0;
            idx += 1;
        }

        let at_top = self.top_item == 0 && self.top_offset == 0;
        // at the top, a screen that is full or one short of full still gets
        // a footer; once scrolled the footer always shows
        let show_footer = !at_top || lines.len() + 1 >= after_header;
        if show_footer {
            lines.truncate(after_header - 1);
        }
        VisibleContent { lines, show_footer }
    }

    fn item_lines(&self, idx: usize) -> Vec<String> {
        if self.width == 0 {
            return Vec::new();
        }
        let rendered = self.items[idx].render();
        if self.wrap {
            wrap_text(&rendered, self.width)
        } else {
            vec![rendered]
        }
    }

    fn num_lines_for_item(&self, idx: usize) -> usize {
        if self.width == 0 || idx >= self.items.len() {
            return 0;
        }
        if !self.wrap {
            return 1;
        }
        wrap_text(&self.items[idx].render(), self.width).len()
    }

    /// Rows available for content between header and footer.
    fn num_content_lines(&self) -> usize {
        let after_header = self.height.saturating_sub(self.header_lines().len());
        if self.visible_content().show_footer {
            after_header.saturating_sub(1)
        } else {
            after_header
        }
    }

    fn num_visible_items(&self) -> usize {
        if !self.wrap {
            return self.num_content_lines();
        }
        let mut items: Vec<usize> = self.visible_content().lines.iter().map(|l| l.item).collect();
        items.dedup();
        items.len()
    }

    // ── Vertical scroll ──────────────────────────────────────────────────────

    fn max_top(&self) -> (usize, usize) {
        let n = self.items.len();
        if n == 0 {
            return (0, 0);
        }
        let content = self.num_content_lines();
        if !self.wrap {
            return (n.saturating_sub(content), 0);
        }

        let mut top = n - 1;
        let mut offset = 0;
        let last_lines = self.num_lines_for_item(n - 1);
        if content <= last_lines {
            offset = last_lines - content;
        } else {
            let mut remaining = content - last_lines;
            while remaining > 0 {
                if top == 0 {
                    offset = 0;
                    break;
                }
                top -= 1;
                let lines = self.num_lines_for_item(top);
                if remaining <= lines {
                    offset = lines - remaining;
                    remaining = 0;
                } else {
                    remaining -= lines;
                }
            }
        }
        (top, offset)
    }

    fn is_scrolled_to_bottom(&self) -> bool {
        let (max_item, max_offset) = self.max_top();
        self.top_item > max_item || (self.top_item == max_item && self.top_offset >= max_offset)
    }

    fn safely_set_top(&mut self, item: usize, offset: usize) {
        let (max_item, max_offset) = self.max_top();
        self.top_item = item.min(max_item);
        self.top_offset = offset;
        if self.top_item == max_item {
            self.top_offset = offset.min(max_offset);
        }
    }

    /// Scroll by `n` lines, negative for up.
    fn scroll_by(&mut self, n: isize) {
        if n == 0 || self.width == 0 || self.items.is_empty() {
            return;
        }
        if n > 0 && self.is_scrolled_to_bottom() {
            return;
        }
        if n < 0 && self.top_item == 0 && self.top_offset == 0 {
            return;
        }

        let (mut item, mut offset) = (self.top_item, self.top_offset);
        if !self.wrap {
            item = item.saturating_add_signed(n);
        } else if n < 0 {
            let mut up = n.unsigned_abs();
            if offset >= up {
                offset -= up;
            } else {
                up -= offset;
                while up > 0 {
                    if item == 0 {
                        offset = 0;
                        break;
                    }
                    item -= 1;
                    let lines = self.num_lines_for_item(item);
                    if up <= lines {
                        offset = lines - up;
                        up = 0;
                    } else {
                        up -= lines;
                    }
                }
            }
        } else {
            let mut down = n.unsigned_abs();
            let lines = self.num_lines_for_item(item);
            if offset + down < lines {
                offset += down;
            } else {
                down -= lines.saturating_sub(offset + 1);
                while down > 0 {
                    item += 1;
                    if item >= self.items.len() {
                        item = self.items.len() - 1;
                        break;
                    }
                    let lines = self.num_lines_for_item(item);
                    if down <= lines {
                        offset = down - 1;
                        down = 0;
                    } else {
                        down -= lines;
                    }
                }
            }
        }
        self.safely_set_top(item, offset);
        self.safely_set_x_offset(self.x_offset);
    }

    fn scroll_up(&mut self, n: usize) {
        self.scroll_by(-(n as isize));
    }

    fn scroll_down(&mut self, n: usize) {
        self.scroll_by(n as isize);
    }

    /// (lines of the selection in view, lines above it in view)
    fn selection_in_view(&self) -> (usize, usize) {
        let mut count = 0;
        let mut above = None;
        for (i, line) in self.visible_content().lines.iter().enumerate() {
            if line.item == self.selected {
                above.get_or_insert(i);
                count += 1;
            }
        }
        (count, above.unwrap_or(0))
    }

    fn scroll_so_selection_in_view(&mut self) {
        self.scroll_to_index(self.selected);
    }

    // ── Horizontal scroll ────────────────────────────────────────────────────

    fn max_line_width(&self) -> usize {
        let header = self.header_lines();
        let content = self.visible_content();
        header
            .iter()
            .map(|l| l.width())
            .chain(content.lines.iter().map(|l| l.text.width()))
            .max()
            .unwrap_or(0)
    }

    fn safely_set_x_offset(&mut self, n: usize) {
        let max_x = self.max_line_width().saturating_sub(self.width);
        self.x_offset = n.min(max_x);
    }

    fn select_up(&mut self, n: usize) {
        self.set_selected_index(self.selected.saturating_sub(n));
    }

    fn select_down(&mut self, n: usize) {
        self.set_selected_index(self.selected.saturating_add(n));
    }
}

impl<T: Record> DisplaySurface<T> for Viewport<T> {
    fn set_content(&mut self, items: Vec<T>) {
        let mut initial_above = 0;
        let mut stay_at_top = false;
        let mut stay_at_bottom = false;
        let mut prev_selection = None;
        if self.selection_enabled {
            let (count, above) = self.selection_in_view();
            if count > 0 {
                initial_above = above;
            }
            let len = self.items.len();
            if self.top_sticky && len > 0 && self.selected == 0 {
                stay_at_top = true;
            } else if self.bottom_sticky && (len == 0 || self.selected == len - 1) {
                stay_at_bottom = true;
            } else if self.maintain_selection && self.selected < len {
                prev_selection = Some(self.items[self.selected].clone());
            }
        }

        self.items = items;
        self.safely_set_top(self.top_item, self.top_offset);
        self.safely_set_x_offset(self.x_offset);

        if !self.selection_enabled {
            return;
        }
        if stay_at_top {
            self.selected = 0;
        } else if stay_at_bottom {
            self.selected = self.items.len().saturating_sub(1);
            self.scroll_so_selection_in_view();
        } else if self.maintain_selection {
            self.selected = prev_selection
                .and_then(|prev| self.items.iter().position(|item| *item == prev))
                .unwrap_or(0);
        }

        if !stay_at_bottom {
            self.selected = self.selected.min(self.items.len().saturating_sub(1));
            self.scroll_so_selection_in_view();
            let (count, above) = self.selection_in_view();
            if count > 0 {
                self.scroll_by(above as isize - initial_above as isize);
            }
        }
    }

    fn items(&self) -> &[T] {
        &self.items
    }

    fn set_header(&mut self, header: Vec<String>) {
        self.header = header;
    }

    fn header(&self) -> &[String] {
        &self.header
    }

    fn set_highlight(&mut self, highlight: &str) {
        self.highlight = highlight.to_string();
    }

    fn set_wrap(&mut self, wrap: bool) {
        let mut initial_above = 0;
        if self.selection_enabled {
            let (count, above) = self.selection_in_view();
            if count > 0 {
                initial_above = above;
            }
        }
        self.wrap = wrap;
        self.top_offset = 0;
        self.x_offset = 0;
        if self.selection_enabled {
            self.scroll_so_selection_in_view();
            let (count, above) = self.selection_in_view();
            if count > 0 {
                self.scroll_by(above as isize - initial_above as isize);
                self.scroll_so_selection_in_view();
            }
        }
        self.safely_set_top(self.top_item, self.top_offset);
    }

    fn wrap(&self) -> bool {
        self.wrap
    }

    fn set_selection_enabled(&mut self, enabled: bool) {
        self.selection_enabled = enabled;
    }

    fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    fn set_selected_index(&mut self, index: usize) {
        if !self.selection_enabled || self.num_content_lines() == 0 {
            return;
        }
        if self.items.is_empty() {
            self.selected = 0;
            return;
        }
        self.selected = index.min(self.items.len() - 1);
        self.scroll_so_selection_in_view();
    }

    fn selected_index(&self) -> usize {
        if !self.selection_enabled {
            return 0;
        }
        self.selected
    }

    fn selected_item(&self) -> Option<&T> {
        if !self.selection_enabled {
            return None;
        }
        self.items.get(self.selected)
    }

    fn scroll_to_index(&mut self, index: usize) {
        if self.items.is_empty() {
            self.safely_set_top(0, 0);
            return;
        }
        let index = index.min(self.items.len() - 1);
        let (orig_item, orig_offset) = (self.top_item, self.top_offset);

        let lines_in_item = if self.wrap {
            self.num_lines_for_item(index)
        } else {
            1
        };
        let in_view = self
            .visible_content()
            .lines
            .iter()
            .filter(|l| l.item == index)
            .count();

        if lines_in_item != in_view {
            self.top_item = index;
            self.top_offset = 0;
            if orig_item < index {
                // item below: bring it up from the bottom edge
                let content = self.num_content_lines();
                self.scroll_up(content.saturating_sub(lines_in_item));
            }
        }

        if self.selection_enabled && self.selection_in_view().0 == 0 {
            self.top_item = orig_item;
            self.top_offset = orig_offset;
        }
    }

    fn set_top_sticky(&mut self, sticky: bool) {
        self.top_sticky = sticky;
    }

    fn set_bottom_sticky(&mut self, sticky: bool) {
        self.bottom_sticky = sticky;
    }

    fn set_maintain_selection(&mut self, maintain: bool) {
        self.maintain_selection = maintain;
    }

    fn set_selection_style(&mut self, style: SelectionStyle) {
        self.selection_style = style;
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn set_dimensions(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        if width == 0 || height == 0 {
            return;
        }
        if self.selection_enabled {
            self.scroll_so_selection_in_view();
        }
        self.safely_set_top(self.top_item, self.top_offset);
    }

    fn navigate(&mut self, nav: Navigation) {
        match nav {
            Navigation::Up => {
                if self.selection_enabled {
                    self.select_up(1);
                } else {
                    self.scroll_up(1);
                }
            }
            Navigation::Down => {
                if self.selection_enabled {
                    self.select_down(1);
                } else {
                    self.scroll_down(1);
                }
            }
            Navigation::Left => {
                if !self.wrap {
                    self.safely_set_x_offset(self.x_offset.saturating_sub(self.width / 4));
                }
            }
            Navigation::Right => {
                if !self.wrap {
                    self.safely_set_x_offset(self.x_offset + self.width / 4);
                }
            }
            Navigation::HalfPageUp => {
                let step = (self.num_visible_items() / 2).max(1);
                self.scroll_up(self.num_content_lines() / 2);
                if self.selection_enabled {
                    self.select_up(step);
                }
            }
            Navigation::HalfPageDown => {
                let step = (self.num_visible_items() / 2).max(1);
                self.scroll_down(self.num_content_lines() / 2);
                if self.selection_enabled {
                    self.select_down(step);
                }
            }
            Navigation::PageUp => {
                let step = self.num_visible_items();
                self.scroll_up(self.num_content_lines());
                if self.selection_enabled {
                    self.select_up(step);
                }
            }
            Navigation::PageDown => {
                let step = self.num_visible_items();
                self.scroll_down(self.num_content_lines());
                if self.selection_enabled {
                    self.select_down(step);
                }
            }
            Navigation::Top => {
                if self.selection_enabled {
                    self.set_selected_index(0);
                } else {
                    self.top_item = 0;
                    self.top_offset = 0;
                }
            }
            Navigation::Bottom => {
                if self.selection_enabled {
                    self.select_down(self.items.len());
                } else {
                    let (item, offset) = self.max_top();
                    self.safely_set_top(item, offset);
                }
            }
        }
    }
}

/// Split `s` into rows of at most `width` display columns. Trailing
/// whitespace is dropped; an empty string is one empty row.
pub fn wrap_text(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    for c in s.trim_end().chars() {
        let w = c.width().unwrap_or(0);
        if current_width + w > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        current.push(c);
        current_width += w;
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Columns `[x_offset, x_offset + width)` of `s`, with a continuation marker
/// at either edge where text was cut off.
fn pan(s: &str, x_offset: usize, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let total = s.width();
    let visible = take_columns(&skip_columns(s, x_offset), width);
    let visible_width = visible.width();

    if x_offset > 0 && total > 0 && visible.is_empty() {
        return take_columns(CONTINUATION, width);
    }

    let marker = CONTINUATION.width();
    let mut out = visible;
    if total > x_offset + visible_width && width > marker {
        out = take_columns(&out, width - marker) + CONTINUATION;
    }
    if x_offset > 0 && width > marker && !out.is_empty() {
        out = format!("{}{}", CONTINUATION, skip_columns(&out, marker));
    }
    out
}

fn take_columns(s: &str, n: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > n {
            break;
        }
        out.push(c);
        used += w;
    }
    out
}

fn skip_columns(s: &str, n: usize) -> String {
    let mut skipped = 0;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.peek() {
        if skipped >= n {
            break;
        }
        skipped += c.width().unwrap_or(0);
        chars.next();
    }
    chars.collect()
}
