//! DisplaySurface: the bounded, scrollable window a filterable viewport drives.
//!
//! The filterable viewport only issues requests through this trait; scroll
//! position and selection are owned by the surface.

use crate::event::Navigation;
use crate::record::Record;

/// How the selected row should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStyle {
    /// Normal browsing.
    #[default]
    Applied,
    /// The filter is being edited.
    Editing,
}

pub trait DisplaySurface<T: Record> {
    fn set_content(&mut self, items: Vec<T>);
    fn items(&self) -> &[T];

    fn set_header(&mut self, header: Vec<String>);
    fn header(&self) -> &[String];

    /// Text to highlight wherever it appears. Empty disables highlighting.
    fn set_highlight(&mut self, highlight: &str);

    fn set_wrap(&mut self, wrap: bool);
    fn wrap(&self) -> bool;

    fn set_selection_enabled(&mut self, enabled: bool);
    fn selection_enabled(&self) -> bool;

    /// Select the item at `index`, clamped to the content, and scroll it into view.
    fn set_selected_index(&mut self, index: usize);
    fn selected_index(&self) -> usize;
    fn selected_item(&self) -> Option<&T>;

    /// Scroll the minimum amount so the item at `index` is fully visible.
    fn scroll_to_index(&mut self, index: usize);

    /// Keep the selection on the first item as content changes, when it is already there.
    fn set_top_sticky(&mut self, sticky: bool);
    /// Keep the selection on the last item as content changes, when it is already there.
    fn set_bottom_sticky(&mut self, sticky: bool);
    /// Follow the selected item (by equality) when content changes.
    fn set_maintain_selection(&mut self, maintain: bool);

    fn set_selection_style(&mut self, style: SelectionStyle);
    fn set_focused(&mut self, focused: bool);

    fn set_dimensions(&mut self, width: usize, height: usize);

    /// Scroll or selection movement from user input.
    fn navigate(&mut self, nav: Navigation);
}
