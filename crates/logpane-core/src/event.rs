//! Events accepted by a filterable viewport and the effects it reports back.

use tui_input::InputRequest;

/// Scroll and selection movement, passed through to the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Up,
    Down,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    Top,
    Bottom,
    Left,
    Right,
}

/// Pre-decoded input. Key chords are mapped to these by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Blur and empty the filter, whatever its state.
    Clear,
    /// Finish editing the filter.
    Accept,
    StartFilter,
    StartRegexFilter,
    NextMatch,
    PrevMatch,
    ToggleWrap,
    Navigate(Navigation),
    /// Edit operation on the filter text.
    FilterInput(InputRequest),
}

/// Follow-ups for the caller after an event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FilterFocused,
    FilterApplied,
    FilterCleared,
    FilterChanged(String),
    /// Selection or scroll moved to this record index.
    MatchFocused(usize),
    WrapToggled(bool),
}
