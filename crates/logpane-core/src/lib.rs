//! logpane-core: filtering and ordering engine for a live record viewer.
//!
//! Nothing in this crate touches the terminal. `FilterableViewport` drives a
//! `DisplaySurface`; `Viewport` is the headless surface the TUI renders.

pub mod event;
pub mod filter;
pub mod filterable_viewport;
pub mod ordered_store;
pub mod record;
pub mod surface;
pub mod viewport;

pub use event::{Effect, Event, Navigation};
pub use filter::{Filter, FilterHints, FilterLabel, FilterMode, LabelState, MatchStep};
pub use filterable_viewport::{
    match_rendered, FilterableViewport, FilterableViewportConfig, MatchPredicate,
};
pub use ordered_store::OrderedStore;
pub use record::{Record, RenderableString};
pub use surface::{DisplaySurface, SelectionStyle};
pub use viewport::{wrap_text, Viewport, VisibleLine};
