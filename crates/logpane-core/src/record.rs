//! Record: the capability every row shown in a viewport provides.

/// A displayable unit flowing through the viewport.
///
/// `render` must be a pure function of the record's current state. Equality is
/// used to keep the same record selected when content is replaced.
pub trait Record: Clone + PartialEq {
    fn render(&self) -> String;
}

/// A plain line of text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderableString {
    pub content: String,
}

impl RenderableString {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl Record for RenderableString {
    fn render(&self) -> String {
        self.content.clone()
    }
}

impl From<&str> for RenderableString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for RenderableString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}
