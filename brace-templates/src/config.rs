/// Options for turning template source into nodes.
///
/// ```
/// # use brace_templates::ParserConfig;
/// let config = ParserConfig::new().strict_end_tags(true);
/// assert!(config.remove_standalone_lines);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct ParserConfig {
    /// Drop lines that hold nothing but section tags, block labels, end tags
    /// and comments (plus whitespace), including the line break.
    pub remove_standalone_lines: bool,
    /// Reject `{/}` and require the section name in every end tag.
    pub strict_end_tags: bool,
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_standalone_lines(mut self, remove: bool) -> Self {
        self.remove_standalone_lines = remove;
        self
    }

    pub fn strict_end_tags(mut self, strict: bool) -> Self {
        self.strict_end_tags = strict;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            remove_standalone_lines: true,
            strict_end_tags: false,
        }
    }
}
