/// Telegram rejects messages longer than 4096 characters; the default leaves
/// a little headroom.
pub const DEFAULT_MAX_WORD_COUNT: usize = 4090;

/// Smallest limit that can still hold a fenced code block with content.
pub const MIN_MAX_WORD_COUNT: usize = 16;

/// Flags controlling the Markdown to Telegram conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Render LaTeX math spans as literal text instead of Markdown
    pub latex_escape: bool,
    /// Collapse runs of spaces and tabs in text
    pub normalize_whitespace: bool,
    /// Maximum length of a single TEXT box, in characters
    pub max_word_count: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            latex_escape: true,
            normalize_whitespace: true,
            max_word_count: DEFAULT_MAX_WORD_COUNT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_driver_profile() {
        let options = ConvertOptions::default();
        assert!(options.latex_escape);
        assert!(options.normalize_whitespace);
        assert_eq!(options.max_word_count, 4090);
    }
}
