//! Word-count limits for synthesized attributes.
//!
//! Over-limit provider output is truncated at a word boundary instead of
//! being regenerated.

/// Default motivation ceiling in words.
pub const DEFAULT_MOTIVATION_WORD_LIMIT: usize = 50;
/// Default visual signature ceiling in words.
pub const DEFAULT_VISUAL_SIGNATURE_WORD_LIMIT: usize = 40;

/// Per-field word ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordLimits {
    pub motivation: usize,
    pub visual_signature: usize,
}

impl Default for WordLimits {
    fn default() -> Self {
        Self {
            motivation: DEFAULT_MOTIVATION_WORD_LIMIT,
            visual_signature: DEFAULT_VISUAL_SIGNATURE_WORD_LIMIT,
        }
    }
}

/// Number of whitespace-separated words in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Keep at most `limit` words of `text`.
///
/// Text within the limit is returned trimmed and otherwise untouched.
/// Longer text keeps its first `limit` words joined by single spaces, so a
/// word is never cut in half.
pub fn truncate_words(text: &str, limit: usize) -> String {
    let trimmed = text.trim();
    if word_count(trimmed) <= limit {
        return trimmed.to_string();
    }
    trimmed
        .split_whitespace()
        .take(limit)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_limit_is_unchanged() {
        assert_eq!(truncate_words("Seeks justice.", 5), "Seeks justice.");
    }

    #[test]
    fn within_limit_preserves_inner_spacing() {
        assert_eq!(truncate_words("  Tall,  scarred\nface ", 5), "Tall,  scarred\nface");
    }

    #[test]
    fn over_limit_cuts_at_word_boundary() {
        assert_eq!(
            truncate_words("one two three four five", 3),
            "one two three"
        );
    }

    #[test]
    fn exact_limit_is_unchanged() {
        assert_eq!(truncate_words("one two three", 3), "one two three");
    }

    #[test]
    fn long_words_are_never_split() {
        let text = "extraordinarily unconventional protagonist";
        let out = truncate_words(text, 2);
        assert_eq!(out, "extraordinarily unconventional");
    }

    #[test]
    fn default_limits() {
        let limits = WordLimits::default();
        assert_eq!(limits.motivation, 50);
        assert_eq!(limits.visual_signature, 40);
    }

    #[test]
    fn count_ignores_repeated_whitespace() {
        assert_eq!(word_count("  a   b\tc\n"), 3);
    }
}
