//! Prompt templates for the insight operations.
//!
//! Each template embeds caller data after cutting it to a fixed character budget so the
//! outbound payload stays bounded.

pub mod companion;
pub mod future_self;
pub mod journal;
pub mod mentor;
pub mod moderation;
pub mod sleep;
pub mod wisdom;

pub use companion::{
    chat_title_prompt, clean_title, CHAT_TITLE_TEMPLATE, COMPANION_SYSTEM, COMPANION_TEMPERATURE,
};
pub use future_self::future_self_prompt;
pub use journal::{journal_prompt, JOURNAL_MAX_CHARS, JOURNAL_TEMPLATE};
pub use mentor::{mentor_impact_prompt, MENTOR_LOG_MAX_CHARS, MENTOR_TEMPLATE};
pub use moderation::{moderation_prompt, MODERATION_TEMPLATE};
pub use sleep::{sleep_prompt, SLEEP_TEMPLATE, SLEEP_WINDOW};
pub use wisdom::{wisdom_prompt, WISDOM_MAX_CHARS, WISDOM_TEMPLATE};

/// First `max` characters of `text` (not bytes, so multi-byte scripts are never split).
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("ab", 3), "ab");
        assert_eq!(truncate_chars("नमस्ते", 2), "नम");
        assert_eq!(truncate_chars("", 10), "");
    }
}
