//! Journal sentiment: validate, never advise.

/// Journal text beyond this many characters is dropped before prompting.
pub const JOURNAL_MAX_CHARS: usize = 1000;

pub const JOURNAL_TEMPLATE: &str = r#"You are Aura, an empathetic, non-clinical student companion.
User Entry: "{entry}"

Task:
1. Analyze sentiment (positive, neutral, negative, critical).
2. Provide a 2-sentence supportive response. NOT advice. Just validation.

JSON Output: { "sentiment": "string", "response": "string" }"#;

/// Build the journal prompt from the first 1000 characters of `entry`.
pub fn journal_prompt(entry: &str) -> String {
    JOURNAL_TEMPLATE.replace("{entry}", super::truncate_chars(entry, JOURNAL_MAX_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_entry_is_cut_to_budget() {
        let entry = format!("{}{}", "x".repeat(1000), "¤".repeat(1000));
        let prompt = journal_prompt(&entry);
        assert!(prompt.contains(&format!("\"{}\"", "x".repeat(1000))));
        assert!(!prompt.contains('¤'));
    }
}
