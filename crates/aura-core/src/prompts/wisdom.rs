//! Peer wisdom extraction: collective themes for a peer mentor, never individual data.

/// Joined chat messages beyond this many characters are dropped.
pub const WISDOM_MAX_CHARS: usize = 5000;

pub const WISDOM_TEMPLATE: &str = r#"You are the "Peer Wisdom Extraction Engine".
Analyze these anonymous student chat messages to extract collective intelligence for a Peer Mentor.

Messages: "{messages}"

Task:
1. Identify 3 dominant emerging themes (e.g., "Fear of Failure", "Imposter Syndrome").
2. Calculate collective sentiment score (0.0 = Crisis, 1.0 = Thriving).
3. Generate ONE high-impact, non-clinical intervention strategy for the mentor.

Constraint: DO NOT reveal specific user data. Summarize patterns only.

JSON Output: { "themes": ["string"], "sentiment": number, "recommendation": "string" }"#;

pub fn wisdom_prompt(messages: &[String]) -> String {
    let joined = messages.join("\n");
    WISDOM_TEMPLATE.replace("{messages}", super::truncate_chars(&joined, WISDOM_MAX_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_joined_and_capped() {
        let messages = vec!["a".repeat(4000), "b".repeat(4000)];
        let prompt = wisdom_prompt(&messages);
        // 4000 a's and the joining newline leave room for 999 b's.
        assert!(prompt.contains(&format!("{}\n{}\"", "a".repeat(4000), "b".repeat(999))));
        assert!(!prompt.contains(&"b".repeat(1000)));
    }
}
