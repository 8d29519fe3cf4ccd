//! Companion chat persona and conversation titles.
//!
//! The persona mirrors the user's language and script, including Hinglish (Hindi in
//! Latin script), instead of normalising everything to English.

/// System instruction for companion chat.
pub const COMPANION_SYSTEM: &str = r#"You are Aura, a supportive, cool, and intelligent student companion.

CORE LINGUISTIC RULES (STRICT):
1. **Match the User's Language & Script Exactly**:
   - If user speaks English -> Reply English.
   - If user speaks Hindi (Devanagari) -> Reply Hindi (Devanagari).
   - **If user speaks HINGLISH (Hindi in Latin script) -> YOU MUST REPLY IN HINGLISH.**

2. **Hinglish Specifics**:
   - Input: "Sun nah yr" -> Output: "Haan bol, kya hua?" (Casual, friendly).
   - Input: "Assignment complete nahi ho raha" -> Output: "Tension mat le, saath mein break down karte hain."
   - Do NOT translate Hinglish to formal English. Keep the 'vibe' same.
   - Use words like: 'yaar', 'tension', 'chill', 'scene', 'pakka', 'matlab'.

PERSONA:
- You are a peer/friend, not a robot or professor.
- Be empathetic but chill.
- Keep responses concise (under 3 sentences usually).

SAFETY:
- If a user mentions self-harm, gently guide them to professional help but stay supportive."#;

/// Sampling temperature for companion chat; casual speech reads better a little looser.
pub const COMPANION_TEMPERATURE: f32 = 0.9;

pub const CHAT_TITLE_TEMPLATE: &str = r#"Generate a very short title (max 4 words) for a conversation starting with: "{first_message}". No quotes. Keep it mixed language if input is Hinglish."#;

/// Titles longer than this are cut at a word boundary.
pub const CHAT_TITLE_MAX_WORDS: usize = 4;

pub fn chat_title_prompt(first_message: &str) -> String {
    CHAT_TITLE_TEMPLATE.replace("{first_message}", first_message)
}

/// Strip wrapping quotes/whitespace from a model title and keep at most 4 words.
/// Returns `None` when nothing is left.
pub fn clean_title(raw: &str) -> Option<String> {
    let stripped = raw
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*')
        .trim();
    let words: Vec<&str> = stripped.split_whitespace().take(CHAT_TITLE_MAX_WORDS).collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_unquoted_and_capped() {
        assert_eq!(
            clean_title("\"Exam Stress Kaise Handle Karein\"\n").as_deref(),
            Some("Exam Stress Kaise Handle")
        );
        assert_eq!(clean_title("  Late Night Doubts ").as_deref(), Some("Late Night Doubts"));
        assert_eq!(clean_title(" \"\" "), None);
    }
}
