//! Peer chat moderation.

pub const MODERATION_TEMPLATE: &str = r#"Task: Moderate this student chat message for bullying, self-harm, or toxicity.
Message: "{message}"
JSON Output: { "flagged": boolean, "reason": "string or null" }"#;

pub fn moderation_prompt(message: &str) -> String {
    MODERATION_TEMPLATE.replace("{message}", message)
}
