//! Mentor impact audit: supervisor-style review of a peer mentor's recent messages.

/// Joined mentor messages beyond this many characters are dropped.
pub const MENTOR_LOG_MAX_CHARS: usize = 8000;

pub const MENTOR_TEMPLATE: &str = r#"Role: Supervisor for Student Peer Mentors.
Data: The following are recent chat messages sent by a Peer Mentor to students.
"{logs}"

Task: Evaluate the mentor's effectiveness based on 3 criteria: Empathy, Clarity, and Safety (knowing when to escalate).

1. Assign an 'Impact Score' (0-100).
2. Determine Level: 'Novice' (<60), 'Guardian' (60-85), or 'Architect' (>85).
3. Identify 2 key strengths.
4. Provide 2 specific, actionable improvements for their communication style.
5. Detect if the mentor sounds fatigued/cynical (Burnout Warning).

JSON Output: {
  "score": number,
  "level": "string",
  "strengths": ["string"],
  "improvements": ["string"],
  "burnoutWarning": boolean
}"#;

pub fn mentor_impact_prompt(interactions: &[String]) -> String {
    let joined = interactions.join("\n");
    MENTOR_TEMPLATE.replace("{logs}", super::truncate_chars(&joined, MENTOR_LOG_MAX_CHARS))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_logs_are_capped() {
        let interactions = vec!["¤".repeat(5000), "¤".repeat(5000)];
        let prompt = mentor_impact_prompt(&interactions);
        assert_eq!(prompt.matches('¤').count(), MENTOR_LOG_MAX_CHARS);
        assert!(prompt.contains("Burnout Warning"));
    }
}
