//! Static values substituted when the model is unreachable (`offline_*`) or a call
//! fails (`failed_*`). Offline values double as demo content.

use super::types::{
    ImpactLevel, JournalSentiment, MentorImpactReport, ModerationVerdict, Sentiment,
    SleepInsight, Trajectory, TrajectoryKind, WisdomInsight,
};

pub const OFFLINE_JOURNAL_RESPONSE: &str = "AI Offline. Good job writing!";
pub const FAILED_JOURNAL_RESPONSE: &str = "Thanks for sharing. Writing is a great step.";
pub const OFFLINE_CHAT_REPLY: &str = "Connection weak. Bolo, kya haal hai?";
pub const FAILED_CHAT_REPLY: &str = "Network issue hai yaar. Ek baar refresh karke try kar.";
pub const DEFAULT_CHAT_TITLE: &str = "New Conversation";

pub fn offline_journal() -> JournalSentiment {
    JournalSentiment {
        sentiment: Sentiment::Neutral,
        response: OFFLINE_JOURNAL_RESPONSE.to_string(),
    }
}

pub fn failed_journal() -> JournalSentiment {
    JournalSentiment {
        sentiment: Sentiment::Neutral,
        response: FAILED_JOURNAL_RESPONSE.to_string(),
    }
}

pub fn unflagged() -> ModerationVerdict {
    ModerationVerdict::default()
}

pub fn offline_wisdom() -> WisdomInsight {
    WisdomInsight {
        themes: vec![
            "Academic Pressure".to_string(),
            "Sleep Deprivation".to_string(),
            "Future Anxiety".to_string(),
        ],
        sentiment: 0.35,
        recommendation:
            "Initiate a group study planner session and share sleep hygiene tips.".to_string(),
    }
}

pub fn failed_wisdom() -> WisdomInsight {
    WisdomInsight {
        themes: vec!["Data Unavailable".to_string()],
        sentiment: 0.5,
        recommendation: "Check connection.".to_string(),
    }
}

pub fn offline_future_self() -> Vec<Trajectory> {
    vec![
        Trajectory {
            kind: TrajectoryKind::Stable,
            title: "The Persistent Path".to_string(),
            narrative: "By consistently tackling small tasks, you pass your exams and graduate with a solid GPA. You find a junior role that offers mentorship.".to_string(),
            confidence_score: 85,
            key_milestone: "Passing the hardest semester".to_string(),
        },
        Trajectory {
            kind: TrajectoryKind::Growth,
            title: "The Network Effect".to_string(),
            narrative: "You turn your struggle into a conversation starter. You find a study group that eventually becomes your startup co-founders.".to_string(),
            confidence_score: 72,
            key_milestone: "Leading a student project".to_string(),
        },
        Trajectory {
            kind: TrajectoryKind::Moonshot,
            title: "The Breakthrough".to_string(),
            narrative: "The specific problem you're stuck on becomes your thesis topic. You develop a novel solution that gets published.".to_string(),
            confidence_score: 45,
            key_milestone: "First Research Publication".to_string(),
        },
    ]
}

pub fn failed_future_self() -> Vec<Trajectory> {
    Vec::new()
}

pub fn no_sleep_insight() -> Option<SleepInsight> {
    None
}

pub fn offline_mentor_report() -> MentorImpactReport {
    MentorImpactReport {
        score: 85,
        level: ImpactLevel::Guardian,
        strengths: vec![
            "Active Listening".to_string(),
            "Crisis De-escalation".to_string(),
        ],
        improvements: vec![
            "Try to ask more open-ended questions".to_string(),
            "Avoid offering solutions too quickly".to_string(),
        ],
        burnout_warning: false,
    }
}

pub fn failed_mentor_report() -> MentorImpactReport {
    MentorImpactReport {
        score: 0,
        level: ImpactLevel::Novice,
        strengths: vec!["N/A".to_string()],
        improvements: vec!["Analysis failed due to connection.".to_string()],
        burnout_warning: false,
    }
}

pub fn offline_chat_reply() -> String {
    OFFLINE_CHAT_REPLY.to_string()
}

pub fn failed_chat_reply() -> String {
    FAILED_CHAT_REPLY.to_string()
}

pub fn default_chat_title() -> String {
    DEFAULT_CHAT_TITLE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_report_level_matches_score() {
        let report = offline_mentor_report();
        assert_eq!(ImpactLevel::from_score(report.score), report.level);
        let failed = failed_mentor_report();
        assert_eq!(ImpactLevel::from_score(failed.score), failed.level);
    }

    #[test]
    fn offline_future_self_has_one_of_each_kind() {
        let kinds: Vec<TrajectoryKind> = offline_future_self().iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TrajectoryKind::Stable, TrajectoryKind::Growth, TrajectoryKind::Moonshot]
        );
    }
}
