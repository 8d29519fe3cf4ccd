//! The eight insight operations.

use super::fallbacks;
use super::gateway::InsightGateway;
use super::types::{
    deserialize_percent, ChatTurn, FutureSelfRequest, ImpactLevel, JournalSentiment,
    MentorImpactReport, ModerationVerdict, SleepInsight, SleepLog, Trajectory, WisdomInsight,
};
use super::Insight;
use crate::error::{AuraError, AuraResult};
use crate::gemini_service::GenerateRequest;
use crate::prompts;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const MAX_THEMES: usize = 3;
const MAX_MENTOR_POINTS: usize = 2;
const TRAJECTORY_COUNT: usize = 3;

fn decode_json<T: DeserializeOwned>(text: &str) -> AuraResult<T> {
    serde_json::from_str(text.trim()).map_err(|e| AuraError::Parse(e.to_string()))
}

fn decode_wisdom(text: &str) -> AuraResult<WisdomInsight> {
    let mut insight: WisdomInsight = decode_json(text)?;
    insight.themes.truncate(MAX_THEMES);
    insight.sentiment = if insight.sentiment.is_finite() {
        insight.sentiment.clamp(0.0, 1.0)
    } else {
        0.5
    };
    Ok(insight)
}

fn decode_trajectories(text: &str) -> AuraResult<Vec<Trajectory>> {
    let trajectories: Vec<Trajectory> = decode_json(text)?;
    if trajectories.len() != TRAJECTORY_COUNT {
        return Err(AuraError::Parse(format!(
            "expected {} trajectories, got {}",
            TRAJECTORY_COUNT,
            trajectories.len()
        )));
    }
    Ok(trajectories)
}

fn decode_sleep(text: &str) -> AuraResult<Option<SleepInsight>> {
    decode_json::<SleepInsight>(text).map(Some)
}

/// Mentor reply as sent by the model. Its `level` is ignored and re-derived from the score.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MentorReply {
    #[serde(deserialize_with = "deserialize_percent")]
    score: u8,
    strengths: Vec<String>,
    improvements: Vec<String>,
    burnout_warning: bool,
}

fn decode_mentor(text: &str) -> AuraResult<MentorImpactReport> {
    let mut reply: MentorReply = decode_json(text)?;
    reply.strengths.truncate(MAX_MENTOR_POINTS);
    reply.improvements.truncate(MAX_MENTOR_POINTS);
    Ok(MentorImpactReport {
        score: reply.score,
        level: ImpactLevel::from_score(reply.score),
        strengths: reply.strengths,
        improvements: reply.improvements,
        burnout_warning: reply.burnout_warning,
    })
}

fn decode_text(text: &str) -> AuraResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AuraError::Parse("empty reply".into()));
    }
    Ok(trimmed.to_string())
}

fn decode_title(text: &str) -> AuraResult<String> {
    prompts::clean_title(text).ok_or_else(|| AuraError::Parse("empty title".into()))
}

impl InsightGateway {
    /// Journal sentiment plus a short validating reply. Only the first 1000 characters
    /// of `text` are sent.
    pub async fn analyze_journal_entry(&self, text: &str) -> Insight<JournalSentiment> {
        self.dispatch(
            "analyze_journal_entry",
            GenerateRequest::prompt(prompts::journal_prompt(text)).json(),
            decode_json::<JournalSentiment>,
            fallbacks::offline_journal,
            fallbacks::failed_journal,
        )
        .await
    }

    /// Flags bullying, self-harm or toxicity in a peer chat message.
    pub async fn moderate_message(&self, text: &str) -> Insight<ModerationVerdict> {
        self.dispatch(
            "moderate_message",
            GenerateRequest::prompt(prompts::moderation_prompt(text)).json(),
            decode_json::<ModerationVerdict>,
            fallbacks::unflagged,
            fallbacks::unflagged,
        )
        .await
    }

    /// Collective themes from anonymous peer messages (joined text capped at 5000 chars).
    pub async fn generate_wisdom_insights(&self, messages: &[String]) -> Insight<WisdomInsight> {
        self.dispatch(
            "generate_wisdom_insights",
            GenerateRequest::prompt(prompts::wisdom_prompt(messages)).json(),
            decode_wisdom,
            fallbacks::offline_wisdom,
            fallbacks::failed_wisdom,
        )
        .await
    }

    /// Three trajectories (stable, growth, moonshot). Offline returns the demo trio;
    /// a failed call returns an empty list.
    pub async fn generate_future_self(
        &self,
        request: &FutureSelfRequest,
    ) -> Insight<Vec<Trajectory>> {
        self.dispatch(
            "generate_future_self",
            GenerateRequest::prompt(prompts::future_self_prompt(request)).json(),
            decode_trajectories,
            fallbacks::offline_future_self,
            fallbacks::failed_future_self,
        )
        .await
    }

    /// Sleep debt and stress prediction from the last 7 logs. `None` whenever the model
    /// cannot answer.
    pub async fn analyze_sleep_patterns(
        &self,
        logs: &[SleepLog],
    ) -> Insight<Option<SleepInsight>> {
        self.dispatch(
            "analyze_sleep_patterns",
            GenerateRequest::prompt(prompts::sleep_prompt(logs)).json(),
            decode_sleep,
            fallbacks::no_sleep_insight,
            fallbacks::no_sleep_insight,
        )
        .await
    }

    /// Impact audit of a peer mentor's recent messages (joined text capped at 8000 chars).
    /// The level is always derived from the returned score.
    pub async fn generate_mentor_impact_report(
        &self,
        interactions: &[String],
    ) -> Insight<MentorImpactReport> {
        self.dispatch(
            "generate_mentor_impact_report",
            GenerateRequest::prompt(prompts::mentor_impact_prompt(interactions)).json(),
            decode_mentor,
            fallbacks::offline_mentor_report,
            fallbacks::failed_mentor_report,
        )
        .await
    }

    /// Companion reply to `new_message` given the prior `history`.
    pub async fn generate_chat_response(
        &self,
        history: &[ChatTurn],
        new_message: &str,
    ) -> Insight<String> {
        let mut contents = history.to_vec();
        contents.push(ChatTurn::user(new_message));
        let request = GenerateRequest::conversation(contents)
            .with_system(prompts::COMPANION_SYSTEM)
            .with_temperature(prompts::COMPANION_TEMPERATURE);

        self.dispatch(
            "generate_chat_response",
            request,
            decode_text,
            fallbacks::offline_chat_reply,
            fallbacks::failed_chat_reply,
        )
        .await
    }

    /// Title of at most 4 words for a conversation opening with `first_message`.
    pub async fn generate_chat_title(&self, first_message: &str) -> Insight<String> {
        self.dispatch(
            "generate_chat_title",
            GenerateRequest::prompt(prompts::chat_title_prompt(first_message)),
            decode_title,
            fallbacks::default_chat_title,
            fallbacks::default_chat_title,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentor_level_follows_score() {
        let report = decode_mentor(
            r#"{"score": 86, "level": "Sage", "strengths": ["a","b","c"], "improvements": ["x"], "burnoutWarning": true}"#,
        )
        .unwrap();
        assert_eq!(report.level, ImpactLevel::Architect);
        assert_eq!(report.strengths.len(), 2);
        assert!(report.burnout_warning);
    }

    #[test]
    fn wisdom_is_clamped() {
        let w = decode_wisdom(
            r#"{"themes": ["a","b","c","d"], "sentiment": 1.7, "recommendation": "r"}"#,
        )
        .unwrap();
        assert_eq!(w.themes.len(), 3);
        assert_eq!(w.sentiment, 1.0);
    }

    #[test]
    fn wrong_trajectory_count_is_rejected() {
        let two = r#"[
            {"type":"stable","title":"a","narrative":"n","confidenceScore":80,"keyMilestone":"m"},
            {"type":"growth","title":"b","narrative":"n","confidenceScore":60,"keyMilestone":"m"}
        ]"#;
        assert!(decode_trajectories(two).is_err());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(decode_text("  \n").is_err());
        assert_eq!(decode_text(" Haan bol, kya hua? ").unwrap(), "Haan bol, kya hua?");
    }
}
