//! Request/response shapes of the insight operations.
//!
//! Labels coming back from the model are parsed case-insensitively; scores are read as
//! any JSON number and clamped into range.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error for a label the model returned that does not belong to the enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} label: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownLabel {}

macro_rules! label_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lower = s.trim().to_ascii_lowercase();
                match lower.as_str() {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(UnknownLabel { kind: $kind, value: s.to_string() }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = UnknownLabel;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

/// Journal sentiment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Critical,
}

label_enum!(Sentiment, "sentiment", {
    Positive => "positive",
    Neutral => "neutral",
    Negative => "negative",
    Critical => "critical",
});

/// Predicted stress for the next 24h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum StressLevel {
    Low,
    Medium,
    High,
    Critical,
}

label_enum!(StressLevel, "stress level", {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TrajectoryKind {
    Stable,
    Growth,
    Moonshot,
}

label_enum!(TrajectoryKind, "trajectory", {
    Stable => "stable",
    Growth => "growth",
    Moonshot => "moonshot",
});

/// Mentor tier derived from the impact score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ImpactLevel {
    Novice,
    Guardian,
    Architect,
}

label_enum!(ImpactLevel, "impact level", {
    Novice => "novice",
    Guardian => "guardian",
    Architect => "architect",
});

impl ImpactLevel {
    /// `< 60` Novice, `60..=85` Guardian, `> 85` Architect.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=59 => ImpactLevel::Novice,
            60..=85 => ImpactLevel::Guardian,
            _ => ImpactLevel::Architect,
        }
    }
}

/// Reads any JSON number, rounds it, and clamps it to `0..=100`.
pub(crate) fn deserialize_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("score is not a finite number"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalSentiment {
    pub sentiment: Sentiment,
    pub response: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub flagged: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Collective themes extracted from anonymous peer chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WisdomInsight {
    pub themes: Vec<String>,
    /// 0.0 = crisis, 1.0 = thriving.
    pub sentiment: f32,
    pub recommendation: String,
}

/// Input of the future-self simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureSelfRequest {
    pub major: String,
    pub goal: String,
    pub obstacle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trajectory {
    #[serde(rename = "type")]
    pub kind: TrajectoryKind,
    pub title: String,
    pub narrative: String,
    #[serde(deserialize_with = "deserialize_percent")]
    pub confidence_score: u8,
    pub key_milestone: String,
}

/// One night of sleep as logged by the student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepLog {
    pub hours: f32,
    /// 1 (poor) to 5 (great).
    pub quality: u8,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepInsight {
    /// Hours below the 8h/night ideal over the window.
    pub debt: f32,
    pub stress_level: StressLevel,
    pub alert: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorImpactReport {
    #[serde(deserialize_with = "deserialize_percent")]
    pub score: u8,
    pub level: ImpactLevel,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub burnout_warning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPart {
    pub text: String,
}

/// One turn of a companion conversation, in the generative API's `contents` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub parts: Vec<ChatPart>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ChatRole::User, text)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(ChatRole::Model, text)
    }

    fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![ChatPart { text: text.into() }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_level_boundaries() {
        assert_eq!(ImpactLevel::from_score(59), ImpactLevel::Novice);
        assert_eq!(ImpactLevel::from_score(60), ImpactLevel::Guardian);
        assert_eq!(ImpactLevel::from_score(85), ImpactLevel::Guardian);
        assert_eq!(ImpactLevel::from_score(86), ImpactLevel::Architect);
        assert_eq!(ImpactLevel::from_score(0), ImpactLevel::Novice);
        assert_eq!(ImpactLevel::from_score(100), ImpactLevel::Architect);
    }

    #[test]
    fn labels_parse_case_insensitively() {
        let parsed: SleepInsight =
            serde_json::from_str(r#"{"debt": 6.5, "stressLevel": "HIGH", "alert": "Rest"}"#)
                .unwrap();
        assert_eq!(parsed.stress_level, StressLevel::High);
        assert_eq!("Positive".parse::<Sentiment>(), Ok(Sentiment::Positive));
        assert!("ecstatic".parse::<Sentiment>().is_err());
    }

    #[test]
    fn trajectory_reads_wire_names_and_clamps_score() {
        let t: Trajectory = serde_json::from_str(
            r#"{"type":"Moonshot","title":"T","narrative":"N","confidenceScore":140.2,"keyMilestone":"M"}"#,
        )
        .unwrap();
        assert_eq!(t.kind, TrajectoryKind::Moonshot);
        assert_eq!(t.confidence_score, 100);

        let back = serde_json::to_value(&t).unwrap();
        assert_eq!(back["type"], "moonshot");
        assert_eq!(back["keyMilestone"], "M");
    }

    #[test]
    fn chat_turn_serializes_as_contents() {
        let turn = ChatTurn::user("Sun nah yr");
        let v = serde_json::to_value(&turn).unwrap();
        assert_eq!(v, serde_json::json!({"role": "user", "parts": [{"text": "Sun nah yr"}]}));
    }
}
