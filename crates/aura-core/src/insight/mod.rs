//! Insight gateway: prompt templating, one model call, JSON decode, static fallback.
//!
//! Every operation returns an [`Insight`] whose value has the same shape whether the
//! model answered, failed, or was never reachable. The `source` says which happened.

pub mod fallbacks;
mod gateway;
mod operations;
pub mod types;

pub use gateway::{ClientStatus, InsightGateway};
pub use types::{
    ChatPart, ChatRole, ChatTurn, FutureSelfRequest, ImpactLevel, JournalSentiment,
    MentorImpactReport, ModerationVerdict, Sentiment, SleepInsight, SleepLog, StressLevel,
    Trajectory, TrajectoryKind, UnknownLabel, WisdomInsight,
};

use serde::Serialize;

/// Why a fallback value was substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// No model client could be built; nothing was sent.
    Offline,
    /// The request failed in transport or the API returned an error status.
    Transport(String),
    /// The model answered but the reply did not decode into the expected shape.
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "origin", content = "reason", rename_all = "snake_case")]
pub enum InsightSource {
    Model,
    Fallback(FallbackReason),
}

/// Value of an insight operation plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight<T> {
    pub value: T,
    pub source: InsightSource,
}

impl<T> Insight<T> {
    pub fn from_model(value: T) -> Self {
        Self {
            value,
            source: InsightSource::Model,
        }
    }

    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        Self {
            value,
            source: InsightSource::Fallback(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, InsightSource::Fallback(_))
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match &self.source {
            InsightSource::Fallback(reason) => Some(reason),
            InsightSource::Model => None,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Insight<U> {
        Insight {
            value: f(self.value),
            source: self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serializes_with_tags() {
        let ok = Insight::from_model(1);
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({"value": 1, "source": {"origin": "model"}})
        );

        let fb = Insight::fallback(0, FallbackReason::Malformed("eof".into()));
        assert_eq!(
            serde_json::to_value(&fb).unwrap(),
            serde_json::json!({
                "value": 0,
                "source": {"origin": "fallback", "reason": {"kind": "malformed", "detail": "eof"}}
            })
        );
        assert!(fb.is_fallback());
        assert_eq!(fb.map(|v| v + 1).value, 1);
    }
}
