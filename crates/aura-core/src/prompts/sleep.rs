//! Predictive sleep analysis over the most recent week of logs.

use crate::insight::types::SleepLog;

/// Only the newest entries are sent.
pub const SLEEP_WINDOW: usize = 7;

pub const SLEEP_TEMPLATE: &str = r#"Analyze these sleep logs (last 7 days): {logs}.
Ideal sleep is 8 hours.

Task:
1. Calculate sleep debt (assuming 8h/night ideal).
2. Predict stress level for the next 24h (Low/Medium/High/Critical).
3. Provide a short, predictive alert about cognitive performance.

JSON Output: { "debt": number, "stressLevel": "string", "alert": "string" }"#;

/// The last [`SLEEP_WINDOW`] entries of `logs` (input order is oldest first).
pub fn recent_logs(logs: &[SleepLog]) -> &[SleepLog] {
    &logs[logs.len().saturating_sub(SLEEP_WINDOW)..]
}

pub fn sleep_prompt(logs: &[SleepLog]) -> String {
    let encoded = serde_json::to_string(recent_logs(logs)).unwrap_or_else(|_| "[]".to_string());
    SLEEP_TEMPLATE.replace("{logs}", &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn log(day: u32, hours: f32) -> SleepLog {
        SleepLog {
            hours,
            quality: 3,
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
        }
    }

    #[test]
    fn only_last_week_is_embedded() {
        let logs: Vec<SleepLog> = (1..=10).map(|d| log(d, 6.0)).collect();
        let recent = recent_logs(&logs);
        assert_eq!(recent.len(), 7);
        assert_eq!(recent[0].date, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());

        let prompt = sleep_prompt(&logs);
        assert!(!prompt.contains("2026-03-03"));
        assert!(prompt.contains("2026-03-10"));
    }

    #[test]
    fn short_history_is_kept_whole() {
        let logs = vec![log(1, 7.5), log(2, 5.0)];
        assert_eq!(recent_logs(&logs).len(), 2);
    }
}
