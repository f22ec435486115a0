//! Display helpers for session summaries.

use crate::risk::{self, RiskAssessment};
use crate::{DrinkEvent, SessionState};
use chrono::{DateTime, Utc};

/// Coarse BAC status: "Low" under 0.02, "Mod" under 0.05, else "High"
pub fn status_label(bac: f64) -> &'static str {
    if bac < 0.02 {
        "Low"
    } else if bac < 0.05 {
        "Mod"
    } else {
        "High"
    }
}

/// Hours as zero-padded `HH:MM`, truncating to whole minutes
pub fn format_hours_minutes(hours: f64) -> String {
    if !(hours > 0.0) {
        return "00:00".to_string();
    }

    let total_minutes = (hours * 60.0) as i64;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

/// One-line description of a drink event, e.g. "1.5 × Lager (Double)"
pub fn describe_event(event: &DrinkEvent) -> String {
    let base = format!("{:.1} × {}", event.amount, event.name);
    if event.is_double {
        format!("{} (Double)", base)
    } else {
        base
    }
}

/// Everything the status screen shows, derived from one session snapshot
#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub bac: f64,
    pub hours_until_safe: f64,
    pub event_count: usize,
    pub risk: RiskAssessment,
}

impl SessionSummary {
    pub fn new(session: &SessionState, now: DateTime<Utc>) -> Self {
        Self {
            bac: session.bac,
            hours_until_safe: session.hours_until_safe,
            event_count: session.events.len(),
            risk: risk::assess(&session.events, session.bac, now, risk::default_window()),
        }
    }

    pub fn status(&self) -> &'static str {
        status_label(self.bac)
    }

    pub fn time_until_safe(&self) -> String {
        format_hours_minutes(self.hours_until_safe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RiskLevel;
    use chrono::Duration;
    use uuid::Uuid;

    fn event(amount: f64, is_double: bool, minutes_ago: i64, bac: f64) -> DrinkEvent {
        DrinkEvent {
            id: Uuid::new_v4(),
            name: "Vodka Shot".into(),
            glyph: "🥃".into(),
            amount,
            is_double,
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            bac_contribution: bac,
        }
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(0.0), "Low");
        assert_eq!(status_label(0.019), "Low");
        assert_eq!(status_label(0.02), "Mod");
        assert_eq!(status_label(0.049), "Mod");
        assert_eq!(status_label(0.05), "High");
    }

    #[test]
    fn test_format_hours_minutes() {
        assert_eq!(format_hours_minutes(0.0), "00:00");
        assert_eq!(format_hours_minutes(-1.0), "00:00");
        assert_eq!(format_hours_minutes(0.5), "00:30");
        assert_eq!(format_hours_minutes(2.0), "02:00");
        assert_eq!(format_hours_minutes(12.75), "12:45");
        // 1.999 h = 119.94 min, truncated
        assert_eq!(format_hours_minutes(1.999), "01:59");
    }

    #[test]
    fn test_describe_event() {
        assert_eq!(describe_event(&event(1.0, false, 0, 0.0)), "1.0 × Vodka Shot");
        assert_eq!(
            describe_event(&event(2.5, true, 0, 0.0)),
            "2.5 × Vodka Shot (Double)"
        );
    }

    #[test]
    fn test_summary_from_session() {
        let session = SessionState::default()
            .apply(event(1.0, true, 40, 0.0301))
            .apply(event(1.0, true, 10, 0.0301));

        let summary = SessionSummary::new(&session, Utc::now());

        assert_eq!(summary.event_count, 2);
        assert_eq!(summary.status(), "High");
        // 0.0102 / 0.015 h = 40.8 min
        assert_eq!(summary.time_until_safe(), "00:40");
        // BAC 0.0602 (25) + 2 events (5) + 30 min pace (5) + 2 doubles (10) + 2 vodka (5)
        assert_eq!(summary.risk.score, 50);
        assert_eq!(summary.risk.level, RiskLevel::Risky);
    }
}
