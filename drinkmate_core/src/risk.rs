//! Risk pattern analysis over recent drink events.
//!
//! Scoring is a weighted point sum over the events logged within the
//! evaluation window (3 hours by default):
//!
//! | Factor        | Points                                      |
//! |---------------|---------------------------------------------|
//! | BAC level     | 40 at ≥ 0.08, 25 at ≥ 0.05, 10 at ≥ 0.03    |
//! | Event count   | 25 at ≥ 5, 15 at ≥ 3, 5 at ≥ 2              |
//! | Pace          | 20 under 15 min, 10 under 30, 5 under 45    |
//! | Doubles       | 10 at ≥ 2, 5 at ≥ 1                         |
//! | High-alcohol  | 5 at ≥ 2                                    |
//!
//! A total of 50 or more is [`RiskLevel::Risky`], 25 or more is
//! [`RiskLevel::Caution`], anything lower is [`RiskLevel::Safe`].
//! Insights use their own, looser thresholds.

use crate::DrinkEvent;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Default evaluation window in hours
pub const DEFAULT_WINDOW_HOURS: i64 = 3;

/// Name fragments that mark a drink as high-alcohol (case-sensitive)
pub const HIGH_ALCOHOL_KEYWORDS: &[&str] = &[
    "Martini",
    "Vodka Red Bull",
    "Whiskey",
    "Vodka",
    "Rum",
    "Tequila",
];

/// Default evaluation window
pub fn default_window() -> Duration {
    Duration::hours(DEFAULT_WINDOW_HOURS)
}

/// Three-level risk classification
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Safe,
    Caution,
    Risky,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= 50 {
            RiskLevel::Risky
        } else if score >= 25 {
            RiskLevel::Caution
        } else {
            RiskLevel::Safe
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Safe => "Safe",
            RiskLevel::Caution => "Caution",
            RiskLevel::Risky => "Risky",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            RiskLevel::Safe => "Pace looks good",
            RiskLevel::Caution => "Consider slowing down",
            RiskLevel::Risky => "High-risk pattern detected",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            RiskLevel::Safe => "🛡",
            RiskLevel::Caution => "⚠",
            RiskLevel::Risky => "⛔",
        }
    }

    /// Display colour as RGB fractions
    pub fn rgb(self) -> (f64, f64, f64) {
        match self {
            RiskLevel::Safe => (0.3, 0.8, 0.3),
            RiskLevel::Caution => (1.0, 0.7, 0.0),
            RiskLevel::Risky => (0.95, 0.3, 0.3),
        }
    }
}

/// Result of a risk evaluation; built fresh on every call
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub score: u32,
    pub insights: Vec<String>,
}

/// Events inside the evaluation window plus the current BAC
#[derive(Clone, Debug)]
pub struct RiskContext<'a> {
    /// In-window events, newest first
    pub recent: Vec<&'a DrinkEvent>,
    pub current_bac: f64,
}

impl<'a> RiskContext<'a> {
    /// Collect the events logged no more than `window` before `now`
    pub fn new(
        events: &'a [DrinkEvent],
        current_bac: f64,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Self {
        let mut recent: Vec<&DrinkEvent> = events
            .iter()
            .filter(|e| now - e.timestamp <= window)
            .collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Self {
            recent,
            current_bac,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    /// Mean gap between consecutive events in minutes; needs two events
    pub fn mean_gap_minutes(&self) -> Option<f64> {
        if self.recent.len() < 2 {
            return None;
        }

        let total_seconds: f64 = self
            .recent
            .windows(2)
            .map(|pair| (pair[0].timestamp - pair[1].timestamp).num_milliseconds() as f64 / 1000.0)
            .sum();

        let mean_seconds = total_seconds / (self.recent.len() - 1) as f64;
        Some(mean_seconds / 60.0)
    }

    pub fn double_count(&self) -> usize {
        self.recent.iter().filter(|e| e.is_double).count()
    }

    pub fn high_alcohol_count(&self) -> usize {
        self.recent
            .iter()
            .filter(|e| HIGH_ALCOHOL_KEYWORDS.iter().any(|k| e.name.contains(k)))
            .count()
    }
}

/// One weighted rule in the risk score
pub struct RiskFactor {
    pub name: &'static str,
    pub points: fn(&RiskContext<'_>) -> u32,
}

/// The scoring rules, evaluated in order and summed
pub const RISK_FACTORS: &[RiskFactor] = &[
    RiskFactor {
        name: "bac_level",
        points: bac_level_points,
    },
    RiskFactor {
        name: "event_count",
        points: event_count_points,
    },
    RiskFactor {
        name: "pace",
        points: pace_points,
    },
    RiskFactor {
        name: "doubles",
        points: double_points,
    },
    RiskFactor {
        name: "high_alcohol",
        points: high_alcohol_points,
    },
];

fn bac_level_points(ctx: &RiskContext<'_>) -> u32 {
    match ctx.current_bac {
        b if b >= 0.08 => 40,
        b if b >= 0.05 => 25,
        b if b >= 0.03 => 10,
        _ => 0,
    }
}

fn event_count_points(ctx: &RiskContext<'_>) -> u32 {
    match ctx.recent.len() {
        n if n >= 5 => 25,
        n if n >= 3 => 15,
        n if n >= 2 => 5,
        _ => 0,
    }
}

fn pace_points(ctx: &RiskContext<'_>) -> u32 {
    match ctx.mean_gap_minutes() {
        Some(m) if m < 15.0 => 20,
        Some(m) if m < 30.0 => 10,
        Some(m) if m < 45.0 => 5,
        _ => 0,
    }
}

fn double_points(ctx: &RiskContext<'_>) -> u32 {
    match ctx.double_count() {
        n if n >= 2 => 10,
        1 => 5,
        _ => 0,
    }
}

fn high_alcohol_points(ctx: &RiskContext<'_>) -> u32 {
    if ctx.high_alcohol_count() >= 2 {
        5
    } else {
        0
    }
}

/// Total points for a context
pub fn score(ctx: &RiskContext<'_>) -> u32 {
    RISK_FACTORS
        .iter()
        .map(|factor| {
            let points = (factor.points)(ctx);
            tracing::trace!("Risk factor {}: {} points", factor.name, points);
            points
        })
        .sum()
}

/// Classify the events within `window` of `now`
pub fn classify(
    events: &[DrinkEvent],
    current_bac: f64,
    now: DateTime<Utc>,
    window: Duration,
) -> RiskLevel {
    let ctx = RiskContext::new(events, current_bac, now, window);
    if ctx.is_empty() {
        return RiskLevel::Safe;
    }
    RiskLevel::from_score(score(&ctx))
}

/// Advisory messages for the events within the default window
pub fn insights(events: &[DrinkEvent], current_bac: f64, now: DateTime<Utc>) -> Vec<String> {
    let ctx = RiskContext::new(events, current_bac, now, default_window());
    insights_for(&ctx)
}

fn insights_for(ctx: &RiskContext<'_>) -> Vec<String> {
    let mut insights = Vec::new();
    if ctx.is_empty() {
        return insights;
    }

    if ctx.mean_gap_minutes().is_some_and(|m| m < 20.0) {
        insights.push("Drinking faster than recommended pace".to_string());
    }

    if ctx.double_count() >= 2 {
        insights.push("Multiple double shots increase risk".to_string());
    }

    if ctx.current_bac >= 0.08 {
        insights.push("BAC is above legal driving limit in most regions".to_string());
    } else if ctx.current_bac >= 0.05 {
        insights.push("Approaching legal limit - avoid driving".to_string());
    }

    insights
}

/// Score, classify and explain the events within `window` of `now`
pub fn assess(
    events: &[DrinkEvent],
    current_bac: f64,
    now: DateTime<Utc>,
    window: Duration,
) -> RiskAssessment {
    let ctx = RiskContext::new(events, current_bac, now, window);
    if ctx.is_empty() {
        return RiskAssessment {
            level: RiskLevel::Safe,
            score: 0,
            insights: Vec::new(),
        };
    }

    let score = score(&ctx);
    let level = RiskLevel::from_score(score);

    tracing::debug!(
        "Risk assessment: {} points over {} event(s) -> {:?}",
        score,
        ctx.recent.len(),
        level
    );

    RiskAssessment {
        level,
        score,
        insights: insights_for(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-12-31T23:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn event(name: &str, minutes_ago: i64, is_double: bool) -> DrinkEvent {
        DrinkEvent {
            id: Uuid::new_v4(),
            name: name.into(),
            glyph: "🍹".into(),
            amount: 1.0,
            is_double,
            timestamp: now() - Duration::minutes(minutes_ago),
            bac_contribution: 0.01,
        }
    }

    fn lagers(minutes_ago: &[i64]) -> Vec<DrinkEvent> {
        minutes_ago.iter().map(|m| event("Lager", *m, false)).collect()
    }

    fn score_of(events: &[DrinkEvent], bac: f64) -> u32 {
        score(&RiskContext::new(events, bac, now(), default_window()))
    }

    #[test]
    fn test_no_events_is_safe() {
        let a = assess(&[], 0.2, now(), default_window());
        assert_eq!(a.level, RiskLevel::Safe);
        assert_eq!(a.score, 0);
        assert!(a.insights.is_empty());
    }

    #[test]
    fn test_events_outside_window_are_ignored() {
        let events = vec![
            event("Vodka", 200, true),
            event("Vodka", 210, true),
            event("Tequila", 220, true),
        ];

        let a = assess(&events, 0.12, now(), default_window());

        assert_eq!(a.level, RiskLevel::Safe);
        assert!(a.insights.is_empty());
        assert!(insights(&events, 0.12, now()).is_empty());
    }

    #[test]
    fn test_window_edge_is_inclusive() {
        let events = lagers(&[180]);
        let ctx = RiskContext::new(&events, 0.0, now(), default_window());
        assert_eq!(ctx.recent.len(), 1);

        let events = lagers(&[181]);
        let ctx = RiskContext::new(&events, 0.0, now(), default_window());
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_bac_level_points() {
        let one = lagers(&[10]);
        assert_eq!(score_of(&one, 0.0), 0);
        assert_eq!(score_of(&one, 0.03), 10);
        assert_eq!(score_of(&one, 0.05), 25);
        assert_eq!(score_of(&one, 0.08), 40);
        assert_eq!(score_of(&one, 0.30), 40);
    }

    #[test]
    fn test_event_count_points_without_pace() {
        // 50 minutes apart so pace adds nothing
        assert_eq!(score_of(&lagers(&[0, 50]), 0.0), 5);
        assert_eq!(score_of(&lagers(&[0, 50, 100]), 0.0), 15);
        assert_eq!(score_of(&lagers(&[0, 45, 90, 135, 180]), 0.0), 25);
    }

    #[test]
    fn test_pace_points() {
        let pace = |gap: i64| {
            let events = lagers(&[0, gap]);
            pace_points(&RiskContext::new(&events, 0.0, now(), default_window()))
        };
        assert_eq!(pace(10), 20);
        assert_eq!(pace(15), 10);
        assert_eq!(pace(29), 10);
        assert_eq!(pace(30), 5);
        assert_eq!(pace(44), 5);
        assert_eq!(pace(45), 0);
    }

    #[test]
    fn test_mean_gap_ignores_input_order() {
        let events = lagers(&[60, 0, 30]);
        let ctx = RiskContext::new(&events, 0.0, now(), default_window());
        assert_eq!(ctx.mean_gap_minutes(), Some(30.0));
        assert_eq!(ctx.recent[0].timestamp, now());
    }

    #[test]
    fn test_double_points() {
        let one_double = vec![event("Gin Tonic", 0, true)];
        let two_doubles = vec![event("Gin Tonic", 0, true), event("Gin Tonic", 60, true)];
        assert_eq!(score_of(&one_double, 0.0), 5);
        // 2 events (5) + 2 doubles (10)
        assert_eq!(score_of(&two_doubles, 0.0), 15);
    }

    #[test]
    fn test_high_alcohol_is_case_sensitive() {
        let strong = vec![event("Vodka Soda", 0, false), event("Rum & Coke", 60, false)];
        let lowercase = vec![event("vodka soda", 0, false), event("rum & coke", 60, false)];
        // 2 events (5) + 2 high-alcohol (5)
        assert_eq!(score_of(&strong, 0.0), 10);
        assert_eq!(score_of(&lowercase, 0.0), 5);
    }

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(24), RiskLevel::Safe);
        assert_eq!(RiskLevel::from_score(25), RiskLevel::Caution);
        assert_eq!(RiskLevel::from_score(49), RiskLevel::Caution);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::Risky);
        assert_eq!(RiskLevel::from_score(130), RiskLevel::Risky);
    }

    #[test]
    fn test_exact_scores_classify_on_boundary() {
        // BAC 0.05 alone: 25 points
        let caution = lagers(&[10]);
        let a = assess(&caution, 0.05, now(), default_window());
        assert_eq!(a.score, 25);
        assert_eq!(a.level, RiskLevel::Caution);

        // BAC 0.08 (40) + two slow events (5) + one double (5)
        let risky = vec![event("Lager", 0, true), event("Lager", 60, false)];
        let a = assess(&risky, 0.08, now(), default_window());
        assert_eq!(a.score, 50);
        assert_eq!(a.level, RiskLevel::Risky);
    }

    #[test]
    fn test_classify_agrees_with_assess() {
        let fixtures = vec![
            (lagers(&[10]), 0.05),
            (lagers(&[10]), 0.049),
            (vec![event("Lager", 0, true), event("Lager", 60, false)], 0.08),
            (vec![event("Lager", 0, true), event("Lager", 60, false)], 0.079),
            (lagers(&[0, 10, 20, 30, 40]), 0.0),
        ];

        for (events, bac) in &fixtures {
            assert_eq!(
                classify(events, *bac, now(), default_window()),
                assess(events, *bac, now(), default_window()).level,
                "bac {bac}"
            );
        }
    }

    #[test]
    fn test_classify_empty_window_is_safe() {
        assert_eq!(classify(&[], 0.3, now(), default_window()), RiskLevel::Safe);

        // In the 3 hour window but not the 1 hour one
        let events = vec![event("Vodka", 90, true), event("Vodka", 100, true)];
        assert_eq!(
            classify(&events, 0.1, now(), default_window()),
            RiskLevel::Risky
        );
        assert_eq!(
            classify(&events, 0.1, now(), Duration::hours(1)),
            RiskLevel::Safe
        );
    }

    #[test]
    fn test_narrow_window_drops_older_events() {
        let events = lagers(&[0, 50, 100, 130, 160]);

        // 3h: BAC (10) + 5 events (25) + 40 min pace (5)
        let wide = assess(&events, 0.03, now(), default_window());
        assert_eq!(wide.score, 40);
        assert_eq!(wide.level, RiskLevel::Caution);

        // 1h: BAC (10) + 2 events (5), 50 min pace scores nothing
        let narrow = assess(&events, 0.03, now(), Duration::hours(1));
        assert_eq!(narrow.score, 15);
        assert_eq!(narrow.level, RiskLevel::Safe);
        assert_eq!(
            classify(&events, 0.03, now(), Duration::hours(1)),
            RiskLevel::Safe
        );
    }

    #[test]
    fn test_score_monotone_in_each_factor() {
        let base = lagers(&[0, 60]);
        let base_score = score_of(&base, 0.02);

        // Higher BAC
        assert!(score_of(&base, 0.06) >= base_score);
        // More events
        assert!(score_of(&lagers(&[0, 60, 120]), 0.02) >= base_score);
        // Faster pace
        assert!(score_of(&lagers(&[0, 20]), 0.02) >= base_score);
        // A double
        let with_double = vec![event("Lager", 0, true), event("Lager", 60, false)];
        assert!(score_of(&with_double, 0.02) >= base_score);
        // High-alcohol names
        let strong = vec![event("Whiskey", 0, false), event("Tequila", 60, false)];
        assert!(score_of(&strong, 0.02) >= base_score);

        let mut previous = 0;
        for bac in [0.0, 0.029, 0.03, 0.049, 0.05, 0.079, 0.08, 0.2] {
            let s = score_of(&base, bac);
            assert!(s >= previous, "score dropped at bac {bac}");
            previous = s;
        }
    }

    #[test]
    fn test_insights() {
        let fast_doubles = vec![
            event("Vodka", 0, true),
            event("Vodka", 10, true),
            event("Vodka", 20, false),
        ];
        let found = insights(&fast_doubles, 0.09, now());
        assert_eq!(
            found,
            vec![
                "Drinking faster than recommended pace",
                "Multiple double shots increase risk",
                "BAC is above legal driving limit in most regions",
            ]
        );

        let slow = lagers(&[0, 25]);
        assert_eq!(
            insights(&slow, 0.05, now()),
            vec!["Approaching legal limit - avoid driving"]
        );
        assert!(insights(&slow, 0.049, now()).is_empty());
    }

    #[test]
    fn test_pace_insight_threshold_differs_from_score() {
        // 19 min: insight fires and scores 10; 20 min: no insight, still scores 10
        let nineteen = lagers(&[0, 19]);
        let twenty = lagers(&[0, 20]);
        assert_eq!(insights(&nineteen, 0.0, now()).len(), 1);
        assert!(insights(&twenty, 0.0, now()).is_empty());
        assert_eq!(score_of(&nineteen, 0.0), score_of(&twenty, 0.0));
    }

    #[test]
    fn test_level_presentation() {
        assert_eq!(RiskLevel::Safe.message(), "Pace looks good");
        assert_eq!(RiskLevel::Caution.message(), "Consider slowing down");
        assert_eq!(RiskLevel::Risky.message(), "High-risk pattern detected");
        assert_eq!(RiskLevel::Risky.label(), "Risky");
        assert_eq!(RiskLevel::Caution.rgb(), (1.0, 0.7, 0.0));
        assert!(!RiskLevel::Safe.icon().is_empty());
    }
}
