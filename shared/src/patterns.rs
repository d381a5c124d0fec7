//! Diet pattern detection
//!
//! Scans a pet's trailing 7-day meal history for recurring refusals,
//! partially eaten meals and skipped meals, and raises severity-graded
//! [`DietAlert`]s.
//!
//! Counts always include the outcome being logged right now, since the
//! triggering meal is not yet part of the history handed in.

use crate::models::{
    AlertSeverity, DietAlert, DietAlertType, MealOutcome, MealRecord, MealStatus,
};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Length of the rolling window in days
pub const WINDOW_DAYS: i64 = 7;

/// Warning/urgent thresholds for one pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    pub warning: u32,
    pub urgent: u32,
}

impl Threshold {
    /// Severity for `count`, or `None` below the warning threshold
    pub fn severity(&self, count: u32) -> Option<AlertSeverity> {
        if count >= self.urgent {
            Some(AlertSeverity::Urgent)
        } else if count >= self.warning {
            Some(AlertSeverity::Warning)
        } else {
            None
        }
    }
}

impl DietAlertType {
    /// Fixed thresholds per pattern
    pub fn threshold(&self) -> Threshold {
        match self {
            DietAlertType::RepeatedRefusal => Threshold { warning: 3, urgent: 5 },
            DietAlertType::RepeatedPartial => Threshold { warning: 4, urgent: 6 },
            DietAlertType::RepeatedSkip => Threshold { warning: 3, urgent: 5 },
        }
    }

    fn message(&self, count: u32) -> String {
        match self {
            DietAlertType::RepeatedRefusal => format!(
                "{} refused meals in the last {} days. Consider reviewing diet or consulting vet.",
                count, WINDOW_DAYS
            ),
            DietAlertType::RepeatedPartial => format!(
                "{} partially eaten meals in the last {} days. Pet may not like current food.",
                count, WINDOW_DAYS
            ),
            DietAlertType::RepeatedSkip => format!(
                "{} skipped meals in the last {} days. Ensure consistent feeding schedule.",
                count, WINDOW_DAYS
            ),
        }
    }
}

/// Pattern counts over a window, in-flight outcome included
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternCounts {
    pub refused: u32,
    pub partial: u32,
    pub skipped: u32,
}

impl PatternCounts {
    pub fn get(&self, alert_type: DietAlertType) -> u32 {
        match alert_type {
            DietAlertType::RepeatedRefusal => self.refused,
            DietAlertType::RepeatedPartial => self.partial,
            DietAlertType::RepeatedSkip => self.skipped,
        }
    }

    fn record(&mut self, status: Option<MealStatus>, partial: bool) {
        match status {
            Some(MealStatus::Refused) => self.refused += 1,
            Some(MealStatus::Skipped) => self.skipped += 1,
            _ => {}
        }
        if partial {
            self.partial += 1;
        }
    }
}

/// Completed meals for `pet_id` scheduled within the trailing window.
///
/// `exclude` drops the meal currently being logged so it is not counted
/// twice.
pub fn recent_history<'a>(
    meals: &'a [MealRecord],
    pet_id: Uuid,
    now: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> impl Iterator<Item = &'a MealRecord> + 'a {
    let window_start = now - Duration::days(WINDOW_DAYS);
    meals.iter().filter(move |m| {
        m.pet_id == pet_id
            && m.completed
            && m.scheduled_at >= window_start
            && Some(m.id) != exclude
    })
}

/// Count patterns over `history` plus the in-flight `outcome`
pub fn count_patterns<'a>(
    history: impl IntoIterator<Item = &'a MealRecord>,
    outcome: &MealOutcome,
) -> PatternCounts {
    let mut counts = PatternCounts::default();
    for meal in history {
        counts.record(
            meal.status,
            meal.portion_adjustment.is_some_and(|p| p.is_partial()),
        );
    }
    counts.record(
        Some(outcome.status),
        outcome.portion_adjustment.is_some_and(|p| p.is_partial()),
    );
    counts
}

/// Rule-based diet pattern detector
pub struct DietPatternDetector;

impl DietPatternDetector {
    const PATTERNS: [DietAlertType; 3] = [
        DietAlertType::RepeatedRefusal,
        DietAlertType::RepeatedPartial,
        DietAlertType::RepeatedSkip,
    ];

    /// Decide which alerts newly fire for `pet_id`.
    ///
    /// `meals` may contain any pets' meals; only completed meals of this pet
    /// inside the 7-day window count. A pattern only fires when no live
    /// alert of the same (pet, type) exists in `alerts`.
    pub fn evaluate(
        pet_id: Uuid,
        in_flight_meal: Option<Uuid>,
        outcome: &MealOutcome,
        meals: &[MealRecord],
        alerts: &[DietAlert],
        now: DateTime<Utc>,
    ) -> Vec<DietAlert> {
        let counts = count_patterns(recent_history(meals, pet_id, now, in_flight_meal), outcome);
        Self::alerts_for_counts(pet_id, counts, alerts, now)
    }

    /// Turn window counts into new alerts, honouring live alerts
    pub fn alerts_for_counts(
        pet_id: Uuid,
        counts: PatternCounts,
        alerts: &[DietAlert],
        now: DateTime<Utc>,
    ) -> Vec<DietAlert> {
        Self::PATTERNS
            .iter()
            .filter_map(|&alert_type| {
                let count = counts.get(alert_type);
                let severity = alert_type.threshold().severity(count)?;

                let already_live = alerts
                    .iter()
                    .any(|a| a.pet_id == pet_id && a.alert_type == alert_type && a.is_live());
                if already_live {
                    return None;
                }

                Some(DietAlert {
                    id: Uuid::new_v4(),
                    pet_id,
                    alert_type,
                    severity,
                    message: alert_type.message(count),
                    occurrences: count,
                    last_occurrence: now,
                    dismissed: false,
                })
            })
            .collect()
    }
}
