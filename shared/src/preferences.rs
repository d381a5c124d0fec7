//! Notification preferences
//!
//! A single flat record per installation. Stored documents are merged
//! over [`NotificationPreferences::default`] so fields added later pick
//! up their defaults.

use crate::validation::{parse_clock_time, validate_offset_minutes};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Default lead time for upcoming care reminders
pub const DEFAULT_CARE_REMINDER_MINUTES: u32 = 60;
/// Default lead time for meal reminders
pub const DEFAULT_MEAL_REMINDER_MINUTES: u32 = 15;
/// Default delay after a meal's scheduled time before a missed-meal check
pub const DEFAULT_MISSED_MEAL_MINUTES: u32 = 30;

/// Which classes of notification the owner wants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    /// Global toggle
    pub enabled: bool,

    pub care_reminders: bool,
    pub care_overdue: bool,
    pub meal_reminders: bool,
    pub missed_meals: bool,
    pub diet_alerts: bool,

    pub care_reminder_minutes: u32,
    pub meal_reminder_minutes: u32,
    pub missed_meal_minutes: u32,

    pub quiet_hours_enabled: bool,
    /// "HH:MM"
    pub quiet_hours_start: String,
    /// "HH:MM"
    pub quiet_hours_end: String,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            care_reminders: true,
            care_overdue: true,
            meal_reminders: true,
            missed_meals: true,
            diet_alerts: true,
            care_reminder_minutes: DEFAULT_CARE_REMINDER_MINUTES,
            meal_reminder_minutes: DEFAULT_MEAL_REMINDER_MINUTES,
            missed_meal_minutes: DEFAULT_MISSED_MEAL_MINUTES,
            quiet_hours_enabled: false,
            quiet_hours_start: "22:00".to_string(),
            quiet_hours_end: "08:00".to_string(),
        }
    }
}

/// Partial update applied by the settings screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesPatch {
    pub enabled: Option<bool>,
    pub care_reminders: Option<bool>,
    pub care_overdue: Option<bool>,
    pub meal_reminders: Option<bool>,
    pub missed_meals: Option<bool>,
    pub diet_alerts: Option<bool>,
    pub care_reminder_minutes: Option<u32>,
    pub meal_reminder_minutes: Option<u32>,
    pub missed_meal_minutes: Option<u32>,
    pub quiet_hours_enabled: Option<bool>,
    pub quiet_hours_start: Option<String>,
    pub quiet_hours_end: Option<String>,
}

impl NotificationPreferences {
    /// Return the preferences with `patch` applied on top.
    pub fn merged(&self, patch: &PreferencesPatch) -> Result<Self, String> {
        let merged = Self {
            enabled: patch.enabled.unwrap_or(self.enabled),
            care_reminders: patch.care_reminders.unwrap_or(self.care_reminders),
            care_overdue: patch.care_overdue.unwrap_or(self.care_overdue),
            meal_reminders: patch.meal_reminders.unwrap_or(self.meal_reminders),
            missed_meals: patch.missed_meals.unwrap_or(self.missed_meals),
            diet_alerts: patch.diet_alerts.unwrap_or(self.diet_alerts),
            care_reminder_minutes: patch.care_reminder_minutes.unwrap_or(self.care_reminder_minutes),
            meal_reminder_minutes: patch.meal_reminder_minutes.unwrap_or(self.meal_reminder_minutes),
            missed_meal_minutes: patch.missed_meal_minutes.unwrap_or(self.missed_meal_minutes),
            quiet_hours_enabled: patch.quiet_hours_enabled.unwrap_or(self.quiet_hours_enabled),
            quiet_hours_start: patch
                .quiet_hours_start
                .clone()
                .unwrap_or_else(|| self.quiet_hours_start.clone()),
            quiet_hours_end: patch
                .quiet_hours_end
                .clone()
                .unwrap_or_else(|| self.quiet_hours_end.clone()),
        };
        merged.validate()?;
        Ok(merged)
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_offset_minutes(self.care_reminder_minutes)?;
        validate_offset_minutes(self.meal_reminder_minutes)?;
        validate_offset_minutes(self.missed_meal_minutes)?;
        parse_clock_time(&self.quiet_hours_start)?;
        parse_clock_time(&self.quiet_hours_end)?;
        Ok(())
    }

    /// Quiet window as clock times, if enabled and well formed
    pub fn quiet_hours(&self) -> Option<QuietHours> {
        if !self.quiet_hours_enabled {
            return None;
        }
        let start = parse_clock_time(&self.quiet_hours_start).ok()?;
        let end = parse_clock_time(&self.quiet_hours_end).ok()?;
        Some(QuietHours { start, end })
    }
}

/// Half-open local-time window `[start, end)`; wraps past midnight when
/// `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl QuietHours {
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start == self.end {
            return false;
        }
        if self.start < self.end {
            time >= self.start && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let prefs = NotificationPreferences::default();
        assert!(prefs.enabled);
        assert!(prefs.care_reminders && prefs.care_overdue);
        assert!(prefs.meal_reminders && prefs.missed_meals && prefs.diet_alerts);
        assert_eq!(prefs.care_reminder_minutes, 60);
        assert_eq!(prefs.meal_reminder_minutes, 15);
        assert_eq!(prefs.missed_meal_minutes, 30);
        assert!(prefs.quiet_hours().is_none());
    }

    #[test]
    fn test_stored_document_is_merged_over_defaults() {
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"{"enabled": false, "diet_alerts": false}"#).unwrap();
        assert!(!prefs.enabled);
        assert!(!prefs.diet_alerts);
        assert!(prefs.care_reminders);
        assert_eq!(prefs.meal_reminder_minutes, 15);
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let prefs = NotificationPreferences::default();
        let patch = PreferencesPatch {
            meal_reminders: Some(false),
            quiet_hours_enabled: Some(true),
            ..Default::default()
        };
        let merged = prefs.merged(&patch).unwrap();
        assert!(!merged.meal_reminders);
        assert!(merged.quiet_hours_enabled);
        assert!(merged.missed_meals);
    }

    #[test]
    fn test_patch_rejects_bad_clock_time() {
        let patch = PreferencesPatch {
            quiet_hours_start: Some("25:00".to_string()),
            ..Default::default()
        };
        assert!(NotificationPreferences::default().merged(&patch).is_err());
    }

    #[rstest]
    #[case(t(23, 0), true)]
    #[case(t(2, 30), true)]
    #[case(t(7, 59), true)]
    #[case(t(8, 0), false)]
    #[case(t(12, 0), false)]
    #[case(t(22, 0), true)]
    fn test_quiet_hours_wrapping_midnight(#[case] time: NaiveTime, #[case] quiet: bool) {
        let window = QuietHours { start: t(22, 0), end: t(8, 0) };
        assert_eq!(window.contains(time), quiet);
    }

    #[rstest]
    #[case(t(12, 59), false)]
    #[case(t(13, 0), true)]
    #[case(t(14, 59), true)]
    #[case(t(15, 0), false)]
    fn test_quiet_hours_same_day(#[case] time: NaiveTime, #[case] quiet: bool) {
        let window = QuietHours { start: t(13, 0), end: t(15, 0) };
        assert_eq!(window.contains(time), quiet);
    }
}
