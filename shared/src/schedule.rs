//! Reminder timing rules
//!
//! Pure functions deciding whether a local notification should exist for a
//! care task, a meal or a diet alert, and when it should fire. Delivery is
//! someone else's job; these functions only produce
//! [`NotificationRequest`]s.

use crate::models::{AlertSeverity, CareTask, DietAlert, MealRecord, PetProfile, Priority};
use crate::preferences::NotificationPreferences;
use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

/// Notification class, carried in the payload as `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    Care,
    CareOverdue,
    Meal,
    MealMissed,
    DietAlert,
}

impl NotificationKind {
    /// Kinds cancelled and replanted on every change.
    ///
    /// Diet alerts are fire-and-forget.
    pub fn is_replanned(&self) -> bool {
        !matches!(self, NotificationKind::DietAlert)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Care => "care",
            NotificationKind::CareOverdue => "care-overdue",
            NotificationKind::Meal => "meal",
            NotificationKind::MealMissed => "meal-missed",
            NotificationKind::DietAlert => "diet-alert",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    #[default]
    Default,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationChannel {
    #[default]
    Default,
    Urgent,
}

/// Opaque data payload attached to a notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationData {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub pet_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<Uuid>,
}

/// What should be shown, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
    pub data: NotificationData,
    /// `None` delivers immediately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fire_at: Option<DateTime<Utc>>,
    pub priority: NotificationPriority,
    pub channel: NotificationChannel,
}

impl NotificationRequest {
    pub fn kind(&self) -> NotificationKind {
        self.data.kind
    }

    pub fn is_immediate(&self) -> bool {
        self.fire_at.is_none()
    }
}

/// Why a candidate notification was not produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Global switch is off
    Disabled,
    /// The category's switch is off
    CategoryOff,
    /// Fire instant is already past
    InPast,
    /// Fire instant lands in quiet hours
    QuietHours,
    /// Referenced pet is not in the registry
    UnknownPet,
    /// Overdue announcement was already delivered
    AlreadyDelivered,
}

/// Evaluation instant plus the owner's UTC offset, which defines "today"
#[derive(Debug, Clone, Copy)]
pub struct ScheduleContext {
    pub now: DateTime<Utc>,
    pub offset: FixedOffset,
}

impl ScheduleContext {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }

    pub fn utc(now: DateTime<Utc>) -> Self {
        Self::new(now, Utc.fix())
    }

    /// Whether `instant` falls on the same local calendar day as `now`
    pub fn is_today(&self, instant: DateTime<Utc>) -> bool {
        instant.with_timezone(&self.offset).date_naive()
            == self.now.with_timezone(&self.offset).date_naive()
    }

    pub fn local_time(&self, instant: DateTime<Utc>) -> NaiveTime {
        instant.with_timezone(&self.offset).time()
    }
}

/// Identifies one overdue occurrence of a task
pub type OverdueKey = (Uuid, DateTime<Utc>);

/// Render a minute offset the way notification bodies phrase it
pub fn describe_lead_time(minutes: u32) -> String {
    match minutes {
        1 => "1 minute".to_string(),
        60 => "1 hour".to_string(),
        m if m % 60 == 0 => format!("{} hours", m / 60),
        m => format!("{} minutes", m),
    }
}

fn gate(preferences: &NotificationPreferences, category_on: bool) -> Result<(), SkipReason> {
    if !preferences.enabled {
        return Err(SkipReason::Disabled);
    }
    if !category_on {
        return Err(SkipReason::CategoryOff);
    }
    Ok(())
}

fn timed(
    fire_at: DateTime<Utc>,
    preferences: &NotificationPreferences,
    ctx: &ScheduleContext,
) -> Result<DateTime<Utc>, SkipReason> {
    if fire_at <= ctx.now {
        return Err(SkipReason::InPast);
    }
    if let Some(quiet) = preferences.quiet_hours() {
        if quiet.contains(ctx.local_time(fire_at)) {
            return Err(SkipReason::QuietHours);
        }
    }
    Ok(fire_at)
}

/// Reminder ahead of an upcoming care task
pub fn care_reminder(
    task: &CareTask,
    pet_name: &str,
    preferences: &NotificationPreferences,
    ctx: &ScheduleContext,
) -> Result<NotificationRequest, SkipReason> {
    gate(preferences, preferences.care_reminders)?;

    let lead = preferences.care_reminder_minutes;
    let fire_at = timed(task.due_at - Duration::minutes(lead as i64), preferences, ctx)?;
    let high = task.priority == Priority::High;

    Ok(NotificationRequest {
        title: format!("{} {}", task.category.icon(), task.title),
        body: format!("Due in {} for {}", describe_lead_time(lead), pet_name),
        data: NotificationData {
            kind: NotificationKind::Care,
            pet_id: task.pet_id,
            task_id: Some(task.id),
            meal_id: None,
            alert_id: None,
        },
        fire_at: Some(fire_at),
        priority: if high { NotificationPriority::High } else { NotificationPriority::Default },
        channel: if high { NotificationChannel::Urgent } else { NotificationChannel::Default },
    })
}

/// Immediate notice for a task whose due instant has passed
pub fn overdue_notice(
    task: &CareTask,
    pet_name: &str,
    preferences: &NotificationPreferences,
) -> Result<NotificationRequest, SkipReason> {
    gate(preferences, preferences.care_overdue)?;

    Ok(NotificationRequest {
        title: format!("⚠️ Overdue: {}", task.title),
        body: format!("This care task is overdue for {}", pet_name),
        data: NotificationData {
            kind: NotificationKind::CareOverdue,
            pet_id: task.pet_id,
            task_id: Some(task.id),
            meal_id: None,
            alert_id: None,
        },
        fire_at: None,
        priority: NotificationPriority::High,
        channel: NotificationChannel::Urgent,
    })
}

/// Reminder ahead of a planned meal
pub fn meal_reminder(
    meal: &MealRecord,
    pet_name: &str,
    preferences: &NotificationPreferences,
    ctx: &ScheduleContext,
) -> Result<NotificationRequest, SkipReason> {
    gate(preferences, preferences.meal_reminders)?;

    let lead = preferences.meal_reminder_minutes;
    let fire_at = timed(meal.scheduled_at - Duration::minutes(lead as i64), preferences, ctx)?;

    Ok(NotificationRequest {
        title: format!("🍽️ {} Time", meal.meal_type.label()),
        body: format!(
            "{}'s {} in {} - {}",
            pet_name,
            meal.meal_type,
            describe_lead_time(lead),
            meal.food
        ),
        data: NotificationData {
            kind: NotificationKind::Meal,
            pet_id: meal.pet_id,
            task_id: None,
            meal_id: Some(meal.id),
            alert_id: None,
        },
        fire_at: Some(fire_at),
        priority: NotificationPriority::Default,
        channel: NotificationChannel::Default,
    })
}

/// Follow-up asking whether a meal happened
pub fn missed_meal_check(
    meal: &MealRecord,
    pet_name: &str,
    preferences: &NotificationPreferences,
    ctx: &ScheduleContext,
) -> Result<NotificationRequest, SkipReason> {
    gate(preferences, preferences.missed_meals)?;

    let delay = preferences.missed_meal_minutes;
    let fire_at = timed(meal.scheduled_at + Duration::minutes(delay as i64), preferences, ctx)?;

    Ok(NotificationRequest {
        title: "⏰ Missed Meal Alert".to_string(),
        body: format!("Did {} have their {}?", pet_name, meal.meal_type),
        data: NotificationData {
            kind: NotificationKind::MealMissed,
            pet_id: meal.pet_id,
            task_id: None,
            meal_id: Some(meal.id),
            alert_id: None,
        },
        fire_at: Some(fire_at),
        priority: NotificationPriority::High,
        channel: NotificationChannel::Default,
    })
}

/// Immediate notice for a freshly raised diet alert
pub fn diet_alert_notice(
    alert: &DietAlert,
    pet_name: &str,
    preferences: &NotificationPreferences,
) -> Result<NotificationRequest, SkipReason> {
    gate(preferences, preferences.diet_alerts)?;
    if !alert.is_live() {
        return Err(SkipReason::AlreadyDelivered);
    }

    let urgent = alert.severity == AlertSeverity::Urgent;
    Ok(NotificationRequest {
        title: if urgent { "🚨 Urgent Diet Alert" } else { "⚠️ Diet Alert" }.to_string(),
        body: format!("{}: {}", pet_name, alert.message),
        data: NotificationData {
            kind: NotificationKind::DietAlert,
            pet_id: alert.pet_id,
            task_id: None,
            meal_id: None,
            alert_id: Some(alert.id),
        },
        fire_at: None,
        priority: if urgent { NotificationPriority::High } else { NotificationPriority::Default },
        channel: if urgent { NotificationChannel::Urgent } else { NotificationChannel::Default },
    })
}

/// Everything the planner reads
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    pub pets: &'a [PetProfile],
    pub tasks: &'a [CareTask],
    pub meals: &'a [MealRecord],
    pub preferences: &'a NotificationPreferences,
}

/// Output of a full planning pass
#[derive(Debug, Clone, Default)]
pub struct ReminderPlan {
    pub requests: Vec<NotificationRequest>,
    pub skipped: Vec<SkipReason>,
}

impl ReminderPlan {
    fn push(&mut self, candidate: Result<NotificationRequest, SkipReason>) {
        match candidate {
            Ok(request) => self.requests.push(request),
            Err(reason) => self.skipped.push(reason),
        }
    }
}

/// Compute every replanned notification from scratch.
///
/// `delivered_overdue` lists overdue occurrences already announced; they
/// are not announced again.
pub fn plan_reminders(
    inputs: PlanInputs<'_>,
    ctx: &ScheduleContext,
    delivered_overdue: &HashSet<OverdueKey>,
) -> ReminderPlan {
    let mut plan = ReminderPlan::default();
    let pet_name = |pet_id: Uuid| {
        inputs
            .pets
            .iter()
            .find(|p| p.id == pet_id)
            .map(|p| p.name.as_str())
    };

    for task in inputs.tasks.iter().filter(|t| t.is_open()) {
        let Some(name) = pet_name(task.pet_id) else {
            plan.skipped.push(SkipReason::UnknownPet);
            continue;
        };

        if task.due_at > ctx.now {
            plan.push(care_reminder(task, name, inputs.preferences, ctx));
        } else if delivered_overdue.contains(&(task.id, task.due_at)) {
            plan.skipped.push(SkipReason::AlreadyDelivered);
        } else {
            plan.push(overdue_notice(task, name, inputs.preferences));
        }
    }

    let todays_open_meals = inputs
        .meals
        .iter()
        .filter(|m| !m.completed && ctx.is_today(m.scheduled_at));

    for meal in todays_open_meals {
        let Some(name) = pet_name(meal.pet_id) else {
            plan.skipped.push(SkipReason::UnknownPet);
            continue;
        };

        plan.push(meal_reminder(meal, name, inputs.preferences, ctx));
        plan.push(missed_meal_check(meal, name, inputs.preferences, ctx));
    }

    plan
}
