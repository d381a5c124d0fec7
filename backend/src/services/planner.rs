//! Reminder planner
//!
//! Keeps delivery in sync with the ledger. Every replan cancels all owned
//! notifications and schedules the freshly computed set. Replans queue
//! behind one lock and read the ledger only once they hold it, so the last
//! replan to run always reflects the latest state.

use crate::ledger::CareLedger;
use crate::notifications::NotificationScheduler;
use chrono::{DateTime, FixedOffset, Utc};
use pet_care_shared::models::{CareTask, DietAlert, MealRecord, PetProfile};
use pet_care_shared::schedule::{
    diet_alert_notice, plan_reminders, NotificationKind, OverdueKey, PlanInputs, ScheduleContext,
};
use pet_care_shared::NotificationPreferences;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Outcome of one planning pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanReport {
    pub cancelled: usize,
    pub scheduled: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Ledger data a replan works from
struct PlanSnapshot {
    pets: Vec<PetProfile>,
    tasks: Vec<CareTask>,
    meals: Vec<MealRecord>,
    preferences: NotificationPreferences,
}

impl PlanSnapshot {
    fn of(ledger: &CareLedger) -> Self {
        Self {
            pets: ledger.pets.clone(),
            tasks: ledger.tasks.clone(),
            meals: ledger.meals.clone(),
            preferences: ledger.preferences.clone(),
        }
    }
}

#[derive(Default)]
struct PlannerState {
    /// Overdue occurrences already announced
    announced_overdue: HashSet<OverdueKey>,
}

pub struct ReminderPlanner {
    scheduler: Arc<dyn NotificationScheduler>,
    offset: FixedOffset,
    serial: Mutex<PlannerState>,
}

impl ReminderPlanner {
    pub fn new(scheduler: Arc<dyn NotificationScheduler>, offset: FixedOffset) -> Self {
        Self {
            scheduler,
            offset,
            serial: Mutex::new(PlannerState::default()),
        }
    }

    /// Replan against the current ledger state
    pub async fn replan(&self, ledger: &Mutex<CareLedger>) -> PlanReport {
        self.replan_at(ledger, Utc::now()).await
    }

    /// Replan as of `now`
    pub async fn replan_at(&self, ledger: &Mutex<CareLedger>, now: DateTime<Utc>) -> PlanReport {
        let mut state = self.serial.lock().await;
        let snapshot = PlanSnapshot::of(&*ledger.lock().await);
        let ctx = ScheduleContext::new(now, self.offset);

        let mut report = PlanReport::default();
        self.cancel_owned(&mut report).await;

        let plan = plan_reminders(
            PlanInputs {
                pets: &snapshot.pets,
                tasks: &snapshot.tasks,
                meals: &snapshot.meals,
                preferences: &snapshot.preferences,
            },
            &ctx,
            &state.announced_overdue,
        );
        report.skipped = plan.skipped.len();

        for request in plan.requests {
            let kind = request.kind();
            let overdue_key = match (kind, request.data.task_id) {
                (NotificationKind::CareOverdue, Some(task_id)) => snapshot
                    .tasks
                    .iter()
                    .find(|t| t.id == task_id)
                    .map(|t| (t.id, t.due_at)),
                _ => None,
            };

            match self.scheduler.schedule(request).await {
                Ok(id) => {
                    debug!(id = %id, kind = %kind, "Reminder scheduled");
                    metrics::counter!("pet_care_notifications_scheduled_total", "kind" => kind.as_str())
                        .increment(1);
                    report.scheduled += 1;
                    if let Some(key) = overdue_key {
                        state.announced_overdue.insert(key);
                    }
                }
                Err(e) => {
                    warn!(kind = %kind, error = %e, "Failed to schedule reminder");
                    metrics::counter!("pet_care_notification_failures_total", "op" => "schedule")
                        .increment(1);
                    report.failed += 1;
                }
            }
        }

        // Forget occurrences that can no longer fire
        state.announced_overdue.retain(|(task_id, due_at)| {
            snapshot
                .tasks
                .iter()
                .any(|t| t.id == *task_id && t.due_at == *due_at && t.is_open())
        });

        info!(
            cancelled = report.cancelled,
            scheduled = report.scheduled,
            skipped = report.skipped,
            failed = report.failed,
            "Reminders replanned"
        );
        report
    }

    async fn cancel_owned(&self, report: &mut PlanReport) {
        let scheduled = match self.scheduler.list_scheduled().await {
            Ok(scheduled) => scheduled,
            Err(e) => {
                warn!(error = %e, "Failed to list scheduled notifications");
                metrics::counter!("pet_care_notification_failures_total", "op" => "list").increment(1);
                report.failed += 1;
                return;
            }
        };

        for notification in scheduled.iter().filter(|n| n.request.kind().is_replanned()) {
            match self.scheduler.cancel(&notification.id).await {
                Ok(()) => report.cancelled += 1,
                Err(e) => {
                    warn!(id = %notification.id, error = %e, "Failed to cancel notification");
                    metrics::counter!("pet_care_notification_failures_total", "op" => "cancel")
                        .increment(1);
                    report.failed += 1;
                }
            }
        }
    }

    /// Deliver notices for alerts raised this turn. Not replanned later.
    pub async fn announce_diet_alerts(
        &self,
        alerts: &[DietAlert],
        pet_name: &str,
        preferences: &NotificationPreferences,
    ) -> PlanReport {
        let mut report = PlanReport::default();

        for alert in alerts {
            let notice = match diet_alert_notice(alert, pet_name, preferences) {
                Ok(notice) => notice,
                Err(reason) => {
                    debug!(alert_id = %alert.id, ?reason, "Diet alert notice skipped");
                    report.skipped += 1;
                    continue;
                }
            };

            match self.scheduler.schedule(notice).await {
                Ok(_) => {
                    metrics::counter!("pet_care_notifications_scheduled_total", "kind" => "diet-alert")
                        .increment(1);
                    report.scheduled += 1;
                }
                Err(e) => {
                    warn!(alert_id = %alert.id, error = %e, "Failed to deliver diet alert");
                    metrics::counter!("pet_care_notification_failures_total", "op" => "schedule")
                        .increment(1);
                    report.failed += 1;
                }
            }
        }

        report
    }
}
