//! In-process notification outbox
//!
//! Timed notifications wait in a schedule list; immediate ones go straight
//! to the delivered log. Clients poll both over HTTP.

use super::{DeliveryError, NotificationScheduler, ScheduledNotification};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pet_care_shared::NotificationRequest;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Most delivered entries kept
const DELIVERED_LOG_CAPACITY: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredNotification {
    pub id: String,
    pub delivered_at: DateTime<Utc>,
    #[serde(flatten)]
    pub request: NotificationRequest,
}

#[derive(Default)]
struct Outbox {
    scheduled: Vec<ScheduledNotification>,
    delivered: Vec<DeliveredNotification>,
}

#[derive(Default)]
pub struct InMemoryScheduler {
    outbox: RwLock<Outbox>,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Immediate notifications, newest first
    pub async fn delivered(&self) -> Vec<DeliveredNotification> {
        self.outbox.read().await.delivered.iter().rev().cloned().collect()
    }

    /// Pending timed notifications ordered by fire time
    pub async fn pending(&self) -> Vec<ScheduledNotification> {
        let mut pending = self.outbox.read().await.scheduled.clone();
        pending.sort_by_key(|n| n.request.fire_at);
        pending
    }
}

#[async_trait]
impl NotificationScheduler for InMemoryScheduler {
    async fn schedule(&self, request: NotificationRequest) -> Result<String, DeliveryError> {
        let id = Uuid::new_v4().to_string();
        let mut outbox = self.outbox.write().await;

        if request.is_immediate() {
            debug!(id = %id, kind = %request.kind(), "Delivering notification");
            outbox.delivered.push(DeliveredNotification {
                id: id.clone(),
                delivered_at: Utc::now(),
                request,
            });
            let overflow = outbox.delivered.len().saturating_sub(DELIVERED_LOG_CAPACITY);
            outbox.delivered.drain(..overflow);
        } else {
            debug!(id = %id, kind = %request.kind(), fire_at = ?request.fire_at, "Scheduling notification");
            outbox.scheduled.push(ScheduledNotification {
                id: id.clone(),
                request,
            });
        }

        Ok(id)
    }

    async fn cancel(&self, id: &str) -> Result<(), DeliveryError> {
        let mut outbox = self.outbox.write().await;
        let before = outbox.scheduled.len();
        outbox.scheduled.retain(|n| n.id != id);

        if outbox.scheduled.len() == before {
            return Err(DeliveryError::UnknownId(id.to_string()));
        }
        Ok(())
    }

    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, DeliveryError> {
        Ok(self.outbox.read().await.scheduled.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pet_care_shared::schedule::{
        NotificationChannel, NotificationData, NotificationKind, NotificationPriority,
    };

    fn request(kind: NotificationKind, fire_at: Option<DateTime<Utc>>) -> NotificationRequest {
        NotificationRequest {
            title: "Title".to_string(),
            body: "Body".to_string(),
            data: NotificationData {
                kind,
                pet_id: Uuid::new_v4(),
                task_id: None,
                meal_id: None,
                alert_id: None,
            },
            fire_at,
            priority: NotificationPriority::Default,
            channel: NotificationChannel::Default,
        }
    }

    #[tokio::test]
    async fn test_timed_goes_to_schedule_and_immediate_to_log() {
        let scheduler = InMemoryScheduler::new();
        let timed = scheduler
            .schedule(request(NotificationKind::Meal, Some(Utc::now() + Duration::hours(1))))
            .await
            .unwrap();
        scheduler
            .schedule(request(NotificationKind::DietAlert, None))
            .await
            .unwrap();

        let scheduled = scheduler.list_scheduled().await.unwrap();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].id, timed);
        assert_eq!(scheduler.delivered().await.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_removes_and_rejects_unknown() {
        let scheduler = InMemoryScheduler::new();
        let id = scheduler
            .schedule(request(NotificationKind::Care, Some(Utc::now() + Duration::hours(2))))
            .await
            .unwrap();

        scheduler.cancel(&id).await.unwrap();
        assert!(scheduler.list_scheduled().await.unwrap().is_empty());
        assert_eq!(
            scheduler.cancel(&id).await,
            Err(DeliveryError::UnknownId(id.clone()))
        );
    }

    #[tokio::test]
    async fn test_pending_sorted_by_fire_time() {
        let scheduler = InMemoryScheduler::new();
        let now = Utc::now();
        scheduler
            .schedule(request(NotificationKind::MealMissed, Some(now + Duration::hours(3))))
            .await
            .unwrap();
        scheduler
            .schedule(request(NotificationKind::Meal, Some(now + Duration::hours(1))))
            .await
            .unwrap();

        let pending = scheduler.pending().await;
        assert_eq!(pending[0].request.kind(), NotificationKind::Meal);
    }
}
