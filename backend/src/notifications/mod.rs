//! Local notification delivery
//!
//! The planner talks to delivery only through [`NotificationScheduler`].
//! Every call is independent: a failure affects that one notification.

mod memory;

pub use memory::{DeliveredNotification, InMemoryScheduler};

use async_trait::async_trait;
use pet_care_shared::NotificationRequest;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delivery errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("notification {0} is not scheduled")]
    UnknownId(String),

    #[error("delivery rejected: {0}")]
    Rejected(String),
}

/// A pending notification as reported by delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    /// Opaque, assigned by delivery
    pub id: String,
    #[serde(flatten)]
    pub request: NotificationRequest,
}

#[async_trait]
pub trait NotificationScheduler: Send + Sync + 'static {
    /// Schedule a timed notification, or deliver now when `fire_at` is absent
    async fn schedule(&self, request: NotificationRequest) -> Result<String, DeliveryError>;

    async fn cancel(&self, id: &str) -> Result<(), DeliveryError>;

    /// Pending timed notifications
    async fn list_scheduled(&self) -> Result<Vec<ScheduledNotification>, DeliveryError>;
}
