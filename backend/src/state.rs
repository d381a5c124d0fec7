//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction. Every field is
//! an `Arc` or a cheap handle, so cloning per request is O(1).

use crate::advice::{self, AdviceClient};
use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::ledger::CareLedger;
use crate::notifications::InMemoryScheduler;
use crate::services::{AssistantSessions, PlanReport, ReminderPlanner};
use crate::store::{Collection, DebouncedWriter, JsonStore};
use anyhow::Result;
use chrono::{FixedOffset, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use pet_care_shared::schedule::ScheduleContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Single writer for all care data
    pub ledger: Arc<Mutex<CareLedger>>,
    pub store: Arc<JsonStore>,
    pub writer: DebouncedWriter,
    pub outbox: Arc<InMemoryScheduler>,
    pub planner: Arc<ReminderPlanner>,
    pub adviser: Arc<dyn AdviceClient>,
    pub sessions: Arc<AssistantSessions>,
    pub metrics: PrometheusHandle,
    offset: FixedOffset,
}

impl AppState {
    /// Build state with the adviser described by `config.ai`
    pub async fn new(config: AppConfig, metrics: PrometheusHandle) -> Result<Self> {
        let adviser = advice::from_config(&config.ai)?;
        Self::with_adviser(config, metrics, adviser).await
    }

    /// Build state around an explicit adviser
    ///
    /// Loads the ledger from `storage.data_dir` and starts the background
    /// writer, so this must run inside a tokio runtime.
    pub async fn with_adviser(
        config: AppConfig,
        metrics: PrometheusHandle,
        adviser: Arc<dyn AdviceClient>,
    ) -> Result<Self> {
        let offset = config.schedule.offset()?;
        let store = Arc::new(JsonStore::new(config.storage.data_dir.clone()));
        store.ensure_dir().await?;
        let ledger = CareLedger::load(&store).await?;

        let writer = DebouncedWriter::spawn(
            store.clone(),
            Duration::from_millis(config.storage.debounce_ms),
        );
        let outbox = Arc::new(InMemoryScheduler::new());
        let planner = Arc::new(ReminderPlanner::new(outbox.clone(), offset));

        Ok(Self {
            config: Arc::new(config),
            ledger: Arc::new(Mutex::new(ledger)),
            store,
            writer,
            outbox,
            planner,
            adviser,
            sessions: Arc::new(AssistantSessions::new()),
            metrics,
            offset,
        })
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Owner's clock as of now
    pub fn schedule_context(&self) -> ScheduleContext {
        ScheduleContext::new(Utc::now(), self.offset)
    }

    /// Mirror changed collections to disk
    ///
    /// Preferences are written before returning; everything else goes
    /// through the debounced writer. A failed preference write is logged
    /// and retried with the next change, the in-memory ledger stays
    /// authoritative.
    pub async fn persist(&self, ledger: &CareLedger, collections: &[Collection]) -> ApiResult<()> {
        for &collection in collections {
            let bytes = ledger.encode(collection).map_err(|e| {
                error!(file = collection.file_name(), error = %e, "Failed to encode collection");
                ApiError::Internal(e.into())
            })?;

            if collection == Collection::Preferences {
                if let Err(e) = self.store.write(collection, &bytes).await {
                    warn!(file = collection.file_name(), error = %e, "Failed to persist collection");
                }
            } else {
                self.writer.submit(collection, bytes);
            }
        }
        Ok(())
    }

    /// Recompute scheduled reminders from the current ledger
    pub async fn replan(&self) -> PlanReport {
        self.planner.replan(&self.ledger).await
    }
}
