//! Notification preferences service

use crate::error::ApiError;
use crate::ledger::CareLedger;
use pet_care_shared::{NotificationPreferences, PreferencesPatch};
use tracing::info;

pub struct PreferencesService;

impl PreferencesService {
    pub fn get(ledger: &CareLedger) -> NotificationPreferences {
        ledger.preferences.clone()
    }

    /// Apply a partial update; nothing changes when validation fails
    pub fn update(
        ledger: &mut CareLedger,
        patch: &PreferencesPatch,
    ) -> Result<NotificationPreferences, ApiError> {
        let merged = ledger.preferences.merged(patch).map_err(ApiError::Validation)?;
        ledger.preferences = merged.clone();
        info!(enabled = merged.enabled, "Notification preferences updated");
        Ok(merged)
    }

    pub fn reset(ledger: &mut CareLedger) -> NotificationPreferences {
        ledger.preferences = NotificationPreferences::default();
        info!("Notification preferences reset");
        ledger.preferences.clone()
    }
}
