//! Diet alert service
//!
//! Alerts are only ever created by pattern detection; the owner can
//! dismiss them and nothing else.

use crate::error::ApiError;
use crate::ledger::CareLedger;
use pet_care_shared::models::DietAlert;
use pet_care_shared::types::AlertsQuery;
use tracing::info;
use uuid::Uuid;

pub struct AlertService;

impl AlertService {
    /// Alerts, most recent first
    pub fn list(ledger: &CareLedger, query: &AlertsQuery) -> Vec<DietAlert> {
        let mut alerts: Vec<DietAlert> = ledger
            .alerts
            .iter()
            .filter(|a| query.pet_id.map_or(true, |id| a.pet_id == id))
            .filter(|a| query.include_dismissed || a.is_live())
            .cloned()
            .collect();
        alerts.sort_by(|a, b| b.last_occurrence.cmp(&a.last_occurrence));
        alerts
    }

    /// Dismiss an alert; dismissing twice is harmless
    pub fn dismiss(ledger: &mut CareLedger, alert_id: Uuid) -> Result<DietAlert, ApiError> {
        let alert = ledger
            .alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or_else(|| ApiError::NotFound(format!("Diet alert {} not found", alert_id)))?;

        alert.dismiss();
        info!(alert_id = %alert_id, "Diet alert dismissed");
        Ok(alert.clone())
    }
}
