//! Meal log service
//!
//! Provides business logic for meals including:
//! - Meal planning
//! - Outcome logging
//! - Diet pattern detection on every logged outcome

use crate::error::ApiError;
use crate::ledger::CareLedger;
use crate::services::PetService;
use chrono::{DateTime, Utc};
use pet_care_shared::models::{DietAlert, MealOutcome, MealRecord};
use pet_care_shared::patterns::DietPatternDetector;
use pet_care_shared::schedule::ScheduleContext;
use pet_care_shared::types::{CompleteMealRequest, PetFilter, PlanMealRequest};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Result of logging a meal
#[derive(Debug, Clone, Serialize)]
pub struct MealCompletion {
    pub meal: MealRecord,
    /// Alerts raised by this outcome
    pub new_alerts: Vec<DietAlert>,
}

/// Meal service for business logic
pub struct MealService;

impl MealService {
    /// Plan a meal
    pub fn plan(ledger: &mut CareLedger, req: PlanMealRequest) -> Result<MealRecord, ApiError> {
        req.validate()?;
        PetService::ensure_exists(ledger, req.pet_id)?;

        let mut meal = MealRecord::planned(req.pet_id, req.meal_type, req.scheduled_at, req.food.trim());
        meal.amount = req.amount.unwrap_or_default();
        meal.calories = req.calories.unwrap_or_default();

        info!(meal_id = %meal.id, pet_id = %meal.pet_id, meal_type = %meal.meal_type, "Meal planned");
        ledger.meals.push(meal.clone());
        Ok(meal)
    }

    /// Meals ordered by scheduled time
    pub fn list(ledger: &CareLedger, filter: &PetFilter) -> Vec<MealRecord> {
        let mut meals: Vec<MealRecord> = ledger
            .meals
            .iter()
            .filter(|m| filter.pet_id.map_or(true, |id| m.pet_id == id))
            .cloned()
            .collect();
        meals.sort_by_key(|m| m.scheduled_at);
        meals
    }

    /// Meals on the owner's local calendar day
    pub fn today(ledger: &CareLedger, filter: &PetFilter, ctx: &ScheduleContext) -> Vec<MealRecord> {
        Self::list(ledger, filter)
            .into_iter()
            .filter(|m| ctx.is_today(m.scheduled_at))
            .collect()
    }

    /// Log a meal's outcome and run diet pattern detection
    pub fn complete(
        ledger: &mut CareLedger,
        meal_id: Uuid,
        req: CompleteMealRequest,
        now: DateTime<Utc>,
    ) -> Result<MealCompletion, ApiError> {
        req.validate()?;

        let index = ledger
            .meals
            .iter()
            .position(|m| m.id == meal_id)
            .ok_or_else(|| ApiError::NotFound(format!("Meal {} not found", meal_id)))?;

        let outcome = MealOutcome {
            status: req.status,
            portion_adjustment: req.portion_adjustment,
            feedback: req.feedback.filter(|f| !f.trim().is_empty()),
        };
        let logged = ledger.meals[index].logged(&outcome, now)?;

        let new_alerts = DietPatternDetector::evaluate(
            logged.pet_id,
            Some(logged.id),
            &outcome,
            &ledger.meals,
            &ledger.alerts,
            now,
        );

        ledger.meals[index] = logged.clone();
        for alert in &new_alerts {
            info!(
                alert_id = %alert.id,
                pet_id = %alert.pet_id,
                alert_type = %alert.alert_type,
                occurrences = alert.occurrences,
                "Diet alert raised"
            );
            metrics::counter!("pet_care_diet_alerts_created_total", "type" => alert.alert_type.to_string())
                .increment(1);
        }
        ledger.alerts.extend(new_alerts.iter().cloned());

        Ok(MealCompletion {
            meal: logged,
            new_alerts,
        })
    }
}
