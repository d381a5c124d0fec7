//! API request and response types

use crate::models::{
    CareCategory, MealStatus, MealType, Medication, PortionAdjustment, Priority,
    RecurrenceFrequency, Species,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Pets
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VetContactInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub clinic_name: String,
    #[validate(length(min = 3, max = 40))]
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePetRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub species: Species,
    pub breed: Option<String>,
    #[validate(range(max = 40))]
    pub age_years: Option<u32>,
    pub weight_lbs: Option<f64>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[validate(nested)]
    pub vet_contact: Option<VetContactInput>,
}

// ============================================================================
// Meals
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlanMealRequest {
    pub pet_id: Uuid,
    pub meal_type: MealType,
    pub scheduled_at: DateTime<Utc>,
    #[validate(length(min = 1, max = 200))]
    pub food: String,
    #[validate(length(max = 100))]
    pub amount: Option<String>,
    #[validate(range(max = 10000))]
    pub calories: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompleteMealRequest {
    pub status: MealStatus,
    pub portion_adjustment: Option<PortionAdjustment>,
    #[validate(length(max = 500))]
    pub feedback: Option<String>,
}

// ============================================================================
// Care
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCareTaskRequest {
    pub pet_id: Uuid,
    pub category: CareCategory,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub due_at: DateTime<Utc>,
    pub priority: Option<Priority>,
    pub recurrence: Option<RecurrenceFrequency>,
}

/// Filter shared by the list endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PetFilter {
    pub pet_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpcomingTasksQuery {
    pub pet_id: Option<Uuid>,
    /// Look-ahead window, defaults to 7 days
    #[validate(range(max = 3650))]
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertsQuery {
    pub pet_id: Option<Uuid>,
    #[serde(default)]
    pub include_dismissed: bool,
}

// ============================================================================
// Assistant
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}
