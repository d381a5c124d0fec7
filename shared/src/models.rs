//! Data models for the Pet Care application

use crate::errors::DomainError;
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Pets
// ============================================================================

/// Pet species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    #[default]
    Dog,
    Cat,
}

impl Species {
    pub fn label(&self) -> &'static str {
        match self {
            Species::Dog => "Dog",
            Species::Cat => "Cat",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Dog => write!(f, "dog"),
            Species::Cat => write!(f, "cat"),
        }
    }
}

/// Veterinary contact for a pet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VetContact {
    pub name: String,
    pub clinic_name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Medication a pet is currently taking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    pub frequency: RecurrenceFrequency,
}

/// Pet profile
///
/// Only the fields needed for notification text and the assistant's
/// context preamble are modelled here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetProfile {
    pub id: Uuid,
    pub name: String,
    pub species: Species,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_lbs: Option<f64>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vet_contact: Option<VetContact>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Meals
// ============================================================================

/// Meal category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub fn label(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label().to_lowercase())
    }
}

/// Logged outcome of a meal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealStatus {
    Fed,
    Skipped,
    Refused,
}

/// How much of the portion was eaten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortionAdjustment {
    AteAll,
    AteSome,
    AteNone,
}

impl PortionAdjustment {
    /// `ate-some` and `ate-none` count towards the partial-eating pattern
    pub fn is_partial(&self) -> bool {
        matches!(self, PortionAdjustment::AteSome | PortionAdjustment::AteNone)
    }
}

/// Outcome values supplied when a meal is logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealOutcome {
    pub status: MealStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion_adjustment: Option<PortionAdjustment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// A planned meal and, once logged, its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub meal_type: MealType,
    pub scheduled_at: DateTime<Utc>,
    pub food: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub calories: u32,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MealStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portion_adjustment: Option<PortionAdjustment>,
}

impl MealRecord {
    /// Plan a new, not yet logged meal
    pub fn planned(
        pet_id: Uuid,
        meal_type: MealType,
        scheduled_at: DateTime<Utc>,
        food: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pet_id,
            meal_type,
            scheduled_at,
            food: food.into(),
            amount: String::new(),
            calories: 0,
            completed: false,
            completed_at: None,
            status: None,
            feedback: None,
            portion_adjustment: None,
        }
    }

    /// Return a copy of this meal with the outcome logged at `at`.
    ///
    /// A meal's outcome is recorded exactly once.
    pub fn logged(&self, outcome: &MealOutcome, at: DateTime<Utc>) -> Result<Self, DomainError> {
        if self.completed {
            return Err(DomainError::Conflict(format!(
                "Meal {} has already been logged",
                self.id
            )));
        }

        Ok(Self {
            completed: true,
            completed_at: Some(at),
            status: Some(outcome.status),
            feedback: outcome.feedback.clone(),
            portion_adjustment: outcome.portion_adjustment,
            ..self.clone()
        })
    }

    /// `completed_at` and `status` are both present or both absent
    pub fn is_consistent(&self) -> bool {
        self.completed_at.is_some() == self.status.is_some()
    }
}

// ============================================================================
// Care tasks
// ============================================================================

/// Care task category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CareCategory {
    Medication,
    Vaccination,
    Grooming,
    Hygiene,
    Appointment,
    Wellness,
    Deworming,
}

impl CareCategory {
    /// Icon shown in front of notification titles
    pub fn icon(&self) -> &'static str {
        match self {
            CareCategory::Medication => "💊",
            CareCategory::Vaccination => "💉",
            CareCategory::Grooming => "✂️",
            CareCategory::Hygiene => "🛁",
            CareCategory::Appointment => "🏥",
            CareCategory::Wellness => "❤️",
            CareCategory::Deworming => "🐛",
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// How often a recurring task or medication repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceFrequency {
    /// Advance `from` by one period.
    ///
    /// Month and year steps clamp to the last day of the target month.
    /// A step past the representable range leaves `from` unchanged.
    pub fn advance(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            RecurrenceFrequency::Daily => from.checked_add_signed(Duration::days(1)).unwrap_or(from),
            RecurrenceFrequency::Weekly => from.checked_add_signed(Duration::weeks(1)).unwrap_or(from),
            RecurrenceFrequency::Monthly => from.checked_add_months(Months::new(1)).unwrap_or(from),
            RecurrenceFrequency::Yearly => from.checked_add_months(Months::new(12)).unwrap_or(from),
        }
    }
}

impl fmt::Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecurrenceFrequency::Daily => "daily",
            RecurrenceFrequency::Weekly => "weekly",
            RecurrenceFrequency::Monthly => "monthly",
            RecurrenceFrequency::Yearly => "yearly",
        };
        write!(f, "{}", s)
    }
}

/// Recurrence descriptor attached to a care task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: RecurrenceFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_due: Option<DateTime<Utc>>,
}

/// A care task with a due instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareTask {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub category: CareCategory,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_at: DateTime<Utc>,
    #[serde(default)]
    pub priority: Priority,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

/// Append-only record of a completed care task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareHistoryEntry {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub category: CareCategory,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// Result of completing a care task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskCompletion {
    pub history: CareHistoryEntry,
    /// The updated task if it recurs; `None` when it leaves the active set
    pub retained: Option<CareTask>,
}

impl CareTask {
    pub fn is_open(&self) -> bool {
        !self.completed
    }

    /// Complete the task at `at`.
    pub fn complete(&self, at: DateTime<Utc>) -> Result<TaskCompletion, DomainError> {
        if self.completed {
            return Err(DomainError::Conflict(format!(
                "Care task {} is already completed",
                self.id
            )));
        }

        let history = CareHistoryEntry {
            id: Uuid::new_v4(),
            pet_id: self.pet_id,
            category: self.category,
            title: self.title.clone(),
            description: Some(self.description.clone()).filter(|d| !d.is_empty()),
            completed_at: at,
        };

        let retained = self.recurrence.map(|recurrence| Self {
            completed: true,
            completed_at: Some(at),
            recurrence: Some(Recurrence {
                frequency: recurrence.frequency,
                next_due: Some(recurrence.frequency.advance(self.due_at)),
            }),
            ..self.clone()
        });

        Ok(TaskCompletion { history, retained })
    }
}

// ============================================================================
// Diet alerts
// ============================================================================

/// Named negative eating pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DietAlertType {
    RepeatedRefusal,
    RepeatedPartial,
    RepeatedSkip,
}

impl fmt::Display for DietAlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DietAlertType::RepeatedRefusal => "repeated-refusal",
            DietAlertType::RepeatedPartial => "repeated-partial",
            DietAlertType::RepeatedSkip => "repeated-skip",
        };
        write!(f, "{}", s)
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
    Urgent,
}

/// Alert derived from a pet's recent meal history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietAlert {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub alert_type: DietAlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub occurrences: u32,
    pub last_occurrence: DateTime<Utc>,
    pub dismissed: bool,
}

impl DietAlert {
    pub fn is_live(&self) -> bool {
        !self.dismissed
    }

    /// Dismissal is terminal; dismissing twice is a no-op.
    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }
}
