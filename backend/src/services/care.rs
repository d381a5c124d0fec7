//! Care schedule service
//!
//! Care tasks carry a due instant, a priority and an optional recurrence.
//! Completing a task appends to the care history; recurring tasks stay in
//! the active set with their next due instant computed.

use crate::error::ApiError;
use crate::ledger::CareLedger;
use crate::services::PetService;
use chrono::{DateTime, Duration, Utc};
use pet_care_shared::models::{CareHistoryEntry, CareTask, Recurrence, TaskCompletion};
use pet_care_shared::types::{CreateCareTaskRequest, PetFilter};
use pet_care_shared::validation::validate_name;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Default look-ahead for upcoming tasks
const DEFAULT_UPCOMING_DAYS: u32 = 7;

/// Care service for business logic
pub struct CareService;

impl CareService {
    /// Add a care task
    pub fn create(ledger: &mut CareLedger, req: CreateCareTaskRequest) -> Result<CareTask, ApiError> {
        req.validate()?;
        validate_name(&req.title).map_err(|e| ApiError::invalid_field("title", e))?;
        PetService::ensure_exists(ledger, req.pet_id)?;

        let task = CareTask {
            id: Uuid::new_v4(),
            pet_id: req.pet_id,
            category: req.category,
            title: req.title.trim().to_string(),
            description: req.description.unwrap_or_default(),
            due_at: req.due_at,
            priority: req.priority.unwrap_or_default(),
            completed: false,
            completed_at: None,
            recurrence: req.recurrence.map(|frequency| Recurrence {
                frequency,
                next_due: None,
            }),
        };

        info!(task_id = %task.id, pet_id = %task.pet_id, due_at = %task.due_at, "Care task created");
        ledger.tasks.push(task.clone());
        Ok(task)
    }

    /// Active tasks ordered by due instant
    pub fn list(ledger: &CareLedger, filter: &PetFilter) -> Vec<CareTask> {
        let mut tasks: Vec<CareTask> = ledger
            .tasks
            .iter()
            .filter(|t| filter.pet_id.map_or(true, |id| t.pet_id == id))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.due_at);
        tasks
    }

    /// Open tasks due within `days`, overdue ones included
    pub fn upcoming(
        ledger: &CareLedger,
        pet_id: Option<Uuid>,
        days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Vec<CareTask> {
        let window = Duration::days(i64::from(days.unwrap_or(DEFAULT_UPCOMING_DAYS)));
        let horizon = now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::list(ledger, &PetFilter { pet_id })
            .into_iter()
            .filter(|t| t.is_open() && t.due_at <= horizon)
            .collect()
    }

    /// Complete a task
    pub fn complete(
        ledger: &mut CareLedger,
        task_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<TaskCompletion, ApiError> {
        let index = Self::position(ledger, task_id)?;
        let completion = ledger.tasks[index].complete(now)?;

        match &completion.retained {
            Some(task) => ledger.tasks[index] = task.clone(),
            None => {
                ledger.tasks.remove(index);
            }
        }
        ledger.history.insert(0, completion.history.clone());

        info!(
            task_id = %task_id,
            recurring = completion.retained.is_some(),
            "Care task completed"
        );
        Ok(completion)
    }

    /// Remove a task without recording history
    pub fn delete(ledger: &mut CareLedger, task_id: Uuid) -> Result<(), ApiError> {
        let index = Self::position(ledger, task_id)?;
        ledger.tasks.remove(index);
        info!(task_id = %task_id, "Care task deleted");
        Ok(())
    }

    /// Completed care, newest first
    pub fn history(ledger: &CareLedger, filter: &PetFilter) -> Vec<CareHistoryEntry> {
        ledger
            .history
            .iter()
            .filter(|h| filter.pet_id.map_or(true, |id| h.pet_id == id))
            .cloned()
            .collect()
    }

    fn position(ledger: &CareLedger, task_id: Uuid) -> Result<usize, ApiError> {
        ledger
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| ApiError::NotFound(format!("Care task {} not found", task_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pet_care_shared::models::{CareCategory, PetProfile, Priority, RecurrenceFrequency, Species};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()
    }

    fn setup() -> (CareLedger, Uuid) {
        let pet = PetProfile {
            id: Uuid::new_v4(),
            name: "Luna".to_string(),
            species: Species::Cat,
            breed: None,
            age_years: None,
            weight_lbs: None,
            allergies: vec![],
            medications: vec![],
            conditions: vec![],
            vet_contact: None,
            created_at: now(),
        };
        let id = pet.id;
        (CareLedger { pets: vec![pet], ..CareLedger::default() }, id)
    }

    fn request(pet_id: Uuid, due_in_days: i64, recurrence: Option<RecurrenceFrequency>) -> CreateCareTaskRequest {
        CreateCareTaskRequest {
            pet_id,
            category: CareCategory::Deworming,
            title: "Deworming tablet".to_string(),
            description: None,
            due_at: now() + Duration::days(due_in_days),
            priority: Some(Priority::High),
            recurrence,
        }
    }

    #[test]
    fn test_non_recurring_completion_moves_task_to_history() {
        let (mut ledger, pet_id) = setup();
        let task = CareService::create(&mut ledger, request(pet_id, 1, None)).unwrap();

        let completion = CareService::complete(&mut ledger, task.id, now()).unwrap();
        assert!(completion.retained.is_none());
        assert!(ledger.tasks.is_empty());
        assert_eq!(ledger.history.len(), 1);
        assert_eq!(ledger.history[0].title, "Deworming tablet");
    }

    #[test]
    fn test_recurring_completion_keeps_task_with_next_due() {
        let (mut ledger, pet_id) = setup();
        let task = CareService::create(&mut ledger, request(pet_id, 0, Some(RecurrenceFrequency::Monthly))).unwrap();

        CareService::complete(&mut ledger, task.id, now()).unwrap();
        let kept = &ledger.tasks[0];
        assert!(kept.completed);
        assert_eq!(
            kept.recurrence.unwrap().next_due,
            Some(Utc.with_ymd_and_hms(2024, 4, 15, 8, 0, 0).unwrap())
        );
        assert!(matches!(
            CareService::complete(&mut ledger, task.id, now()),
            Err(ApiError::Conflict(_))
        ));
    }

    #[test]
    fn test_history_is_newest_first() {
        let (mut ledger, pet_id) = setup();
        let first = CareService::create(&mut ledger, request(pet_id, 1, None)).unwrap();
        let second = CareService::create(&mut ledger, request(pet_id, 2, None)).unwrap();

        CareService::complete(&mut ledger, first.id, now()).unwrap();
        CareService::complete(&mut ledger, second.id, now() + Duration::hours(1)).unwrap();

        let history = CareService::history(&ledger, &PetFilter::default());
        assert_eq!(history[0].completed_at, now() + Duration::hours(1));
    }

    #[test]
    fn test_upcoming_includes_overdue_and_respects_horizon() {
        let (mut ledger, pet_id) = setup();
        CareService::create(&mut ledger, request(pet_id, -1, None)).unwrap();
        CareService::create(&mut ledger, request(pet_id, 3, None)).unwrap();
        CareService::create(&mut ledger, request(pet_id, 30, None)).unwrap();

        assert_eq!(CareService::upcoming(&ledger, None, None, now()).len(), 2);
        assert_eq!(CareService::upcoming(&ledger, Some(pet_id), Some(60), now()).len(), 3);
    }

    #[test]
    fn test_upcoming_horizon_saturates_instead_of_overflowing() {
        let (mut ledger, pet_id) = setup();
        CareService::create(&mut ledger, request(pet_id, 30, None)).unwrap();

        let late = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert_eq!(CareService::upcoming(&ledger, None, Some(u32::MAX), now()).len(), 1);
        assert_eq!(CareService::upcoming(&ledger, None, Some(7), late).len(), 1);
    }

    #[test]
    fn test_delete_unknown_task_is_not_found() {
        let (mut ledger, _) = setup();
        assert!(matches!(
            CareService::delete(&mut ledger, Uuid::new_v4()),
            Err(ApiError::NotFound(_))
        ));
    }
}
