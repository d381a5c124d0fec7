//! In-memory care ledger
//!
//! Single aggregate holding every collection. All reads are served from
//! here; the store only mirrors it to disk.

use crate::store::{Collection, JsonStore, StoreError};
use pet_care_shared::models::{CareHistoryEntry, CareTask, DietAlert, MealRecord, PetProfile};
use pet_care_shared::NotificationPreferences;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
pub struct CareLedger {
    pub pets: Vec<PetProfile>,
    pub meals: Vec<MealRecord>,
    pub tasks: Vec<CareTask>,
    /// Newest first
    pub history: Vec<CareHistoryEntry>,
    pub alerts: Vec<DietAlert>,
    pub preferences: NotificationPreferences,
}

impl CareLedger {
    /// Load every collection from disk
    pub async fn load(store: &JsonStore) -> Result<Self, StoreError> {
        let ledger = Self {
            pets: store.load(Collection::Pets).await?,
            meals: store.load(Collection::Meals).await?,
            tasks: store.load(Collection::CareTasks).await?,
            history: store.load(Collection::CareHistory).await?,
            alerts: store.load(Collection::DietAlerts).await?,
            preferences: store.load_preferences().await?,
        };

        info!(
            pets = ledger.pets.len(),
            meals = ledger.meals.len(),
            tasks = ledger.tasks.len(),
            alerts = ledger.alerts.len(),
            "Care ledger loaded"
        );
        Ok(ledger)
    }

    /// Serialize one collection in its on-disk format
    pub fn encode(&self, collection: Collection) -> Result<Vec<u8>, StoreError> {
        match collection {
            Collection::Pets => JsonStore::encode(&self.pets),
            Collection::Meals => JsonStore::encode(&self.meals),
            Collection::CareTasks => JsonStore::encode(&self.tasks),
            Collection::CareHistory => JsonStore::encode(&self.history),
            Collection::DietAlerts => JsonStore::encode(&self.alerts),
            Collection::Preferences => JsonStore::encode_preferences(&self.preferences),
        }
    }

    pub fn pet(&self, id: Uuid) -> Option<&PetProfile> {
        self.pets.iter().find(|p| p.id == id)
    }

    pub fn pet_name(&self, id: Uuid) -> Option<&str> {
        self.pet(id).map(|p| p.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pet_care_shared::models::{MealType, Species};

    #[tokio::test]
    async fn test_encode_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let pet = PetProfile {
            id: Uuid::new_v4(),
            name: "Max".to_string(),
            species: Species::Dog,
            breed: None,
            age_years: None,
            weight_lbs: None,
            allergies: vec![],
            medications: vec![],
            conditions: vec![],
            vet_contact: None,
            created_at: Utc::now(),
        };
        let mut ledger = CareLedger::default();
        ledger.meals.push(MealRecord::planned(pet.id, MealType::Dinner, Utc::now(), "Kibble"));
        ledger.pets.push(pet);
        ledger.preferences.meal_reminders = false;

        for collection in Collection::ALL {
            store.write(collection, &ledger.encode(collection).unwrap()).await.unwrap();
        }

        let loaded = CareLedger::load(&store).await.unwrap();
        assert_eq!(loaded.pets, ledger.pets);
        assert_eq!(loaded.meals, ledger.meals);
        assert!(!loaded.preferences.meal_reminders);
        assert_eq!(loaded.pet_name(ledger.pets[0].id), Some("Max"));
    }
}
