//! Pet registry service

use crate::error::ApiError;
use crate::ledger::CareLedger;
use chrono::{DateTime, Utc};
use pet_care_shared::models::{PetProfile, VetContact};
use pet_care_shared::types::CreatePetRequest;
use pet_care_shared::validation::{validate_contact_email, validate_name, validate_pet_weight};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Pet service for registry operations
pub struct PetService;

impl PetService {
    /// Register a new pet
    pub fn create(
        ledger: &mut CareLedger,
        req: CreatePetRequest,
        now: DateTime<Utc>,
    ) -> Result<PetProfile, ApiError> {
        req.validate()?;
        validate_name(&req.name).map_err(|e| ApiError::invalid_field("name", e))?;
        if let Some(weight) = req.weight_lbs {
            validate_pet_weight(weight).map_err(|e| ApiError::invalid_field("weight_lbs", e))?;
        }
        if let Some(email) = req.vet_contact.as_ref().and_then(|v| v.email.as_deref()) {
            validate_contact_email(email).map_err(|e| ApiError::invalid_field("email", e))?;
        }

        let pet = PetProfile {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            species: req.species,
            breed: req.breed,
            age_years: req.age_years,
            weight_lbs: req.weight_lbs,
            allergies: req.allergies,
            medications: req.medications,
            conditions: req.conditions,
            vet_contact: req.vet_contact.map(|v| VetContact {
                name: v.name,
                clinic_name: v.clinic_name,
                phone: v.phone,
                email: v.email,
                address: v.address,
            }),
            created_at: now,
        };

        info!(pet_id = %pet.id, species = %pet.species, "Pet registered");
        ledger.pets.push(pet.clone());
        Ok(pet)
    }

    /// All pets, oldest first
    pub fn list(ledger: &CareLedger) -> Vec<PetProfile> {
        let mut pets = ledger.pets.clone();
        pets.sort_by_key(|p| p.created_at);
        pets
    }

    pub fn get(ledger: &CareLedger, id: Uuid) -> Result<PetProfile, ApiError> {
        ledger
            .pet(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Pet {} not found", id)))
    }

    /// Fail unless the pet exists
    pub fn ensure_exists(ledger: &CareLedger, id: Uuid) -> Result<(), ApiError> {
        Self::get(ledger, id).map(|_| ())
    }
}
