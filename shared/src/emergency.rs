//! Emergency detection
//!
//! Keyword gate applied to owner messages before they are sent, and the
//! marker check applied to replies after they arrive.

use crate::models::PetProfile;
use serde::{Deserialize, Serialize};

/// Prefix a reply carries when the adviser considers the situation urgent
pub const EMERGENCY_MARKER: &str = "🚨 EMERGENCY:";

/// ASPCA Animal Poison Control line
pub const POISON_CONTROL_PHONE: &str = "(888) 426-4435";

/// Map search for the nearest open emergency clinic
pub const FIND_EMERGENCY_VET_URL: &str = "https://maps.google.com/?q=24+hour+emergency+vet+near+me";

/// Phrases that flag an owner message as an emergency.
///
/// Matched as lower-case substrings, so "breathing" also covers the two
/// longer breathing phrases.
pub const EMERGENCY_KEYWORDS: [&str; 20] = [
    "bleeding",
    "blood",
    "seizure",
    "unconscious",
    "choking",
    "difficulty breathing",
    "not breathing",
    "breathing",
    "poison",
    "toxic",
    "ate chocolate",
    "ate grapes",
    "ate raisins",
    "ate xylitol",
    "ate onion",
    "antifreeze",
    "hit by car",
    "paralyzed",
    "bloated",
    "collapsed",
];

/// Whether an owner's message mentions any emergency phrase
pub fn message_is_emergency(message: &str) -> bool {
    let lower = message.to_lowercase();
    EMERGENCY_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Whether a reply opens with the emergency marker
pub fn reply_is_emergency(reply: &str) -> bool {
    reply.starts_with(EMERGENCY_MARKER)
}

/// Vet details shown on the emergency panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyVet {
    pub clinic_name: String,
    pub phone: String,
}

/// Actions surfaced alongside an emergency reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyPanel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vet: Option<EmergencyVet>,
    pub poison_control_phone: String,
    pub find_emergency_vet_url: String,
}

impl EmergencyPanel {
    pub fn for_pet(pet: &PetProfile) -> Self {
        Self {
            vet: pet.vet_contact.as_ref().map(|vet| EmergencyVet {
                clinic_name: vet.clinic_name.clone(),
                phone: vet.phone.clone(),
            }),
            poison_control_phone: POISON_CONTROL_PHONE.to_string(),
            find_emergency_vet_url: FIND_EMERGENCY_VET_URL.to_string(),
        }
    }
}
