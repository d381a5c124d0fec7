//! Assistant conversation state
//!
//! Bounded chat history, the pet-context preamble sent with every request,
//! and the canned replies used whenever the remote adviser is unavailable.

use crate::emergency::{message_is_emergency, EMERGENCY_MARKER, POISON_CONTROL_PHONE};
use crate::models::{PetProfile, Species};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Most turns kept in a session (ten exchanges)
pub const MAX_HISTORY_TURNS: usize = 20;

/// Suggestions offered under a non-emergency reply
pub const QUICK_REPLIES: [&str; 4] = [
    "🤒 Check symptoms",
    "🍖 Safe foods",
    "🎾 Training tips",
    "💊 Medication help",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: ChatRole::User, text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self { role: ChatRole::Model, text: text.into() }
    }
}

/// Chat history capped at [`MAX_HISTORY_TURNS`], oldest exchange dropped first
///
/// Only answered exchanges are recorded, so the history always opens with
/// an owner turn.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    turns: VecDeque<ChatTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns to send along with a new owner message
    ///
    /// Nothing is recorded until the exchange is answered.
    pub fn with_question(&self, question: &ChatTurn) -> Vec<ChatTurn> {
        let mut outgoing = self.turns.clone();
        outgoing.push_back(question.clone());
        trim(&mut outgoing);
        outgoing.into_iter().collect()
    }

    pub fn record_exchange(&mut self, question: ChatTurn, answer: ChatTurn) {
        self.turns.push_back(question);
        self.turns.push_back(answer);
        trim(&mut self.turns);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> Vec<ChatTurn> {
        self.turns.iter().cloned().collect()
    }
}

fn trim(turns: &mut VecDeque<ChatTurn>) {
    while turns.len() > MAX_HISTORY_TURNS
        || turns.front().is_some_and(|turn| turn.role == ChatRole::Model)
    {
        turns.pop_front();
    }
}

/// Facts about the pet the adviser should take into account
pub fn pet_context(pet: &PetProfile) -> String {
    let mut lines = vec![
        format!("CURRENT PET: {}", pet.name),
        format!("Type: {}", pet.species.label()),
    ];

    if let Some(breed) = &pet.breed {
        lines.push(format!("Breed: {}", breed));
    }
    if let Some(age) = pet.age_years {
        lines.push(format!("Age: {} years old", age));
    }
    if let Some(weight) = pet.weight_lbs {
        lines.push(format!("Weight: {} lbs", weight));
    }
    if !pet.allergies.is_empty() {
        lines.push(format!("Known Allergies: {}", pet.allergies.join(", ")));
    }
    if !pet.medications.is_empty() {
        let meds: Vec<String> = pet
            .medications
            .iter()
            .map(|m| format!("{} ({}, {})", m.name, m.dosage, m.frequency))
            .collect();
        lines.push(format!("Current Medications: {}", meds.join("; ")));
    }
    if !pet.conditions.is_empty() {
        lines.push(format!("Medical Conditions: {}", pet.conditions.join(", ")));
    }
    if let Some(vet) = &pet.vet_contact {
        lines.push(format!("Vet: {} - {}", vet.clinic_name, vet.phone));
    }

    lines.join("\n")
}

/// System instruction sent ahead of the conversation
pub fn system_preamble(pet: &PetProfile) -> String {
    format!(
        "You are an expert AI veterinary assistant helping pet owners care for their pets. \
You provide helpful, accurate, and compassionate advice.

{context}

IMPORTANT GUIDELINES:
1. Always prioritize pet safety and health
2. Recommend veterinary care for serious symptoms
3. Be clear about what is and isn't an emergency
4. Provide specific, actionable advice
5. Be warm and supportive - pet owners may be worried
6. If you detect emergency keywords (bleeding, seizure, unconscious, poisoning, difficulty breathing, etc.), start your response with \"{marker}\"

RESPONSE FORMAT:
- Keep responses concise but informative (under 300 words)
- Use bullet points for lists
- Include emojis sparingly for readability
- Always consider the specific pet's context (age, breed, allergies, medications)

Remember: You're a helpful assistant, not a replacement for veterinary care. \
When in doubt, recommend consulting a vet.",
        context = pet_context(pet),
        marker = EMERGENCY_MARKER,
    )
}

/// What an owner's question is about, for canned replies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Emergency,
    Diet,
    Training,
    Health,
    General,
}

impl Topic {
    pub fn detect(message: &str) -> Self {
        if message_is_emergency(message) {
            return Topic::Emergency;
        }

        let lower = message.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if mentions(&["food", "eat", "diet"]) {
            Topic::Diet
        } else if mentions(&["train", "behavior"]) {
            Topic::Training
        } else if mentions(&["symptom", "sick", "health"]) {
            Topic::Health
        } else {
            Topic::General
        }
    }
}

/// Deterministic local answer
pub fn fallback_reply(pet: &PetProfile, message: &str) -> String {
    let name = &pet.name;

    match Topic::detect(message) {
        Topic::Emergency => {
            let vet_info = pet
                .vet_contact
                .as_ref()
                .map(|vet| {
                    format!(
                        "\n\n📞 CALL {}'S VET NOW:\n{}\n{}",
                        name.to_uppercase(),
                        vet.clinic_name,
                        vet.phone
                    )
                })
                .unwrap_or_default();

            format!(
                "{EMERGENCY_MARKER} This sounds serious!\n\n⚠️ IMMEDIATE ACTIONS:\n\n\
1. Stay calm but act quickly\n\
2. Call your vet or emergency clinic NOW{vet_info}\n\
3. Pet Poison Control: {POISON_CONTROL_PHONE}\n\
4. Keep {name} calm and safe\n\
5. Do NOT induce vomiting unless told to\n\n\
Time is critical. Please seek professional help immediately!"
            )
        }
        Topic::Diet => {
            let foods = match pet.species {
                Species::Dog => {
                    "✅ Safe for dogs:\n• Plain chicken, turkey, beef\n• Carrots, green beans, sweet potato\n\
• Blueberries, apples (no seeds)\n\n❌ Toxic:\n• Chocolate, grapes, raisins\n• Onions, garlic, xylitol"
                }
                Species::Cat => {
                    "✅ Safe for cats:\n• Plain chicken, turkey, fish\n• Cooked eggs\n• Pumpkin\n\n\
❌ Toxic:\n• Onions, garlic, chocolate\n• Grapes, raisins, xylitol"
                }
            };
            format!(
                "Great question about {name}'s diet!\n\n{foods}\n\nWhat specific food are you asking about?"
            )
        }
        Topic::Training => format!(
            "Training {name} is all about consistency and positive reinforcement!\n\n🎯 Key principles:\n\
• Use treats and praise immediately\n• Keep sessions short (5-10 min)\n\
• Be consistent with commands\n• Never use punishment\n\n\
What specific behavior would you like to work on?"
        ),
        Topic::Health => format!(
            "I can help you check {name}'s symptoms!\n\nPlease describe:\n\
• Is {name} eating normally?\n• Any vomiting or diarrhea?\n\
• Changes in energy level?\n• Any visible issues?\n\n\
If symptoms are severe or worsening, please contact your vet."
        ),
        Topic::General => format!(
            "I'd be happy to help with {name}! Could you provide more details about your question?\n\n\
I can help with:\n• Health and symptoms\n• Diet and nutrition\n\
• Training and behavior\n• General care advice"
        ),
    }
}
