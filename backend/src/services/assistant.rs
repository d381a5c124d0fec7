//! Pet-care assistant
//!
//! One session per pet. Each message is checked for emergency phrases
//! before it leaves and each reply for the emergency marker when it
//! returns. When the adviser cannot answer, a canned local reply is used
//! and the unanswered question is taken back out of the history.

use crate::advice::AdviceClient;
use crate::error::ApiError;
use crate::ledger::CareLedger;
use pet_care_shared::conversation::{
    fallback_reply, system_preamble, ChatTurn, ConversationHistory, QUICK_REPLIES,
};
use pet_care_shared::emergency::{message_is_emergency, reply_is_emergency, EmergencyPanel};
use pet_care_shared::models::PetProfile;
use pet_care_shared::types::SendMessageRequest;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// What the owner sees after sending a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantReply {
    pub content: String,
    pub is_emergency: bool,
    /// Local canned reply was used
    pub fallback: bool,
    /// Empty during an emergency
    pub quick_replies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency: Option<EmergencyPanel>,
}

/// Conversation with the adviser about one pet
pub struct AssistantSession {
    pet: PetProfile,
    preamble: String,
    history: ConversationHistory,
}

impl AssistantSession {
    pub fn new(pet: PetProfile) -> Self {
        Self {
            preamble: system_preamble(&pet),
            pet,
            history: ConversationHistory::new(),
        }
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Refresh the pet context without dropping the conversation
    pub fn update_pet(&mut self, pet: PetProfile) {
        if pet != self.pet {
            self.preamble = system_preamble(&pet);
            self.pet = pet;
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub async fn send(&mut self, adviser: &dyn AdviceClient, message: &str) -> AssistantReply {
        let flagged = message_is_emergency(message);
        if flagged {
            warn!(pet_id = %self.pet.id, "Emergency phrase in owner message");
        }

        let question = ChatTurn::user(message);
        let outgoing = self.history.with_question(&question);

        let (content, fallback) = match adviser.advise(&self.preamble, &outgoing).await {
            Ok(text) => {
                self.history.record_exchange(question, ChatTurn::model(text.clone()));
                (text, false)
            }
            Err(e) => {
                warn!(pet_id = %self.pet.id, error = %e, "Adviser unavailable; answering locally");
                metrics::counter!("pet_care_assistant_fallbacks_total").increment(1);
                (fallback_reply(&self.pet, message), true)
            }
        };

        let is_emergency = flagged || reply_is_emergency(&content);
        AssistantReply {
            quick_replies: if is_emergency {
                Vec::new()
            } else {
                QUICK_REPLIES.iter().map(|q| q.to_string()).collect()
            },
            emergency: is_emergency.then(|| EmergencyPanel::for_pet(&self.pet)),
            content,
            is_emergency,
            fallback,
        }
    }
}

/// Sessions keyed by pet
#[derive(Default)]
pub struct AssistantSessions {
    sessions: Mutex<HashMap<Uuid, Arc<Mutex<AssistantSession>>>>,
}

impl AssistantSessions {
    pub fn new() -> Self {
        Self::default()
    }

    async fn session_for(&self, pet: PetProfile) -> Arc<Mutex<AssistantSession>> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(pet.id)
            .or_insert_with(|| Arc::new(Mutex::new(AssistantSession::new(pet.clone()))))
            .clone()
    }

    /// Drop a pet's conversation; returns whether one existed
    pub async fn clear(&self, pet_id: Uuid) -> bool {
        let session = self.sessions.lock().await.get(&pet_id).cloned();
        match session {
            Some(session) => {
                session.lock().await.clear();
                true
            }
            None => false,
        }
    }
}

pub struct AssistantService;

impl AssistantService {
    /// Send a message about `pet_id`
    pub async fn send_message(
        ledger: &Mutex<CareLedger>,
        sessions: &AssistantSessions,
        adviser: &dyn AdviceClient,
        pet_id: Uuid,
        req: SendMessageRequest,
    ) -> Result<AssistantReply, ApiError> {
        req.validate()?;
        let message = req.message.trim();
        if message.is_empty() {
            return Err(ApiError::invalid_field("message", "cannot be blank"));
        }

        let pet = ledger
            .lock()
            .await
            .pet(pet_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Pet {} not found", pet_id)))?;

        let session = sessions.session_for(pet.clone()).await;
        let mut session = session.lock().await;
        session.update_pet(pet);

        let reply = session.send(adviser, message).await;
        info!(
            pet_id = %pet_id,
            emergency = reply.is_emergency,
            fallback = reply.fallback,
            turns = session.history().len(),
            "Assistant replied"
        );
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{AdviceError, OfflineAdviser};
    use async_trait::async_trait;
    use chrono::Utc;
    use pet_care_shared::conversation::{ChatRole, MAX_HISTORY_TURNS};
    use pet_care_shared::models::{Species, VetContact};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn max() -> PetProfile {
        PetProfile {
            id: Uuid::new_v4(),
            name: "Max".to_string(),
            species: Species::Dog,
            breed: Some("Beagle".to_string()),
            age_years: Some(6),
            weight_lbs: Some(24.0),
            allergies: vec![],
            medications: vec![],
            conditions: vec![],
            vet_contact: Some(VetContact {
                name: "Dr. Reyes".to_string(),
                clinic_name: "Happy Paws Clinic".to_string(),
                phone: "555-0100".to_string(),
                email: None,
                address: None,
            }),
            created_at: Utc::now(),
        }
    }

    /// Replies with a fixed text and records what it was sent
    struct ScriptedAdviser {
        reply: String,
        calls: AtomicUsize,
        last_turns: std::sync::Mutex<Vec<ChatTurn>>,
    }

    impl ScriptedAdviser {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                last_turns: std::sync::Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AdviceClient for ScriptedAdviser {
        async fn advise(&self, _preamble: &str, turns: &[ChatTurn]) -> Result<String, AdviceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_turns.lock().unwrap() = turns.to_vec();
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_keyword_sets_emergency_even_on_calm_reply() {
        let adviser = ScriptedAdviser::new("Monitor him closely.");
        let mut session = AssistantSession::new(max());

        let reply = session.send(&adviser, "Max ate chocolate").await;
        assert!(reply.is_emergency);
        assert!(reply.quick_replies.is_empty());
        let panel = reply.emergency.unwrap();
        assert_eq!(panel.vet.unwrap().phone, "555-0100");
        assert_eq!(panel.poison_control_phone, "(888) 426-4435");
    }

    #[tokio::test]
    async fn test_marker_in_reply_sets_emergency() {
        let adviser = ScriptedAdviser::new("🚨 EMERGENCY: Go to the clinic now.");
        let mut session = AssistantSession::new(max());

        let reply = session.send(&adviser, "He is lethargic and won't stand").await;
        assert!(reply.is_emergency);
        assert!(!reply.fallback);
    }

    #[tokio::test]
    async fn test_normal_reply_offers_quick_replies() {
        let adviser = ScriptedAdviser::new("Try a puzzle feeder.");
        let mut session = AssistantSession::new(max());

        let reply = session.send(&adviser, "He eats too fast").await;
        assert!(!reply.is_emergency);
        assert_eq!(reply.quick_replies.len(), 4);
        assert!(reply.emergency.is_none());
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_fallback_records_nothing() {
        let adviser = OfflineAdviser::new("adviser disabled");
        let mut session = AssistantSession::new(max());

        let reply = session.send(&adviser, "What food is safe?").await;
        assert!(reply.fallback);
        assert!(reply.content.contains("Safe for dogs"));
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_emergency_fallback_carries_marker() {
        let adviser = OfflineAdviser::new("offline");
        let mut session = AssistantSession::new(max());

        let reply = session.send(&adviser, "She is not breathing").await;
        assert!(reply.fallback);
        assert!(reply.is_emergency);
        assert!(reply.content.starts_with("🚨 EMERGENCY:"));
    }

    #[tokio::test]
    async fn test_history_forwarded_and_capped() {
        let adviser = ScriptedAdviser::new("ok");
        let mut session = AssistantSession::new(max());

        for i in 0..15 {
            session.send(&adviser, &format!("question {}", i)).await;
        }

        assert_eq!(adviser.calls.load(Ordering::SeqCst), 15);
        assert_eq!(session.history().len(), MAX_HISTORY_TURNS);
        let sent = adviser.last_turns.lock().unwrap().clone();
        assert_eq!(sent.last().unwrap().text, "question 14");
        assert_eq!(sent.last().unwrap().role, ChatRole::User);
        assert_eq!(sent[0].role, ChatRole::User);
    }

    #[tokio::test]
    async fn test_fallback_keeps_full_history_intact() {
        let scripted = ScriptedAdviser::new("ok");
        let mut session = AssistantSession::new(max());
        for i in 0..10 {
            session.send(&scripted, &format!("question {}", i)).await;
        }
        let before = session.history().turns();
        assert_eq!(before.len(), MAX_HISTORY_TURNS);

        let reply = session.send(&OfflineAdviser::new("offline"), "Is he overweight?").await;

        assert!(reply.fallback);
        assert_eq!(session.history().turns(), before);
        assert_eq!(session.history().turns()[0].text, "question 0");
    }

    #[tokio::test]
    async fn test_service_rejects_unknown_pet_and_blank_message() {
        let ledger = Mutex::new(CareLedger::default());
        let sessions = AssistantSessions::new();
        let adviser = ScriptedAdviser::new("ok");

        let unknown = AssistantService::send_message(
            &ledger,
            &sessions,
            &adviser,
            Uuid::new_v4(),
            SendMessageRequest { message: "hello".to_string() },
        )
        .await;
        assert!(matches!(unknown, Err(ApiError::NotFound(_))));

        let blank = AssistantService::send_message(
            &ledger,
            &sessions,
            &adviser,
            Uuid::new_v4(),
            SendMessageRequest { message: "   ".to_string() },
        )
        .await;
        assert!(matches!(blank, Err(ApiError::InvalidField { .. })));
    }

    #[tokio::test]
    async fn test_sessions_are_per_pet_and_clearable() {
        let luna = PetProfile { id: Uuid::new_v4(), name: "Luna".to_string(), ..max() };
        let max = max();
        let ledger = Mutex::new(CareLedger {
            pets: vec![max.clone(), luna.clone()],
            ..CareLedger::default()
        });
        let sessions = AssistantSessions::new();
        let adviser = ScriptedAdviser::new("ok");

        for pet in [&max, &luna] {
            AssistantService::send_message(
                &ledger,
                &sessions,
                &adviser,
                pet.id,
                SendMessageRequest { message: "hi".to_string() },
            )
            .await
            .unwrap();
        }
        // Luna's conversation did not include Max's turns
        assert_eq!(adviser.last_turns.lock().unwrap().len(), 1);

        assert!(sessions.clear(max.id).await);
        assert!(!sessions.clear(Uuid::new_v4()).await);
    }
}
