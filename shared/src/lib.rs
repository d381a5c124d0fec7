//! Pet Care Shared Library
//!
//! Domain types and the pure rules of the care core: diet pattern
//! detection, reminder timing, emergency detection and the assistant's
//! conversation state. The backend crate wires these to storage, delivery
//! and the remote adviser.

pub mod codec;
pub mod conversation;
pub mod emergency;
pub mod errors;
pub mod models;
pub mod patterns;
pub mod preferences;
pub mod schedule;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::*;
pub use preferences::{NotificationPreferences, PreferencesPatch};
pub use schedule::{NotificationKind, NotificationRequest};
