//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the care ledger and external collaborators.

pub mod alerts;
pub mod assistant;
pub mod care;
pub mod meals;
pub mod pets;
pub mod planner;
pub mod preferences;

pub use alerts::AlertService;
pub use assistant::{AssistantService, AssistantSessions};
pub use care::CareService;
pub use meals::MealService;
pub use pets::PetService;
pub use planner::{PlanReport, ReminderPlanner};
pub use preferences::PreferencesService;
