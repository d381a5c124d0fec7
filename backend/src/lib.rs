//! Pet Care Backend Library
//!
//! This library exposes the backend modules for use in tests and other crates.

pub mod advice;
pub mod config;
pub mod error;
pub mod ledger;
pub mod notifications;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
