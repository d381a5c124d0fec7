//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Uses both custom validators and the `validator` crate for derive macros.

use chrono::NaiveTime;
use validator::ValidateEmail;

/// Largest reminder offset accepted (one day)
pub const MAX_OFFSET_MINUTES: u32 = 24 * 60;

/// Validate a display name (pets, tasks)
pub fn validate_name(name: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if trimmed.chars().count() > 100 {
        return Err("Name too long".to_string());
    }
    Ok(())
}

/// Validate a reminder offset in minutes
pub fn validate_offset_minutes(minutes: u32) -> Result<(), String> {
    if minutes > MAX_OFFSET_MINUTES {
        return Err(format!(
            "Reminder offset must be at most {} minutes",
            MAX_OFFSET_MINUTES
        ));
    }
    Ok(())
}

/// Parse a 24-hour "HH:MM" clock time
pub fn parse_clock_time(value: &str) -> Result<NaiveTime, String> {
    let clock_regex = regex_lite::Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$")
        .map_err(|e| e.to_string())?;
    let caps = clock_regex
        .captures(value)
        .ok_or_else(|| format!("Invalid time '{}', expected HH:MM", value))?;

    let hours: u32 = caps[1].parse().map_err(|_| "Invalid hours".to_string())?;
    let minutes: u32 = caps[2].parse().map_err(|_| "Invalid minutes".to_string())?;

    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(|| format!("Invalid time '{}'", value))
}

/// Validate a pet weight in pounds
pub fn validate_pet_weight(weight_lbs: f64) -> Result<(), String> {
    if weight_lbs.is_nan() || weight_lbs.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_lbs <= 0.0 {
        return Err("Weight must be positive".to_string());
    }
    if weight_lbs > 400.0 {
        return Err("Weight must be at most 400 lbs".to_string());
    }
    Ok(())
}

/// Validate an optional vet contact email
pub fn validate_contact_email(email: &str) -> Result<(), String> {
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Get user-friendly display label for a field name
pub fn get_field_display_label(field: &str) -> &'static str {
    match field {
        "name" => "Name",
        "title" => "Title",
        "food" => "Food",
        "weight_lbs" => "Weight",
        "message" => "Message",
        "email" => "Email",
        "care_reminder_minutes" => "Care reminder lead time",
        "meal_reminder_minutes" => "Meal reminder lead time",
        "missed_meal_minutes" => "Missed meal delay",
        "quiet_hours_start" => "Quiet hours start",
        "quiet_hours_end" => "Quiet hours end",
        _ => "Field",
    }
}
