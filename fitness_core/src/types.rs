//! Core domain types for the fitness tracker.
//!
//! This module defines the records owned by the local store:
//! - Workout history entries and their progress
//! - Calendar schedule marks
//! - Calorie calculator history
//! - Shared enums (gender)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Date format used for schedule keys (`YYYY-MM-DD`)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Workout History
// ============================================================================

/// A persisted workout history entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRecord {
    /// Assigned by the store on insert
    pub id: i64,
    pub name: String,
    /// Fraction complete, always within [0, 1]
    pub progress: f32,
    /// Opaque image/resource identifier
    pub image_ref: String,
    pub created_at: DateTime<Utc>,
}

impl WorkoutRecord {
    /// Whole percent as shown on progress bars
    pub fn percent(&self) -> u32 {
        (self.progress * 100.0).round() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// A workout that has not been assigned an id yet
#[derive(Clone, Debug, PartialEq)]
pub struct NewWorkout {
    pub name: String,
    pub progress: f32,
    pub image_ref: String,
    /// Defaults to the insertion time when `None`
    pub created_at: Option<DateTime<Utc>>,
}

impl NewWorkout {
    pub fn new(name: impl Into<String>, progress: f32, image_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            progress,
            image_ref: image_ref.into(),
            created_at: None,
        }
    }

    /// Pin the creation timestamp instead of using the insertion time
    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }
}

/// Clamp a progress value into [0, 1], rejecting NaN
pub fn clamp_progress(progress: f32) -> crate::Result<f32> {
    if progress.is_nan() {
        return Err(Error::InvalidInput("progress must be a number".into()));
    }
    Ok(progress.clamp(0.0, 1.0))
}

// ============================================================================
// Schedule
// ============================================================================

/// A calendar day the user has marked (or explicitly unmarked)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ScheduleMark {
    pub date: NaiveDate,
    pub is_marked: bool,
}

impl ScheduleMark {
    pub fn new(date: NaiveDate, is_marked: bool) -> Self {
        Self { date, is_marked }
    }

    /// The stored primary key, `YYYY-MM-DD`
    pub fn key(&self) -> String {
        format_date(self.date)
    }
}

/// Parse a `YYYY-MM-DD` schedule key
pub fn parse_date(s: &str) -> crate::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| Error::InvalidInput(format!("invalid date '{}': {}", s, e)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ============================================================================
// Calories
// ============================================================================

/// Biological sex used by the Mifflin-St Jeor equation
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(Error::InvalidInput(format!("unknown gender: {}", other))),
        }
    }
}

/// A saved calorie calculation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CalorieHistoryEntry {
    pub id: i64,
    pub calories: f64,
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: Gender,
    /// Activity level label, e.g. "Active"
    pub activity_level: String,
    pub recorded_at: DateTime<Utc>,
}
