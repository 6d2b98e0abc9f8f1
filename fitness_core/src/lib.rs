#![forbid(unsafe_code)]

//! Core domain model and persistence for the fitness tracker.
//!
//! This crate provides:
//! - Domain types (workout history, schedule marks, calorie history)
//! - Calorie estimation (Mifflin-St Jeor with activity multipliers)
//! - Calendar month layout and schedule toggling
//! - A local SQLite record store with live full-snapshot subscriptions
//! - Inbox notification decoding for the remote document store
//! - CSV export, configuration and logging

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod calories;
pub mod calendar;
pub mod catalog;
pub mod progression;
pub mod schema;
pub mod subscription;
pub mod store;
pub mod workouts;
pub mod schedule;
pub mod calorie_history;
pub mod inbox;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use calories::{estimate_daily_calories, ActivityLevel, CalorieEstimate, CalorieQuery};
pub use calendar::{toggle_day, CalendarMonth, YearMonth};
pub use catalog::{default_plan, find_plan_item, PlanItem};
pub use progression::{increment_progress, DEFAULT_PROGRESS_INCREMENT};
pub use store::RecordStore;
pub use subscription::Subscription;
pub use export::export_workouts_csv;
