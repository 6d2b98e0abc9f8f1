//! SQLite schema for the local record store.

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;

pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Tables created at version 1
pub const SCHEMA: &str = r#"
-- Workout history, newest first by timestamp (ms since epoch)
CREATE TABLE IF NOT EXISTS workout_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    progress REAL NOT NULL,
    imageRes TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_workout_history_timestamp
    ON workout_history(timestamp DESC);

-- Calendar marks keyed by YYYY-MM-DD
CREATE TABLE IF NOT EXISTS schedule (
    date TEXT PRIMARY KEY NOT NULL,
    isMarked INTEGER NOT NULL
);

-- Saved calorie calculations
CREATE TABLE IF NOT EXISTS calorie_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    calories REAL NOT NULL,
    age INTEGER NOT NULL,
    height REAL NOT NULL,
    weight REAL NOT NULL,
    gender TEXT NOT NULL,
    activityLevel TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);
"#;
