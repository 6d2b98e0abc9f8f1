//! Workout history operations on the record store.
//!
//! Lists are ordered newest first by creation time (ties broken by id).

use crate::progression::{increment_progress, validate_increment};
use crate::store::millis_to_datetime;
use crate::subscription::Subscription;
use crate::types::clamp_progress;
use crate::{Error, NewWorkout, RecordStore, Result, WorkoutRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

const SELECT_WORKOUTS: &str = "SELECT id, name, progress, imageRes, timestamp \
     FROM workout_history ORDER BY timestamp DESC, id DESC";

fn workout_from_row(row: &Row<'_>) -> rusqlite::Result<WorkoutRecord> {
    let progress: f64 = row.get(2)?;
    Ok(WorkoutRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        progress: progress as f32,
        image_ref: row.get(3)?,
        created_at: millis_to_datetime(4, row.get(4)?)?,
    })
}

fn query_workouts(conn: &Connection) -> rusqlite::Result<Vec<WorkoutRecord>> {
    let mut stmt = conn.prepare_cached(SELECT_WORKOUTS)?;
    let rows = stmt.query_map([], workout_from_row)?;
    rows.collect()
}

impl RecordStore {
    /// Insert a workout, assigning it a fresh id
    ///
    /// Progress outside [0, 1] is clamped. Subscribers receive the new list.
    pub fn insert_workout(&self, workout: NewWorkout) -> Result<WorkoutRecord> {
        let progress = clamp_progress(workout.progress)?;
        let created_at = workout.created_at.unwrap_or_else(Utc::now);

        let _guard = self.workouts.write_lock();
        let (id, snapshot) = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO workout_history (name, progress, imageRes, timestamp) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    workout.name,
                    f64::from(progress),
                    workout.image_ref,
                    created_at.timestamp_millis()
                ],
            )?;
            let id = conn.last_insert_rowid();
            Ok((id, query_workouts(conn)?))
        })?;
        self.workouts.publisher.publish(&snapshot);

        tracing::debug!("Inserted workout {} ({})", id, workout.name);

        // Stored timestamps have millisecond precision
        let created_at = millis_to_datetime(4, created_at.timestamp_millis())?;
        Ok(WorkoutRecord {
            id,
            name: workout.name,
            progress,
            image_ref: workout.image_ref,
            created_at,
        })
    }

    /// Replace the stored row with the same id
    pub fn update_workout(&self, record: &WorkoutRecord) -> Result<()> {
        let progress = clamp_progress(record.progress)?;

        let _guard = self.workouts.write_lock();
        let snapshot = self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE workout_history SET name = ?1, progress = ?2, imageRes = ?3, timestamp = ?4 \
                 WHERE id = ?5",
                params![
                    record.name,
                    f64::from(progress),
                    record.image_ref,
                    record.created_at.timestamp_millis(),
                    record.id
                ],
            )?;
            if changed > 0 {
                Ok(Some(query_workouts(conn)?))
            } else {
                Ok(None)
            }
        })?;

        match snapshot {
            Some(snapshot) => {
                self.workouts.publisher.publish(&snapshot);
                tracing::debug!("Updated workout {}", record.id);
                Ok(())
            }
            None => Err(Error::NotFound(format!("workout {}", record.id))),
        }
    }

    /// Delete by id; returns whether a row was removed
    ///
    /// Deleting an absent id is not an error and publishes nothing.
    pub fn delete_workout(&self, id: i64) -> Result<bool> {
        let _guard = self.workouts.write_lock();
        let snapshot = self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM workout_history WHERE id = ?1", [id])?;
            if changed > 0 {
                Ok(Some(query_workouts(conn)?))
            } else {
                Ok(None)
            }
        })?;

        match snapshot {
            Some(snapshot) => {
                self.workouts.publisher.publish(&snapshot);
                tracing::debug!("Deleted workout {}", id);
                Ok(true)
            }
            None => {
                tracing::debug!("Delete of absent workout {} ignored", id);
                Ok(false)
            }
        }
    }

    pub fn get_workout(&self, id: i64) -> Result<Option<WorkoutRecord>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, progress, imageRes, timestamp FROM workout_history WHERE id = ?1",
                [id],
                workout_from_row,
            )
            .optional()
        })
    }

    /// Current workout list, newest first
    pub fn workouts(&self) -> Result<Vec<WorkoutRecord>> {
        self.with_conn(query_workouts)
    }

    /// Live workout list: the current snapshot, then one per committed change
    pub fn subscribe_workouts(&self) -> Result<Subscription<WorkoutRecord>> {
        // Holding the write lock keeps a concurrent commit from slipping
        // between the initial snapshot and registration
        let _guard = self.workouts.write_lock();
        let initial = self.with_conn(query_workouts)?;
        Ok(self.workouts.subscribe(initial))
    }

    /// Raise a workout's progress by `step`, capped at 100%
    ///
    /// Fails with [`Error::ProgressComplete`] once the workout is at 100%,
    /// and with [`Error::InvalidInput`] for a step outside (0, 1].
    pub fn increment_workout_progress(&self, id: i64, step: f32) -> Result<WorkoutRecord> {
        let step = validate_increment(step)?;
        let _guard = self.workouts.write_lock();

        let current = self
            .with_conn(|conn| {
                conn.query_row(
                    "SELECT id, name, progress, imageRes, timestamp FROM workout_history WHERE id = ?1",
                    [id],
                    workout_from_row,
                )
                .optional()
            })?
            .ok_or_else(|| Error::NotFound(format!("workout {}", id)))?;

        let progress = increment_progress(current.progress, step)
            .ok_or(Error::ProgressComplete(id))?;
        let progress = clamp_progress(progress)?;

        let snapshot = self.with_conn(|conn| {
            conn.execute(
                "UPDATE workout_history SET progress = ?1 WHERE id = ?2",
                params![f64::from(progress), id],
            )?;
            query_workouts(conn)
        })?;
        self.workouts.publisher.publish(&snapshot);

        tracing::debug!(
            "Workout {} progress {:.2} -> {:.2}",
            id,
            current.progress,
            progress
        );

        Ok(WorkoutRecord {
            progress,
            ..current
        })
    }
}
