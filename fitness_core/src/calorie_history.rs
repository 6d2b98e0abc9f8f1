//! Saved calorie calculations.

use crate::calories::{CalorieEstimate, CalorieQuery};
use crate::store::millis_to_datetime;
use crate::subscription::Subscription;
use crate::{CalorieHistoryEntry, Error, Gender, RecordStore, Result};
use chrono::Utc;
use rusqlite::{params, Connection};

fn query_history(conn: &Connection) -> rusqlite::Result<Vec<CalorieHistoryEntry>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, calories, age, height, weight, gender, activityLevel, timestamp \
         FROM calorie_history ORDER BY timestamp DESC, id DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        let gender: String = row.get(5)?;
        let gender = gender.parse::<Gender>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(CalorieHistoryEntry {
            id: row.get(0)?,
            calories: row.get(1)?,
            age: row.get(2)?,
            height_cm: row.get(3)?,
            weight_kg: row.get(4)?,
            gender,
            activity_level: row.get(6)?,
            recorded_at: millis_to_datetime(7, row.get(7)?)?,
        })
    })?;
    rows.collect()
}

impl RecordStore {
    /// Save a calculation result
    pub fn record_calorie_estimate(
        &self,
        query: &CalorieQuery,
        estimate: &CalorieEstimate,
    ) -> Result<CalorieHistoryEntry> {
        if !estimate.daily_calories.is_finite() {
            return Err(Error::InvalidInput("calorie estimate is not a number".into()));
        }

        let activity_level = query
            .activity_level()
            .map(|level| level.label().to_string())
            .unwrap_or_else(|| format!("x{}", query.activity_multiplier));
        let recorded_at = millis_to_datetime(7, Utc::now().timestamp_millis())?;

        let _guard = self.calories.write_lock();
        let (id, snapshot) = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO calorie_history \
                 (calories, age, height, weight, gender, activityLevel, timestamp) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    estimate.daily_calories,
                    query.age,
                    query.height_cm,
                    query.weight_kg,
                    query.gender.as_str(),
                    activity_level,
                    recorded_at.timestamp_millis()
                ],
            )?;
            let id = conn.last_insert_rowid();
            Ok((id, query_history(conn)?))
        })?;
        self.calories.publisher.publish(&snapshot);

        tracing::debug!("Recorded calorie estimate {} ({:.2} kcal)", id, estimate.daily_calories);

        Ok(CalorieHistoryEntry {
            id,
            calories: estimate.daily_calories,
            age: query.age,
            height_cm: query.height_cm,
            weight_kg: query.weight_kg,
            gender: query.gender,
            activity_level,
            recorded_at,
        })
    }

    /// Saved calculations, newest first
    pub fn calorie_history(&self) -> Result<Vec<CalorieHistoryEntry>> {
        self.with_conn(query_history)
    }

    pub fn subscribe_calorie_history(&self) -> Result<Subscription<CalorieHistoryEntry>> {
        let _guard = self.calories.write_lock();
        let initial = self.with_conn(query_history)?;
        Ok(self.calories.subscribe(initial))
    }
}
