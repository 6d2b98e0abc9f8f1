//! Calendar schedule marks on the record store.

use crate::calendar::YearMonth;
use crate::subscription::Subscription;
use crate::types::{format_date, parse_date};
use crate::{RecordStore, Result, ScheduleMark};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

fn query_marks(conn: &Connection) -> rusqlite::Result<Vec<ScheduleMark>> {
    let mut stmt = conn.prepare_cached("SELECT date, isMarked FROM schedule")?;
    let rows = stmt.query_map([], |row| {
        let date: String = row.get(0)?;
        let is_marked: bool = row.get(1)?;
        Ok((date, is_marked))
    })?;

    let mut marks = Vec::new();
    for row in rows {
        let (date, is_marked) = row?;
        match parse_date(&date) {
            Ok(date) => marks.push(ScheduleMark::new(date, is_marked)),
            Err(e) => tracing::warn!("Skipping schedule row: {}", e),
        }
    }
    Ok(marks)
}

fn write_mark(conn: &Connection, date: NaiveDate, marked: bool) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schedule (date, isMarked) VALUES (?1, ?2)",
        params![format_date(date), marked],
    )?;
    Ok(())
}

fn remove_mark(conn: &Connection, date: NaiveDate) -> rusqlite::Result<bool> {
    let changed = conn.execute("DELETE FROM schedule WHERE date = ?1", [format_date(date)])?;
    Ok(changed > 0)
}

impl RecordStore {
    /// Insert or replace the mark for `date`
    pub fn upsert_schedule_mark(&self, date: NaiveDate, marked: bool) -> Result<()> {
        let _guard = self.schedule.write_lock();
        let snapshot = self.with_conn(|conn| {
            write_mark(conn, date, marked)?;
            query_marks(conn)
        })?;
        self.schedule.publisher.publish(&snapshot);

        tracing::debug!("Schedule mark {} = {}", date, marked);
        Ok(())
    }

    /// Remove the mark for `date`; returns whether one existed
    pub fn delete_schedule_mark(&self, date: NaiveDate) -> Result<bool> {
        let _guard = self.schedule.write_lock();
        let snapshot = self.with_conn(|conn| {
            if remove_mark(conn, date)? {
                Ok(Some(query_marks(conn)?))
            } else {
                Ok(None)
            }
        })?;

        match snapshot {
            Some(snapshot) => {
                self.schedule.publisher.publish(&snapshot);
                tracing::debug!("Removed schedule mark {}", date);
                Ok(true)
            }
            None => {
                tracing::debug!("No schedule mark for {}, nothing removed", date);
                Ok(false)
            }
        }
    }

    /// Flip the mark for `date`, returning the new marked state
    ///
    /// A marked day loses its row; any other day is marked. The read and
    /// the write happen under one schedule write lock.
    pub fn toggle_schedule_mark(&self, date: NaiveDate) -> Result<bool> {
        let _guard = self.schedule.write_lock();
        let (marked, snapshot) = self.with_conn(|conn| {
            let current: Option<bool> = conn
                .query_row(
                    "SELECT isMarked FROM schedule WHERE date = ?1",
                    [format_date(date)],
                    |row| row.get(0),
                )
                .optional()?;

            let marked = if current == Some(true) {
                remove_mark(conn, date)?;
                false
            } else {
                write_mark(conn, date, true)?;
                true
            };
            Ok((marked, query_marks(conn)?))
        })?;
        self.schedule.publisher.publish(&snapshot);

        tracing::debug!("Toggled schedule mark {} -> {}", date, marked);
        Ok(marked)
    }

    /// All schedule marks, unordered
    pub fn schedule_marks(&self) -> Result<Vec<ScheduleMark>> {
        self.with_conn(query_marks)
    }

    /// Marks whose date falls in `year_month`
    pub fn marks_in_month(&self, year_month: YearMonth) -> Result<Vec<ScheduleMark>> {
        // Keys within one year share a prefix, so a text range is exact
        let first = format_date(year_month.first_day());
        let last = format_date(year_month.last_day());
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT date, isMarked FROM schedule WHERE date BETWEEN ?1 AND ?2",
            )?;
            let rows = stmt.query_map([first, last], |row| {
                let date: String = row.get(0)?;
                let is_marked: bool = row.get(1)?;
                Ok((date, is_marked))
            })?;
            let mut marks = Vec::new();
            for row in rows {
                let (date, is_marked) = row?;
                match parse_date(&date) {
                    Ok(date) if year_month.contains(date) => {
                        marks.push(ScheduleMark::new(date, is_marked))
                    }
                    Ok(_) => {}
                    Err(e) => tracing::warn!("Skipping schedule row: {}", e),
                }
            }
            Ok(marks)
        })
    }

    /// Live schedule marks: the current set, then one per committed change
    pub fn subscribe_schedule_marks(&self) -> Result<Subscription<ScheduleMark>> {
        let _guard = self.schedule.write_lock();
        let initial = self.with_conn(query_marks)?;
        Ok(self.schedule.subscribe(initial))
    }
}
