//! Local record store backed by SQLite.
//!
//! One `RecordStore` owns the database for the lifetime of the process. It is
//! constructed explicitly and shared by reference (or `Arc`) with whatever
//! needs it; opening the same file a second time fails with
//! [`Error::StoreLocked`] while the first instance is alive.
//!
//! Mutations are serialized per table: each table has a write lock held across
//! the SQL write, the snapshot query and the publish, so subscribers see
//! snapshots in commit order and never before the commit.

use crate::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use crate::subscription::{Publisher, Subscription};
use crate::{CalorieHistoryEntry, Error, Result, ScheduleMark, WorkoutRecord};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use rusqlite::Connection;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Write lock and live subscribers for one table
pub(crate) struct Table<T> {
    write: Mutex<()>,
    pub(crate) publisher: Publisher<T>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            write: Mutex::new(()),
            publisher: Publisher::new(),
        }
    }

    /// Serialize a mutation against this table
    pub(crate) fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.write
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn subscribe(&self, initial: Vec<T>) -> Subscription<T> {
        self.publisher.subscribe(initial)
    }
}

/// Durable, observable CRUD over workouts, schedule marks and calorie history
pub struct RecordStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    // Held for the lifetime of the store; released on drop
    _lock: Option<File>,
    pub(crate) workouts: Table<WorkoutRecord>,
    pub(crate) schedule: Table<ScheduleMark>,
    pub(crate) calories: Table<CalorieHistoryEntry>,
}

impl RecordStore {
    /// Open or create the store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let lock = acquire_lock(path)?;
        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn, Some(path.to_path_buf()), Some(lock))?;

        tracing::info!("Opened record store at {:?}", path);
        Ok(store)
    }

    /// Open a private in-memory store (tests and dry runs)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, None, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>, lock: Option<File>) -> Result<Self> {
        initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
            _lock: lock,
            workouts: Table::new(),
            schedule: Table::new(),
            calories: Table::new(),
        })
    }

    /// Database file path, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` with exclusive access to the connection
    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(f(&conn)?)
    }
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

fn acquire_lock(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path(path))?;

    if file.try_lock_exclusive().is_err() {
        tracing::warn!("Record store {:?} is locked by another instance", path);
        return Err(Error::StoreLocked(path.to_path_buf()));
    }
    Ok(file)
}

fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_VERSION_TABLE)?;

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    if version < 1 {
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
            [CURRENT_VERSION],
        )?;
        tracing::info!("Created record store schema version {}", CURRENT_VERSION);
    }

    Ok(())
}

/// Convert a stored millisecond timestamp from column `col`
pub(crate) fn millis_to_datetime(col: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(col, millis))
}
