//! CSV export of workout history.
//!
//! The file is written atomically: rows go to a temp file in the target
//! directory, which is synced and then renamed over the destination.

use crate::{Error, Result, WorkoutRecord};
use std::path::Path;
use tempfile::NamedTempFile;

/// A row in the CSV output
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct CsvRow {
    id: i64,
    name: String,
    progress: f32,
    image: String,
    created_at: String,
}

impl From<&WorkoutRecord> for CsvRow {
    fn from(record: &WorkoutRecord) -> Self {
        CsvRow {
            id: record.id,
            name: record.name.clone(),
            progress: record.progress,
            image: record.image_ref.clone(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Write `records` to `path` as CSV, replacing any existing file
///
/// Returns the number of rows written.
pub fn export_workouts_csv(records: &[WorkoutRecord], path: &Path) -> Result<usize> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .from_writer(temp.as_file());
        for record in records {
            writer.serialize(CsvRow::from(record))?;
        }
        writer.flush()?;
    }

    // Flush and sync before the rename makes the file visible
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} workouts to {:?}", records.len(), path);
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewWorkout, RecordStore};

    #[test]
    fn test_export_writes_all_rows() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("history.csv");

        let store = RecordStore::open_in_memory().unwrap();
        store.insert_workout(NewWorkout::new("10 SQUATS", 0.9, "workout_squat")).unwrap();
        store.insert_workout(NewWorkout::new("20 LUNGES", 0.3, "workout_3")).unwrap();

        let count = export_workouts_csv(&store.workouts().unwrap(), &csv_path).unwrap();
        assert_eq!(count, 2);

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let rows: Vec<CsvRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "20 LUNGES");
        assert_eq!(rows[1].image, "workout_squat");
    }

    #[test]
    fn test_export_replaces_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("history.csv");
        std::fs::write(&csv_path, "stale contents\n").unwrap();

        let count = export_workouts_csv(&[], &csv_path).unwrap();
        assert_eq!(count, 0);

        let contents = std::fs::read_to_string(&csv_path).unwrap();
        assert!(!contents.contains("stale"));

        // No stray temp files left behind
        let entries = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
