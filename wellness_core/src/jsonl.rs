//! Single-table JSON Lines store.
//!
//! Profiles and diet logs share one append-only `<table>.jsonl` file. Each
//! line is a tagged record payload. Appends take an exclusive file lock and
//! reads take a shared lock, so several processes can use the same table.
//! A later put with the same key replaces the earlier one on read.

use crate::store::{from_payload, record_payload, Payload, WellnessStore};
use crate::{DietLogEntry, Profile, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One line of the table file
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum TableRecord {
    Profile(Payload),
    DietLog(Payload),
}

/// JSONL-backed store with file locking
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    /// Create a store for the given table file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `<data_dir>/<table>.jsonl`
    pub fn in_dir(data_dir: &Path, table: &str) -> Self {
        Self::new(data_dir.join(format!("{}.jsonl", table)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    fn append(&self, record: &TableRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.sync_data()?;
        file.unlock()?;
        Ok(())
    }

    /// Read every well-formed record, skipping lines that fail to parse
    fn read_records(&self) -> Result<Vec<TableRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let reader = BufReader::new(&file);
        let mut records = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<TableRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        "Skipping malformed record at {:?} line {}: {}",
                        self.path,
                        line_num + 1,
                        e
                    );
                }
            }
        }

        file.unlock()?;
        tracing::debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }
}

fn uuid_field(payload: &Payload, field: &str) -> Option<Uuid> {
    payload
        .get(field)
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}

impl WellnessStore for JsonlStore {
    fn put_profile(&mut self, profile: &Profile) -> Result<()> {
        self.append(&TableRecord::Profile(record_payload(profile)?))?;
        tracing::debug!("Appended profile {} to {:?}", profile.user_id, self.path);
        Ok(())
    }

    fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let latest = self
            .read_records()?
            .into_iter()
            .filter_map(|record| match record {
                TableRecord::Profile(payload)
                    if uuid_field(&payload, "user_id") == Some(user_id) =>
                {
                    Some(payload)
                }
                _ => None,
            })
            .last();

        latest.as_ref().map(from_payload).transpose()
    }

    fn put_log_entry(&mut self, entry: &DietLogEntry) -> Result<()> {
        self.append(&TableRecord::DietLog(record_payload(entry)?))?;
        tracing::debug!("Appended diet log {} to {:?}", entry.log_id, self.path);
        Ok(())
    }

    fn scan_log_entries(&self, user_id: Uuid) -> Result<Vec<DietLogEntry>> {
        let mut order = Vec::new();
        let mut by_key: HashMap<Uuid, Payload> = HashMap::new();

        for record in self.read_records()? {
            let TableRecord::DietLog(payload) = record else {
                continue;
            };
            if uuid_field(&payload, "user_id") != Some(user_id) {
                continue;
            }
            let Some(log_id) = uuid_field(&payload, "log_id") else {
                tracing::warn!("Skipping diet log without log_id in {:?}", self.path);
                continue;
            };
            if by_key.insert(log_id, payload).is_none() {
                order.push(log_id);
            }
        }

        let mut entries = Vec::with_capacity(order.len());
        for log_id in order {
            if let Some(payload) = by_key.get(&log_id) {
                match from_payload::<DietLogEntry>(payload) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => tracing::warn!("Skipping unreadable diet log {}: {}", log_id, e),
                }
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::sample_input;
    use crate::store::{append_log_entry, create_profile, get_profile, list_log_entries};
    use crate::{MealInputType, NewLogEntry};
    use chrono::NaiveDate;

    fn new_entry(user_id: Uuid, day: u32, time: &str) -> NewLogEntry {
        NewLogEntry {
            user_id,
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            time: time.into(),
            meal_input_type: MealInputType::Text,
            food_description: "salad".into(),
            likes_dislikes: Some("too salty".into()),
        }
    }

    #[test]
    fn test_profile_roundtrip_through_file() {
        crate::logging::init_test();
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::in_dir(temp_dir.path(), "wellness-app");

        let user_id = create_profile(&mut store, sample_input()).unwrap();

        let reopened = JsonlStore::in_dir(temp_dir.path(), "wellness-app");
        let profile = get_profile(&reopened, user_id).unwrap();
        assert_eq!(profile.user_id, user_id);
        assert_eq!(profile.bmr, 1649);
        assert_eq!(profile.tdee, 1979);
        assert_eq!(profile.goals, vec!["Lose weight"]);
    }

    #[test]
    fn test_logs_and_profiles_share_one_table() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::in_dir(temp_dir.path(), "wellness-app");

        let user_id = create_profile(&mut store, sample_input()).unwrap();
        append_log_entry(&mut store, new_entry(user_id, 1, "08:00 AM")).unwrap();
        append_log_entry(&mut store, new_entry(user_id, 2, "12:30 PM")).unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.contains("\"record\":\"profile\""));
        assert!(contents.contains("\"record\":\"diet_log\""));

        let entries = list_log_entries(&store, user_id).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].likes_dislikes.as_deref(), Some("too salty"));
    }

    #[test]
    fn test_repeated_put_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::in_dir(temp_dir.path(), "t");
        let user_id = Uuid::new_v4();

        append_log_entry(&mut store, new_entry(user_id, 1, "08:00 AM")).unwrap();
        let entry = list_log_entries(&store, user_id).unwrap().remove(0);
        store.put_log_entry(&entry).unwrap();

        assert_eq!(list_log_entries(&store, user_id).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_table_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::in_dir(temp_dir.path(), "nonexistent");
        assert!(list_log_entries(&store, Uuid::new_v4()).unwrap().is_empty());
        assert!(store.get_profile(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonlStore::in_dir(temp_dir.path(), "t");
        let user_id = Uuid::new_v4();

        append_log_entry(&mut store, new_entry(user_id, 1, "08:00 AM")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(store.path()).unwrap();
            writeln!(file, "{{ not json }}").unwrap();
        }
        append_log_entry(&mut store, new_entry(user_id, 2, "09:00 AM")).unwrap();

        assert_eq!(list_log_entries(&store, user_id).unwrap().len(), 2);
    }
}
