//! Session context persistence with file locking.
//!
//! The session holds what the caller considers "current": the saved
//! profile, the meal plans generated so far and the last diet summary. It is
//! passed explicitly to operations and saved atomically between runs.

use crate::{files, Error, PlanRecord, Profile, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Caller-owned session context
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Session {
    #[serde(default)]
    pub profile: Option<Profile>,

    #[serde(default)]
    pub history: Vec<PlanRecord>,

    #[serde(default)]
    pub diet_summary: Option<String>,
}

impl Session {
    pub fn user_id(&self) -> Option<Uuid> {
        self.profile.as_ref().map(|p| p.user_id)
    }

    /// The current profile, or a validation error asking for one
    pub fn require_profile(&self) -> Result<&Profile> {
        self.profile.as_ref().ok_or_else(|| {
            Error::Validation("please fill out and save your profile first".into())
        })
    }

    /// Replace the current profile. A diet summary describes the previous
    /// user's meals and is dropped.
    pub fn set_profile(&mut self, profile: Profile) {
        if self.user_id() != Some(profile.user_id) {
            self.diet_summary = None;
        }
        self.profile = Some(profile);
    }

    /// Plan history, most recent first
    pub fn history_newest_first(&self) -> impl Iterator<Item = &PlanRecord> {
        self.history.iter().rev()
    }

    /// Load a session from a file with shared locking
    ///
    /// Returns the default session if the file doesn't exist.
    /// If the file is unreadable or corrupted, logs a warning and returns the
    /// default session.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match files::read_shared(path) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                tracing::info!("No session file found, starting a new session");
                return Ok(Self::default());
            }
            Err(e) => {
                tracing::warn!(
                    "Unable to read session file {:?}: {}. Starting a new session.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => {
                tracing::debug!("Loaded session from {:?}", path);
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse session file {:?}: {}. Starting a new session.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save the session atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        files::replace_atomic(path, &serde_json::to_vec(self)?)?;
        tracing::debug!("Saved session to {:?}", path);
        Ok(())
    }

    /// Load, modify and save back. Nothing is written if `f` fails.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut Session) -> Result<()>,
    {
        let mut session = Self::load(path)?;
        f(&mut session)?;
        session.save(path)?;
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::sample_input;
    use crate::PlanScope;
    use chrono::{NaiveDate, Utc};

    fn plan(day: u32, text: &str) -> PlanRecord {
        PlanRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            scope: PlanScope::OneDay,
            meal_plan: text.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");

        let mut session = Session::default();
        session.set_profile(Profile::from_input(sample_input(), Utc::now()).unwrap());
        session.history.push(plan(1, "oats"));
        session.diet_summary = Some("balanced".into());

        session.save(&path).unwrap();
        let loaded = Session::load(&path).unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let session = Session::load(&temp_dir.path().join("missing.json")).unwrap();
        assert!(session.profile.is_none());
        assert!(session.history.is_empty());
    }

    #[test]
    fn test_corrupted_session_returns_default() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let session = Session::load(&path).unwrap();
        assert_eq!(session, Session::default());
    }

    #[test]
    fn test_failed_update_leaves_file_unchanged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");

        let mut session = Session::default();
        session.history.push(plan(1, "first"));
        session.save(&path).unwrap();

        let result = Session::update(&path, |s| {
            s.history.push(plan(2, "second"));
            Err(Error::Generation("backend down".into()))
        });
        assert!(result.is_err());

        let loaded = Session::load(&path).unwrap();
        assert_eq!(loaded.history.len(), 1);
    }

    #[test]
    fn test_history_newest_first() {
        let mut session = Session::default();
        session.history.push(plan(1, "older"));
        session.history.push(plan(2, "newer"));
        let texts: Vec<&str> = session
            .history_newest_first()
            .map(|p| p.meal_plan.as_str())
            .collect();
        assert_eq!(texts, vec!["newer", "older"]);
    }

    #[test]
    fn test_require_profile() {
        let mut session = Session::default();
        assert!(matches!(
            session.require_profile(),
            Err(Error::Validation(_))
        ));
        session.set_profile(Profile::from_input(sample_input(), Utc::now()).unwrap());
        assert!(session.require_profile().is_ok());
        assert!(session.user_id().is_some());
    }

    #[test]
    fn test_atomic_save_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("session.json");
        Session::default().save(&path).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "session.json")
            .collect();
        assert!(extras.is_empty(), "unexpected files: {:?}", extras);
    }
}
