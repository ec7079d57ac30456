//! Profile and diet-log persistence.
//!
//! Backends implement [`WellnessStore`], a single-table key-value contract:
//! put a full record, fetch a profile by `user_id`, scan diet logs by
//! `user_id`. Every record passes through [`record_payload`] before it is
//! stored, so empty optional fields are never persisted as placeholders.

use crate::{DietLogEntry, Error, NewLogEntry, Profile, ProfileInput, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

/// A stored record payload: field name to non-empty value
pub type Payload = Map<String, Value>;

/// Storage backend trait for profiles and diet logs
pub trait WellnessStore {
    /// Store a complete profile record, replacing any record with the same id
    fn put_profile(&mut self, profile: &Profile) -> Result<()>;

    fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;

    /// Store a complete diet log record, replacing any record with the same key
    fn put_log_entry(&mut self, entry: &DietLogEntry) -> Result<()>;

    /// All diet log entries for a user, in no particular order
    fn scan_log_entries(&self, user_id: Uuid) -> Result<Vec<DietLogEntry>>;
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Serialize a record and drop null, empty-string and empty-array fields
pub fn record_payload<T: Serialize>(record: &T) -> Result<Payload> {
    match serde_json::to_value(record)? {
        Value::Object(mut fields) => {
            fields.retain(|_, value| !is_empty_value(value));
            Ok(fields)
        }
        other => Err(Error::Storage(format!(
            "record must serialize to an object, got {}",
            other
        ))),
    }
}

/// Rebuild a record from a stored payload
pub fn from_payload<T: DeserializeOwned>(payload: &Payload) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(payload.clone()))?)
}

// ============================================================================
// Operations
// ============================================================================

/// Validate input, compute metrics and persist a new profile.
///
/// Returns the generated `user_id`. Calling twice creates two profiles.
pub fn create_profile<S>(store: &mut S, input: ProfileInput) -> Result<Uuid>
where
    S: WellnessStore + ?Sized,
{
    let profile = Profile::from_input(input, Utc::now())?;
    store.put_profile(&profile)?;
    tracing::info!(user_id = %profile.user_id, bmi = profile.bmi, "Created profile");
    Ok(profile.user_id)
}

/// Fetch a profile, failing with [`Error::NotFound`] when absent
pub fn get_profile<S>(store: &S, user_id: Uuid) -> Result<Profile>
where
    S: WellnessStore + ?Sized,
{
    store
        .get_profile(user_id)?
        .ok_or_else(|| Error::NotFound(format!("profile {}", user_id)))
}

/// Persist one meal log and return its generated `log_id`.
///
/// The user is not checked against stored profiles.
pub fn append_log_entry<S>(store: &mut S, new_entry: NewLogEntry) -> Result<Uuid>
where
    S: WellnessStore + ?Sized,
{
    let entry = DietLogEntry {
        log_id: Uuid::new_v4(),
        user_id: new_entry.user_id,
        date: new_entry.date,
        time: new_entry.time.trim().to_string(),
        meal_input_type: new_entry.meal_input_type,
        food_description: new_entry.food_description.trim().to_string(),
        likes_dislikes: new_entry
            .likes_dislikes
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty()),
    };
    store.put_log_entry(&entry)?;
    tracing::info!(user_id = %entry.user_id, log_id = %entry.log_id, "Logged meal");
    Ok(entry.log_id)
}

/// All entries for a user; ordering is left to the caller
pub fn list_log_entries<S>(store: &S, user_id: Uuid) -> Result<Vec<DietLogEntry>>
where
    S: WellnessStore + ?Sized,
{
    store.scan_log_entries(user_id)
}

// ============================================================================
// In-memory backend
// ============================================================================

/// In-memory reference backend, keyed like the single-table layout
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: HashMap<Uuid, Payload>,
    logs: HashMap<(Uuid, Uuid), Payload>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw stored payload for a profile
    pub fn profile_payload(&self, user_id: Uuid) -> Option<&Payload> {
        self.profiles.get(&user_id)
    }
}

impl WellnessStore for MemoryStore {
    fn put_profile(&mut self, profile: &Profile) -> Result<()> {
        self.profiles
            .insert(profile.user_id, record_payload(profile)?);
        Ok(())
    }

    fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        self.profiles.get(&user_id).map(from_payload).transpose()
    }

    fn put_log_entry(&mut self, entry: &DietLogEntry) -> Result<()> {
        self.logs
            .insert((entry.user_id, entry.log_id), record_payload(entry)?);
        Ok(())
    }

    fn scan_log_entries(&self, user_id: Uuid) -> Result<Vec<DietLogEntry>> {
        self.logs
            .iter()
            .filter(|((owner, _), _)| *owner == user_id)
            .map(|(_, payload)| from_payload(payload))
            .collect()
    }
}
