//! JSON file persistence for the care ledger
//!
//! Each collection lives in its own file under the data directory. Files
//! are replaced atomically (temp file + rename) so a crash never leaves a
//! half-written collection behind.

mod debounce;

pub use debounce::DebouncedWriter;

use pet_care_shared::codec::{decode_collection, encode_collection};
use pet_care_shared::errors::CodecError;
use pet_care_shared::NotificationPreferences;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Storage errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Persisted collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Pets,
    Meals,
    CareTasks,
    CareHistory,
    DietAlerts,
    Preferences,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Pets,
        Collection::Meals,
        Collection::CareTasks,
        Collection::CareHistory,
        Collection::DietAlerts,
        Collection::Preferences,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Pets => "pets.json",
            Collection::Meals => "meals.json",
            Collection::CareTasks => "care_tasks.json",
            Collection::CareHistory => "care_history.json",
            Collection::DietAlerts => "diet_alerts.json",
            Collection::Preferences => "preferences.json",
        }
    }
}

/// File-backed store rooted at a data directory
#[derive(Debug, Clone)]
pub struct JsonStore {
    data_dir: PathBuf,
}

impl JsonStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    /// Create the data directory if needed
    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.data_dir).await?;
        Ok(())
    }

    /// Load a collection; a missing file is an empty collection
    pub async fn load<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, StoreError> {
        match self.read(collection).await? {
            Some(bytes) => Ok(decode_collection(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    /// Load preferences merged over defaults
    pub async fn load_preferences(&self) -> Result<NotificationPreferences, StoreError> {
        match self.read(Collection::Preferences).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes).map_err(CodecError::from)?),
            None => Ok(NotificationPreferences::default()),
        }
    }

    pub fn encode<T: Serialize>(items: &[T]) -> Result<Vec<u8>, StoreError> {
        Ok(encode_collection(items)?)
    }

    pub fn encode_preferences(preferences: &NotificationPreferences) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec_pretty(preferences).map_err(CodecError::from)?)
    }

    /// Replace a collection file atomically
    pub async fn write(&self, collection: Collection, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(collection);
        atomic_write(&path, bytes).await?;
        debug!(file = %path.display(), bytes = bytes.len(), "Collection written");
        Ok(())
    }

    async fn read(&self, collection: Collection) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(self.path_for(collection)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write to a temp file, then rename over the target
async fn atomic_write(path: &Path, content: &[u8]) -> Result<(), std::io::Error> {
    let tmp_path = path.with_extension(format!("tmp.{}", std::process::id()));
    tokio::fs::write(&tmp_path, content).await?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pet_care_shared::models::{MealRecord, MealType};
    use chrono::Utc;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());

        let meals: Vec<MealRecord> = store.load(Collection::Meals).await.unwrap();
        assert!(meals.is_empty());
        assert_eq!(store.load_preferences().await.unwrap(), NotificationPreferences::default());
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        let meal = MealRecord::planned(Uuid::new_v4(), MealType::Lunch, Utc::now(), "Kibble");

        let bytes = JsonStore::encode(&[meal.clone()]).unwrap();
        store.write(Collection::Meals, &bytes).await.unwrap();

        let loaded: Vec<MealRecord> = store.load(Collection::Meals).await.unwrap();
        assert_eq!(loaded, vec![meal]);
        let leftover = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftover, 1, "temp file was renamed away");
    }

    #[tokio::test]
    async fn test_partial_preferences_document_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        store
            .write(Collection::Preferences, br#"{"meal_reminders": false}"#)
            .await
            .unwrap();

        let prefs = store.load_preferences().await.unwrap();
        assert!(!prefs.meal_reminders);
        assert!(prefs.enabled);
        assert_eq!(prefs.care_reminder_minutes, 60);
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path());
        store.write(Collection::Pets, b"{not json").await.unwrap();

        let result: Result<Vec<MealRecord>, _> = store.load(Collection::Pets).await;
        assert!(matches!(result, Err(StoreError::Codec(_))));
    }
}
