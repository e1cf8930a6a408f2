use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};
use crate::models::CourseFormat;

use super::collaborative::PredictedRatings;
use super::similarity::ContentSimilarityIndex;
use super::text::TfidfVectorizer;

/// Schema version of the persisted bundle; a loader refuses any other value
/// rather than silently misinterpreting the artifacts
pub const SNAPSHOT_VERSION: u32 = 1;

const SNAPSHOT_FILE: &str = "snapshot.json";
const SNAPSHOT_TMP_FILE: &str = "snapshot.json.tmp";

/// The atomic unit of trained state: everything the Predictor needs to serve
/// recommendations without retraining.
///
/// Created wholesale by the trainer, loaded wholesale at startup, replaced
/// wholesale on retraining. Never mutated field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub version: u32,
    pub trained_at: DateTime<Utc>,
    pub vectorizer: TfidfVectorizer,
    pub content: ContentSimilarityIndex,
    pub predictions: PredictedRatings,
    /// Stored course format per catalog course, for learning-mode annotation
    pub course_formats: HashMap<String, CourseFormat>,
}

/// File-backed persistence for model snapshots.
///
/// Writes go to a temporary file in the same directory followed by a rename,
/// so a concurrently starting Predictor never observes a half-written bundle.
#[derive(Debug, Clone)]
pub struct ModelArtifactStore {
    dir: PathBuf,
}

impl ModelArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persists a snapshot atomically (write-new-then-swap)
    pub fn save(&self, snapshot: &ModelSnapshot) -> AppResult<()> {
        fs::create_dir_all(&self.dir)?;

        let tmp_path = self.dir.join(SNAPSHOT_TMP_FILE);
        let final_path = self.dir.join(SNAPSHOT_FILE);

        let payload = serde_json::to_vec(snapshot)?;
        fs::write(&tmp_path, payload)?;
        fs::rename(&tmp_path, &final_path)?;

        tracing::info!(
            path = %final_path.display(),
            trained_at = %snapshot.trained_at,
            "Model snapshot saved"
        );
        Ok(())
    }

    /// Loads the latest snapshot.
    ///
    /// A missing bundle signals `ModelsNotInitialized`; a bundle with an
    /// unexpected schema version is refused outright.
    pub fn load(&self) -> AppResult<ModelSnapshot> {
        let path = self.dir.join(SNAPSHOT_FILE);
        let payload = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AppError::ModelsNotInitialized);
            }
            Err(e) => return Err(e.into()),
        };

        // Check the version before decoding the full bundle
        let value: serde_json::Value = serde_json::from_slice(&payload)?;
        let found = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| AppError::Internal("snapshot bundle has no version field".to_string()))?
            as u32;
        if found != SNAPSHOT_VERSION {
            return Err(AppError::SnapshotVersion {
                found,
                expected: SNAPSHOT_VERSION,
            });
        }

        let snapshot: ModelSnapshot = serde_json::from_value(value)?;
        tracing::info!(
            path = %path.display(),
            trained_at = %snapshot.trained_at,
            courses = snapshot.content.len(),
            users = snapshot.predictions.user_ids.len(),
            "Model snapshot loaded"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::trainer;
    use crate::models::{Interaction, RawCourse};

    fn sample_snapshot() -> ModelSnapshot {
        let courses = vec![
            RawCourse {
                id: "A".into(),
                subject: "Python Beginner".into(),
                format: Some("Video Course".into()),
                difficulty: None,
                text_summaries: vec![],
            },
            RawCourse {
                id: "B".into(),
                subject: "Python Advanced".into(),
                format: None,
                difficulty: None,
                text_summaries: vec![],
            },
        ];
        let interactions = vec![
            Interaction {
                user_id: "u1".into(),
                course_id: "A".into(),
                rating: 5.0,
            },
            Interaction {
                user_id: "u2".into(),
                course_id: "B".into(),
                rating: 3.0,
            },
        ];
        trainer::train(&courses, &interactions).unwrap()
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelArtifactStore::new(dir.path());
        let snapshot = sample_snapshot();

        store.save(&snapshot).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.version, SNAPSHOT_VERSION);
        assert_eq!(loaded.trained_at, snapshot.trained_at);
        assert_eq!(loaded.content.course_ids(), snapshot.content.course_ids());
        assert_eq!(loaded.predictions.user_ids, snapshot.predictions.user_ids);
        assert_eq!(
            loaded.content.nearest("A", 1).unwrap(),
            snapshot.content.nearest("A", 1).unwrap()
        );
    }

    #[test]
    fn test_load_without_snapshot_is_models_not_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelArtifactStore::new(dir.path());
        let err = store.load().unwrap_err();
        assert!(matches!(err, AppError::ModelsNotInitialized));
    }

    #[test]
    fn test_load_refuses_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelArtifactStore::new(dir.path());
        let snapshot = sample_snapshot();
        store.save(&snapshot).unwrap();

        // Doctor the persisted bundle to a future schema version
        let path = dir.path().join("snapshot.json");
        let mut value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        value["version"] = serde_json::json!(99);
        std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(
            err,
            AppError::SnapshotVersion {
                found: 99,
                expected: SNAPSHOT_VERSION
            }
        ));
    }

    #[test]
    fn test_save_replaces_previous_snapshot_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelArtifactStore::new(dir.path());

        let first = sample_snapshot();
        store.save(&first).unwrap();
        let second = sample_snapshot();
        store.save(&second).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.trained_at, second.trained_at);
        // No stray temp file left behind
        assert!(!dir.path().join("snapshot.json.tmp").exists());
    }
}
