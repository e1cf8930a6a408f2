use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{Recommendation, UserProfile};

use super::blender::HybridBlender;
use super::snapshot::ModelSnapshot;

/// Serves recommendations against an immutable, in-memory snapshot.
///
/// Requests clone an `Arc` to the current snapshot and compute against it
/// lock-free; retraining or reloading installs a whole new snapshot by
/// swapping that reference, so in-flight reads never observe mixed state.
#[derive(Debug, Default)]
pub struct Predictor {
    snapshot: RwLock<Option<Arc<ModelSnapshot>>>,
}

impl Predictor {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
        }
    }

    /// Atomically installs a new snapshot as the serving state
    pub async fn install(&self, snapshot: ModelSnapshot) {
        let trained_at = snapshot.trained_at;
        *self.snapshot.write().await = Some(Arc::new(snapshot));
        tracing::info!(trained_at = %trained_at, "Snapshot installed for serving");
    }

    /// The currently served snapshot, or `ModelsNotInitialized` when no
    /// training artifacts have been loaded yet
    pub async fn current(&self) -> AppResult<Arc<ModelSnapshot>> {
        self.snapshot
            .read()
            .await
            .clone()
            .ok_or(AppError::ModelsNotInitialized)
    }

    /// Blended recommendations for a user
    pub async fn recommend(
        &self,
        user_id: &str,
        top_n: usize,
        alpha: f64,
        profile: Option<&UserProfile>,
    ) -> AppResult<Vec<Recommendation>> {
        let snapshot = self.current().await?;
        Ok(HybridBlender::new(&snapshot).recommend(user_id, top_n, alpha, profile))
    }

    /// Content-based neighbors of a single course
    pub async fn similar_courses(
        &self,
        course_id: &str,
        top_n: usize,
    ) -> AppResult<Vec<(String, f64)>> {
        let snapshot = self.current().await?;
        snapshot.content.nearest(course_id, top_n)
    }

    /// Raw collaborative-filtering ranking for a user
    pub async fn top_for_user(&self, user_id: &str, top_n: usize) -> AppResult<Vec<(String, f64)>> {
        let snapshot = self.current().await?;
        snapshot.predictions.top_n(user_id, top_n)
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
                format: None,
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
                rating: 4.0,
            },
        ];
        trainer::train(&courses, &interactions).unwrap()
    }

    #[tokio::test]
    async fn test_uninitialized_predictor_signals_models_not_initialized() {
        let predictor = Predictor::new();
        let err = predictor.recommend("u1", 5, 0.6, None).await.unwrap_err();
        assert!(matches!(err, AppError::ModelsNotInitialized));

        let err = predictor.similar_courses("A", 5).await.unwrap_err();
        assert!(matches!(err, AppError::ModelsNotInitialized));
    }

    #[tokio::test]
    async fn test_install_makes_snapshot_servable() {
        let predictor = Predictor::new();
        predictor.install(sample_snapshot()).await;

        let similar = predictor.similar_courses("A", 1).await.unwrap();
        assert_eq!(similar[0].0, "B");

        let recs = predictor.recommend("u1", 5, 1.0, None).await.unwrap();
        assert!(!recs.is_empty());
    }

    #[tokio::test]
    async fn test_install_swaps_snapshot_wholesale() {
        let predictor = Predictor::new();
        predictor.install(sample_snapshot()).await;
        let first = predictor.current().await.unwrap();

        predictor.install(sample_snapshot()).await;
        let second = predictor.current().await.unwrap();

        // Old handles stay valid; new requests see the new snapshot
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.content.len(), second.content.len());
    }
}
