use chrono::Utc;

use crate::error::AppResult;
use crate::models::{Interaction, RawCourse};

use super::collaborative::PredictedRatings;
use super::features;
use super::interactions::RatingMatrix;
use super::similarity::ContentSimilarityIndex;
use super::snapshot::{ModelSnapshot, SNAPSHOT_VERSION};

/// Runs a full training pass over the supplied data.
///
/// Both sub-models are recomputed from scratch; there is no incremental
/// update path by design. The returned snapshot is the complete, immutable
/// artifact the Predictor serves from.
pub fn train(raw_courses: &[RawCourse], interactions: &[Interaction]) -> AppResult<ModelSnapshot> {
    let courses = features::build_courses(raw_courses);
    tracing::info!(
        courses = courses.len(),
        interactions = interactions.len(),
        "Starting training run"
    );

    let (vectorizer, content) = ContentSimilarityIndex::build(&courses)?;
    tracing::info!(
        courses = content.len(),
        vocabulary = vectorizer.vocabulary_len(),
        "Content-based model trained"
    );

    let catalog_ids: Vec<String> = courses.iter().map(|c| c.id.clone()).collect();
    let ratings = RatingMatrix::build(interactions, &catalog_ids);
    let predictions = PredictedRatings::fit(&ratings);

    let course_formats = courses.iter().map(|c| (c.id.clone(), c.format)).collect();

    Ok(ModelSnapshot {
        version: SNAPSHOT_VERSION,
        trained_at: Utc::now(),
        vectorizer,
        content,
        predictions,
        course_formats,
    })
}
