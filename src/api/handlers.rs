use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::engine::{trainer, ModelSnapshot, DEFAULT_ALPHA, DEFAULT_TOP_N};
use crate::error::{AppError, AppResult};
use crate::models::{CourseFormat, Interaction, RawCourse, UserProfile};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub user_id: String,
    pub top_n: Option<usize>,
    pub alpha: Option<f64>,
    pub user_profile: Option<UserProfile>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<RecommendationDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationDto {
    pub course_id: String,
    pub score: f64,
    pub recommended_mode: CourseFormat,
}

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub course_id: String,
    pub top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CollaborativeQuery {
    pub user_id: String,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCourseDto {
    pub course_id: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    pub courses: Vec<RawCourse>,
    pub interactions: Vec<Interaction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainResponse {
    pub courses: usize,
    pub users: usize,
    pub interactions: usize,
    pub trained_at: chrono::DateTime<chrono::Utc>,
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn validated_top_n(top_n: Option<usize>) -> AppResult<usize> {
    match top_n {
        Some(0) => Err(AppError::InvalidInput(
            "'topN' must be a positive integer".to_string(),
        )),
        Some(n) => Ok(n),
        None => Ok(DEFAULT_TOP_N),
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Hybrid recommendations for a user
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::InvalidInput("'userId' must not be empty".to_string()));
    }
    let top_n = validated_top_n(request.top_n)?;
    let alpha = request.alpha.unwrap_or(DEFAULT_ALPHA);
    if !(0.0..=1.0).contains(&alpha) {
        return Err(AppError::InvalidInput(format!(
            "'alpha' must be within [0, 1], got {}",
            alpha
        )));
    }

    let recommendations = state
        .predictor
        .recommend(&request.user_id, top_n, alpha, request.user_profile.as_ref())
        .await?;

    tracing::info!(
        user_id = %request.user_id,
        top_n,
        alpha,
        returned = recommendations.len(),
        "Hybrid recommendations served"
    );

    Ok(Json(RecommendationResponse {
        recommendations: recommendations
            .into_iter()
            .map(|r| RecommendationDto {
                course_id: r.course_id,
                score: round4(r.score),
                recommended_mode: r.recommended_mode,
            })
            .collect(),
    }))
}

/// Content-based neighbors of a single course
pub async fn similar_courses(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> AppResult<Json<Value>> {
    let top_n = validated_top_n(query.top_n)?;
    let similar = state.predictor.similar_courses(&query.course_id, top_n).await?;

    let recommendations: Vec<RankedCourseDto> = similar
        .into_iter()
        .map(|(course_id, score)| RankedCourseDto {
            course_id,
            score: round4(score),
        })
        .collect();

    Ok(Json(json!({
        "courseId": query.course_id,
        "recommendations": recommendations,
    })))
}

/// Raw collaborative-filtering ranking for a user
pub async fn collaborative(
    State(state): State<AppState>,
    Query(query): Query<CollaborativeQuery>,
) -> AppResult<Json<Value>> {
    let top_n = validated_top_n(query.top_n)?;
    let ranked = state.predictor.top_for_user(&query.user_id, top_n).await?;

    let recommendations: Vec<RankedCourseDto> = ranked
        .into_iter()
        .map(|(course_id, score)| RankedCourseDto {
            course_id,
            score: round4(score),
        })
        .collect();

    Ok(Json(json!({
        "userId": query.user_id,
        "recommendations": recommendations,
    })))
}

/// Trains both sub-models from scratch, persists the snapshot atomically and
/// swaps it into the serving path
pub async fn train(
    State(state): State<AppState>,
    Json(request): Json<TrainRequest>,
) -> AppResult<Json<TrainResponse>> {
    let interaction_count = request.interactions.len();
    let store = state.store.clone();
    let snapshot = tokio::task::spawn_blocking(move || -> AppResult<ModelSnapshot> {
        let snapshot = trainer::train(&request.courses, &request.interactions)?;
        store.save(&snapshot)?;
        Ok(snapshot)
    })
    .await
    .map_err(|e| AppError::Internal(format!("training task failed: {}", e)))??;

    let response = TrainResponse {
        courses: snapshot.content.len(),
        users: snapshot.predictions.user_ids.len(),
        interactions: interaction_count,
        trained_at: snapshot.trained_at,
    };
    state.predictor.install(snapshot).await;

    Ok(Json(response))
}

/// Reloads the latest persisted snapshot without retraining
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let store = state.store.clone();
    let snapshot = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(|e| AppError::Internal(format!("reload task failed: {}", e)))??;

    let trained_at = snapshot.trained_at;
    state.predictor.install(snapshot).await;

    Ok(Json(json!({
        "status": "reloaded",
        "trainedAt": trained_at,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(1.0), 1.0);
        assert_eq!(round4(0.00004), 0.0);
    }

    #[test]
    fn test_validated_top_n() {
        assert_eq!(validated_top_n(None).unwrap(), DEFAULT_TOP_N);
        assert_eq!(validated_top_n(Some(3)).unwrap(), 3);
        assert!(matches!(
            validated_top_n(Some(0)),
            Err(AppError::InvalidInput(_))
        ));
    }
}
