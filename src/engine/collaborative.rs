use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AppError, AppResult};

use super::interactions::RatingMatrix;
use super::svd::TruncatedSvd;

/// Ceiling on the truncated-SVD rank; bounds compute on large catalogs while
/// still capturing most latent structure on small ones
const MAX_FACTORS: usize = 100;

/// Dense predicted-rating matrix reconstructed from the truncated SVD of the
/// rating matrix.
///
/// Axes and id maps are inherited from the `RatingMatrix` the model was
/// fitted on and stay fixed for the snapshot's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictedRatings {
    pub matrix: Array2<f64>,
    pub user_ids: Vec<String>,
    pub course_ids: Vec<String>,
    user_index: HashMap<String, usize>,
}

impl PredictedRatings {
    /// Fits the latent-factor model on a rating matrix.
    ///
    /// Nonzero ratings are min-max normalized into [0, 1] before the
    /// factorization (rank `min(100, min(dims) - 1)` — the rank must stay
    /// strictly below the smaller dimension or the factorization is
    /// undefined), then the reconstruction is mapped back onto the original
    /// rating scale. Matrices with fewer than 2 users or 2 courses skip the
    /// factorization entirely and produce an all-unset prediction surface.
    pub fn fit(ratings: &RatingMatrix) -> Self {
        let (users, courses) = ratings.matrix.dim();

        let matrix = if users < 2 || courses < 2 {
            tracing::warn!(
                users,
                courses,
                "Insufficient data for collaborative filtering; predictions left unset"
            );
            Array2::zeros((users, courses))
        } else {
            Self::factorize(&ratings.matrix)
        };

        Self {
            matrix,
            user_ids: ratings.user_ids.clone(),
            course_ids: ratings.course_ids.clone(),
            user_index: ratings
                .user_ids
                .iter()
                .enumerate()
                .map(|(i, id)| (id.clone(), i))
                .collect(),
        }
    }

    fn factorize(matrix: &Array2<f64>) -> Array2<f64> {
        let (users, courses) = matrix.dim();

        // Min over rated cells only; zeros mean "unset", not "rated zero"
        let min = matrix
            .iter()
            .filter(|&&v| v > 0.0)
            .cloned()
            .fold(f64::INFINITY, f64::min);
        if !min.is_finite() {
            return Array2::zeros((users, courses));
        }
        let max = matrix.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        let scaled = if range > 0.0 {
            matrix.mapv(|v| (v - min) / range)
        } else {
            Array2::zeros((users, courses))
        };

        let k = MAX_FACTORS.min(users.min(courses) - 1);
        let svd = TruncatedSvd::fit(&scaled, k);
        tracing::info!(
            users,
            courses,
            requested_rank = k,
            effective_rank = svd.rank(),
            "Collaborative filtering model trained"
        );

        // De-normalize back onto the original rating scale
        svd.reconstruct().mapv(|v| v * range + min)
    }

    /// Top-n courses for a user by predicted rating, best first.
    ///
    /// Ties keep column (sorted course id) order. Unknown users signal
    /// `NotFound`; cold-start handling is the blender's decision.
    pub fn top_n(&self, user_id: &str, n: usize) -> AppResult<Vec<(String, f64)>> {
        let &row = self
            .user_index
            .get(user_id)
            .ok_or_else(|| AppError::NotFound(format!("user '{}' has no prediction row", user_id)))?;

        let scores = self.matrix.row(row);
        let mut ranked: Vec<usize> = (0..self.course_ids.len()).collect();
        ranked.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(ranked
            .into_iter()
            .take(n)
            .map(|i| (self.course_ids[i].clone(), scores[i]))
            .collect())
    }

    /// Whether the model has a prediction row for the user
    pub fn contains_user(&self, user_id: &str) -> bool {
        self.user_index.contains_key(user_id)
    }
}
