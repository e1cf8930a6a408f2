use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::Course;

use super::text::TfidfVectorizer;

/// Pairwise cosine-similarity index over the course catalog.
///
/// The matrix is square, symmetric, and unit-diagonal, computed once per
/// training run and never mutated afterwards. Row and column order follows
/// catalog order and matches `course_ids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSimilarityIndex {
    matrix: Array2<f64>,
    course_ids: Vec<String>,
    course_index: HashMap<String, usize>,
}

impl ContentSimilarityIndex {
    /// Builds the TF-IDF space and the full similarity matrix.
    ///
    /// O(n²) in catalog size, which is acceptable because catalogs are small
    /// relative to interaction volume. Returns the fitted vectorizer alongside
    /// the index so both can be persisted in the same snapshot.
    pub fn build(courses: &[Course]) -> AppResult<(TfidfVectorizer, Self)> {
        if courses.is_empty() {
            return Err(AppError::InsufficientData(
                "cannot build similarity index over an empty catalog".to_string(),
            ));
        }

        let documents: Vec<String> = courses
            .iter()
            .map(|c| c.combined_features.clone())
            .collect();
        let (vectorizer, tfidf) = TfidfVectorizer::fit_transform(&documents)?;

        // Rows are l2-normalized, so cosine similarity is a plain dot product
        let mut matrix = tfidf.dot(&tfidf.t());
        for i in 0..matrix.nrows() {
            matrix[[i, i]] = 1.0;
        }

        let course_ids: Vec<String> = courses.iter().map(|c| c.id.clone()).collect();
        let course_index = course_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        Ok((
            vectorizer,
            Self {
                matrix,
                course_ids,
                course_index,
            },
        ))
    }

    /// Top-k most similar courses to `course_id`, best first.
    ///
    /// The query course itself is excluded by index, not by score, so a
    /// textually identical sibling course legitimately scores 1.0 and stays
    /// in the result. Ties keep catalog order (stable sort).
    pub fn nearest(&self, course_id: &str, k: usize) -> AppResult<Vec<(String, f64)>> {
        let &idx = self
            .course_index
            .get(course_id)
            .ok_or_else(|| AppError::NotFound(format!("course '{}' not in catalog", course_id)))?;

        let row = self.matrix.row(idx);
        let mut ranked: Vec<usize> = (0..self.course_ids.len()).filter(|&i| i != idx).collect();
        ranked.sort_by(|&a, &b| {
            row[b].partial_cmp(&row[a]).unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(ranked
            .into_iter()
            .take(k)
            .map(|i| (self.course_ids[i].clone(), row[i]))
            .collect())
    }

    /// Whether the catalog contains the given course
    pub fn contains(&self, course_id: &str) -> bool {
        self.course_index.contains_key(course_id)
    }

    /// Number of courses in the index
    pub fn len(&self) -> usize {
        self.course_ids.len()
    }

    /// True when the index holds no courses
    pub fn is_empty(&self) -> bool {
        self.course_ids.is_empty()
    }

    /// The raw similarity matrix
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Catalog course ids in row order
    pub fn course_ids(&self) -> &[String] {
        &self.course_ids
    }
}
