use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::models::Interaction;

/// Dense user x course rating matrix.
///
/// Row and column order is the sorted id order, fixed for the lifetime of a
/// snapshot; the id-to-index maps stored alongside must always match it.
/// Cells with no interaction hold 0.0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingMatrix {
    pub matrix: Array2<f64>,
    pub user_ids: Vec<String>,
    pub course_ids: Vec<String>,
    user_index: HashMap<String, usize>,
    course_index: HashMap<String, usize>,
}

impl RatingMatrix {
    /// Builds the rating matrix from raw interactions.
    ///
    /// Duplicate `(user, course)` pairs are aggregated by mean rating before
    /// the matrix is filled. The course axis covers the union of the catalog
    /// and the interacted courses, so collaborative filtering can surface
    /// catalog courses nobody has rated yet.
    pub fn build(interactions: &[Interaction], catalog_course_ids: &[String]) -> Self {
        // Aggregate duplicates: (user, course) -> (sum, count)
        let mut aggregated: HashMap<(&str, &str), (f64, usize)> = HashMap::new();
        for interaction in interactions {
            let entry = aggregated
                .entry((&interaction.user_id, &interaction.course_id))
                .or_insert((0.0, 0));
            entry.0 += interaction.rating;
            entry.1 += 1;
        }

        let user_ids: Vec<String> = interactions
            .iter()
            .map(|i| i.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let course_ids: Vec<String> = interactions
            .iter()
            .map(|i| i.course_id.clone())
            .chain(catalog_course_ids.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let user_index: HashMap<String, usize> = user_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        let course_index: HashMap<String, usize> = course_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut matrix = Array2::zeros((user_ids.len(), course_ids.len()));
        for ((user, course), (sum, count)) in aggregated {
            let row = user_index[user];
            let col = course_index[course];
            matrix[[row, col]] = sum / count as f64;
        }

        Self {
            matrix,
            user_ids,
            course_ids,
            user_index,
            course_index,
        }
    }

    /// Effective rating at `(user, course)`, or `None` when either id is
    /// unknown to the matrix
    pub fn get(&self, user_id: &str, course_id: &str) -> Option<f64> {
        let &row = self.user_index.get(user_id)?;
        let &col = self.course_index.get(course_id)?;
        Some(self.matrix[[row, col]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interaction(user: &str, course: &str, rating: f64) -> Interaction {
        Interaction {
            user_id: user.to_string(),
            course_id: course.to_string(),
            rating,
        }
    }

    #[test]
    fn test_duplicates_aggregated_by_mean() {
        let matrix = RatingMatrix::build(
            &[interaction("u1", "c1", 3.0), interaction("u1", "c1", 5.0)],
            &[],
        );
        assert_eq!(matrix.get("u1", "c1"), Some(4.0));
        assert_eq!(matrix.matrix.dim(), (1, 1));
    }

    #[test]
    fn test_unset_cells_are_zero() {
        let matrix = RatingMatrix::build(
            &[
                interaction("u1", "c1", 5.0),
                interaction("u2", "c2", 4.0),
            ],
            &[],
        );
        assert_eq!(matrix.get("u1", "c2"), Some(0.0));
        assert_eq!(matrix.get("u2", "c1"), Some(0.0));
    }

    #[test]
    fn test_axes_are_sorted_ids() {
        let matrix = RatingMatrix::build(
            &[
                interaction("u2", "c2", 4.0),
                interaction("u1", "c1", 5.0),
            ],
            &[],
        );
        assert_eq!(matrix.user_ids, vec!["u1", "u2"]);
        assert_eq!(matrix.course_ids, vec!["c1", "c2"]);
    }

    #[test]
    fn test_catalog_courses_become_columns() {
        let matrix = RatingMatrix::build(
            &[interaction("u1", "c1", 5.0)],
            &["c1".to_string(), "c9".to_string()],
        );
        assert_eq!(matrix.course_ids, vec!["c1", "c9"]);
        assert_eq!(matrix.get("u1", "c9"), Some(0.0));
    }

    #[test]
    fn test_unknown_ids_return_none() {
        let matrix = RatingMatrix::build(&[interaction("u1", "c1", 5.0)], &[]);
        assert_eq!(matrix.get("u9", "c1"), None);
        assert_eq!(matrix.get("u1", "c9"), None);
    }
}
