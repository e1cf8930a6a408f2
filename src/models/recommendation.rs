use serde::{Deserialize, Serialize};

use super::CourseFormat;

/// Which sub-model produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateSource {
    /// Collaborative filtering (latent-factor predictions)
    Cf,
    /// Content-based filtering (TF-IDF similarity)
    Cbf,
}

/// A candidate course as emitted by one source list, tagged at ingestion so
/// the blender never re-inspects payload shapes downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateItem {
    pub source: CandidateSource,
    pub course_id: String,
    /// 0-based position within the source list that produced this candidate
    pub rank: usize,
}

impl CandidateItem {
    /// Inverse-rank contribution of this candidate: `1 / (rank + 1)`.
    ///
    /// Both sources are scored on this convention so their contributions stay
    /// on a comparable scale without calibrating a 1-5 rating scale against a
    /// 0-1 similarity scale.
    pub fn inverse_rank_score(&self) -> f64 {
        1.0 / (self.rank as f64 + 1.0)
    }
}

/// A single blended recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub course_id: String,
    pub score: f64,
    pub recommended_mode: CourseFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_rank_score() {
        let item = CandidateItem {
            source: CandidateSource::Cf,
            course_id: "c1".into(),
            rank: 0,
        };
        assert_eq!(item.inverse_rank_score(), 1.0);

        let item = CandidateItem { rank: 3, ..item };
        assert_eq!(item.inverse_rank_score(), 0.25);
    }
}
