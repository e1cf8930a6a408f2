use std::collections::{HashMap, HashSet};

use crate::models::{CandidateItem, CandidateSource, CourseFormat, Recommendation, UserProfile};

use super::snapshot::ModelSnapshot;

/// Default number of recommendations returned
pub const DEFAULT_TOP_N: usize = 5;
/// Default weight of the collaborative-filtering signal
pub const DEFAULT_ALPHA: f64 = 0.6;

/// Candidates pulled from the CF list per requested result slot
const CF_POOL_FACTOR: usize = 5;
/// Candidates pulled from each enrolled-course seed's nearest list
const CBF_SEED_FACTOR: usize = 3;
/// Aggregated CBF candidates kept after merging the per-seed lists
const CBF_POOL_FACTOR: usize = 2;

/// Blends collaborative and content-based candidate lists into one ranked,
/// filtered, learning-mode-annotated result.
///
/// Both sources are scored by inverse rank (`1 / (rank + 1)`) rather than raw
/// predicted ratings or similarity scores; this keeps the two signals on a
/// comparable scale without calibrating between them. A pure function of the
/// loaded snapshot and the request: identical inputs produce identical
/// output.
pub struct HybridBlender<'a> {
    snapshot: &'a ModelSnapshot,
}

impl<'a> HybridBlender<'a> {
    pub fn new(snapshot: &'a ModelSnapshot) -> Self {
        Self { snapshot }
    }

    /// Produces up to `top_n` recommendations for the user.
    ///
    /// `alpha` weights the CF contribution, `1 - alpha` the CBF contribution.
    /// Sub-model misses (user without a prediction row, enrolled course
    /// missing from the catalog) contribute zero instead of failing; a user
    /// unknown to both sources yields an empty list. Courses already in the
    /// user's history never appear in the result, and the list is not padded
    /// when fewer than `top_n` candidates survive filtering.
    pub fn recommend(
        &self,
        user_id: &str,
        top_n: usize,
        alpha: f64,
        profile: Option<&UserProfile>,
    ) -> Vec<Recommendation> {
        let history = profile.map(UserProfile::history).unwrap_or_default();

        let cf_candidates = self.cf_candidates(user_id, top_n);
        let cbf_candidates = self.cbf_candidates(&history, top_n);

        // Per-source inverse-rank scores; CBF contributions from multiple
        // seed lists accumulate per course
        let mut cf_scores: HashMap<&str, f64> = HashMap::new();
        for item in &cf_candidates {
            cf_scores.insert(item.course_id.as_str(), item.inverse_rank_score());
        }
        let cbf_scores = Self::aggregate_cbf(&cbf_candidates, top_n * CBF_POOL_FACTOR);

        // Candidate union in discovery order keeps tie-breaking deterministic
        let mut ordered: Vec<&str> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        for item in cf_candidates.iter().chain(cbf_candidates.iter()) {
            if seen.insert(item.course_id.as_str()) {
                ordered.push(item.course_id.as_str());
            }
        }

        let history_set: HashSet<&str> = history.iter().map(String::as_str).collect();
        let mut blended: Vec<(&str, f64)> = ordered
            .into_iter()
            .filter(|id| !history_set.contains(id))
            .map(|id| {
                let cf = cf_scores.get(id).copied().unwrap_or(0.0);
                let cbf = cbf_scores.get(id).copied().unwrap_or(0.0);
                (id, alpha * cf + (1.0 - alpha) * cbf)
            })
            .collect();
        blended.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        blended.truncate(top_n);

        blended
            .into_iter()
            .map(|(id, score)| Recommendation {
                course_id: id.to_string(),
                score,
                recommended_mode: self.recommended_mode(id, profile),
            })
            .collect()
    }

    /// CF candidate list; a user without a prediction row contributes nothing
    fn cf_candidates(&self, user_id: &str, top_n: usize) -> Vec<CandidateItem> {
        match self
            .snapshot
            .predictions
            .top_n(user_id, top_n * CF_POOL_FACTOR)
        {
            Ok(ranked) => ranked
                .into_iter()
                .enumerate()
                .map(|(rank, (course_id, _))| CandidateItem {
                    source: CandidateSource::Cf,
                    course_id,
                    rank,
                })
                .collect(),
            Err(_) => {
                tracing::debug!(user_id, "User absent from CF matrix; CF contributes nothing");
                Vec::new()
            }
        }
    }

    /// CBF candidates from every course in the user's history.
    ///
    /// Empty history means CBF contributes nothing; there is deliberately no
    /// popularity fallback here (extension point for a collaborator).
    fn cbf_candidates(&self, history: &[String], top_n: usize) -> Vec<CandidateItem> {
        let mut candidates = Vec::new();
        for seed in history {
            match self.snapshot.content.nearest(seed, top_n * CBF_SEED_FACTOR) {
                Ok(similar) => {
                    candidates.extend(similar.into_iter().enumerate().map(
                        |(rank, (course_id, _))| CandidateItem {
                            source: CandidateSource::Cbf,
                            course_id,
                            rank,
                        },
                    ));
                }
                Err(_) => {
                    tracing::debug!(seed = %seed, "Enrolled course not in content index; seed skipped");
                }
            }
        }
        candidates
    }

    /// Sums inverse-rank contributions per course across seed lists and keeps
    /// the strongest `keep` entries
    fn aggregate_cbf(candidates: &[CandidateItem], keep: usize) -> HashMap<&str, f64> {
        let mut order: Vec<&str> = Vec::new();
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for item in candidates {
            let id = item.course_id.as_str();
            if !totals.contains_key(id) {
                order.push(id);
            }
            *totals.entry(id).or_insert(0.0) += item.inverse_rank_score();
        }

        let mut ranked: Vec<&str> = order;
        ranked.sort_by(|a, b| {
            totals[b]
                .partial_cmp(&totals[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(keep);

        let kept: HashSet<&str> = ranked.into_iter().collect();
        totals.retain(|id, _| kept.contains(id));
        totals
    }

    /// Learning mode for a recommended course.
    ///
    /// A specific stored format wins; `Mixed` is the "no specific format"
    /// value and defers to the user's declared learning style, falling back
    /// to `Mixed` when neither is available.
    fn recommended_mode(&self, course_id: &str, profile: Option<&UserProfile>) -> CourseFormat {
        match self.snapshot.course_formats.get(course_id) {
            Some(&format) if format != CourseFormat::Mixed => format,
            _ => profile
                .and_then(|p| p.learning_style)
                .map(|style| style.preferred_format())
                .unwrap_or(CourseFormat::Mixed),
        }
    }
}
