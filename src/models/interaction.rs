use serde::{Deserialize, Serialize};

/// A single user-course interaction with a rating in the 1-5 range.
///
/// Enrollment-only signals are expected to arrive already defaulted into that
/// range by the data-access collaborator. Duplicate `(user, course)` pairs are
/// aggregated by mean before matrix construction, never silently overwritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub user_id: String,
    pub course_id: String,
    pub rating: f64,
}
