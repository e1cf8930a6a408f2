use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::CourseFormat;

/// Declared or inferred learning style of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    Visual,
    Auditory,
    #[serde(rename = "reading/writing")]
    ReadingWriting,
    Kinesthetic,
}

impl LearningStyle {
    /// Fixed mapping from learning style to preferred course format
    pub fn preferred_format(&self) -> CourseFormat {
        match self {
            LearningStyle::Visual => CourseFormat::Video,
            LearningStyle::Auditory => CourseFormat::Video,
            LearningStyle::ReadingWriting => CourseFormat::Text,
            LearningStyle::Kinesthetic => CourseFormat::Live,
        }
    }
}

/// Progress record for a single course
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub course_id: String,
}

/// Request-scoped user profile supplied by the caller.
///
/// Never persisted by the engine; it seeds content-based candidates and
/// drives the enrolled-course filter and learning-mode annotation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub enrolled_courses: Vec<String>,
    #[serde(default)]
    pub progress: Vec<ProgressEntry>,
    #[serde(default)]
    pub learning_style: Option<LearningStyle>,
}

impl UserProfile {
    /// All course ids the user has enrolled in or made progress on,
    /// deduplicated in first-seen order.
    pub fn history(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut history = Vec::new();
        for id in self
            .enrolled_courses
            .iter()
            .chain(self.progress.iter().map(|p| &p.course_id))
        {
            if seen.insert(id.as_str()) {
                history.push(id.clone());
            }
        }
        history
    }
}
