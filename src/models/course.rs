use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Delivery format of a course, doubling as the recommended learning mode
/// surfaced to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseFormat {
    #[serde(rename = "Video Course")]
    Video,
    #[serde(rename = "Text-based Course")]
    Text,
    #[serde(rename = "Live Session")]
    Live,
    #[serde(rename = "Mixed")]
    Mixed,
}

impl CourseFormat {
    /// Parses a free-text format label from a raw course record.
    ///
    /// Catalog data is inconsistent about labels ("Video", "Video Course",
    /// "video"), so matching is by keyword. Unrecognized labels fall back to
    /// `Mixed`.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("video") {
            CourseFormat::Video
        } else if lower.contains("text") {
            CourseFormat::Text
        } else if lower.contains("live") {
            CourseFormat::Live
        } else {
            CourseFormat::Mixed
        }
    }

    /// Human-readable label, as stored in catalog records
    pub fn label(&self) -> &'static str {
        match self {
            CourseFormat::Video => "Video Course",
            CourseFormat::Text => "Text-based Course",
            CourseFormat::Live => "Live Session",
            CourseFormat::Mixed => "Mixed",
        }
    }
}

impl Display for CourseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Raw course record as supplied by the data-access collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCourse {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub text_summaries: Vec<String>,
}

/// Canonical course representation used for training.
///
/// Immutable once built into a snapshot; `combined_features` is the derived
/// text blob the TF-IDF vectorizer consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub subject: String,
    pub format: CourseFormat,
    pub difficulty: String,
    pub combined_features: String,
}
