use std::collections::HashSet;

use crate::models::{Course, CourseFormat, RawCourse};

const DEFAULT_DIFFICULTY: &str = "Beginner";

/// Normalizes raw course records into canonical `Course` values.
///
/// Builds the `combined_features` text blob (subject, format label,
/// difficulty, then any text summaries) consumed by the TF-IDF vectorizer.
/// Duplicate course ids keep their first occurrence; record order is
/// preserved so downstream index maps stay stable.
pub fn build_courses(raw: &[RawCourse]) -> Vec<Course> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut courses = Vec::with_capacity(raw.len());

    for record in raw {
        if !seen.insert(record.id.as_str()) {
            tracing::warn!(course_id = %record.id, "Duplicate course record skipped");
            continue;
        }

        let format = record
            .format
            .as_deref()
            .map(CourseFormat::from_label)
            .unwrap_or(CourseFormat::Mixed);
        let difficulty = record
            .difficulty
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string());

        let combined_features = std::iter::once(record.subject.as_str())
            .chain(std::iter::once(format.label()))
            .chain(std::iter::once(difficulty.as_str()))
            .chain(record.text_summaries.iter().map(|s| s.as_str()))
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ");

        courses.push(Course {
            id: record.id.clone(),
            subject: record.subject.clone(),
            format,
            difficulty,
            combined_features,
        });
    }

    courses
}
