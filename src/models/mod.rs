pub mod course;
pub mod interaction;
pub mod profile;
pub mod recommendation;

pub use course::{Course, CourseFormat, RawCourse};
pub use interaction::Interaction;
pub use profile::{LearningStyle, ProgressEntry, UserProfile};
pub use recommendation::{CandidateItem, CandidateSource, Recommendation};
