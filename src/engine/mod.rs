pub mod blender;
pub mod collaborative;
pub mod features;
pub mod interactions;
pub mod predictor;
pub mod similarity;
pub mod snapshot;
pub mod svd;
pub mod text;
pub mod trainer;

pub use blender::{HybridBlender, DEFAULT_ALPHA, DEFAULT_TOP_N};
pub use collaborative::PredictedRatings;
pub use interactions::RatingMatrix;
pub use predictor::Predictor;
pub use similarity::ContentSimilarityIndex;
pub use snapshot::{ModelArtifactStore, ModelSnapshot, SNAPSHOT_VERSION};
pub use text::TfidfVectorizer;
pub use trainer::train;
