use std::sync::Arc;

use crate::engine::{ModelArtifactStore, Predictor};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
    pub store: Arc<ModelArtifactStore>,
}

impl AppState {
    /// Creates application state backed by the given artifact store.
    ///
    /// The predictor starts empty; the caller loads or trains a snapshot
    /// before recommendations can be served.
    pub fn new(store: ModelArtifactStore) -> Self {
        Self {
            predictor: Arc::new(Predictor::new()),
            store: Arc::new(store),
        }
    }
}
