//! Implements a struct that holds the state of the API server.

use std::sync::Arc;

use crate::dataset::Dataset;

/// The state shared by all request handlers.
///
/// The dataset is immutable after startup, so handlers only ever read it and
/// every derived view is recomputed per request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The loaded transaction dataset.
    pub dataset: Arc<Dataset>,
}

impl AppState {
    /// Create a new [AppState] holding `dataset`.
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }
}
