use std::sync::Arc;

use crate::config::Config;
use crate::dialogue::DialogueEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the session store and every collaborator behind `Arc<dyn ..>`.
    pub engine: Arc<DialogueEngine>,
    pub config: Config,
}
