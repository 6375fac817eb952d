use std::sync::Arc;

use crate::resume::session::SessionRegistry;
use crate::store::StudentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn StudentStore>,
    pub sessions: SessionRegistry,
}
