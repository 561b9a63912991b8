//! Shared application state

use std::sync::Arc;

use refrain_core::{PracticeConfig, SessionOrchestrator, Storage};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub orchestrator: Arc<SessionOrchestrator<Storage>>,
}

impl AppState {
    pub fn new(storage: Arc<Storage>, practice: &PracticeConfig) -> Self {
        let orchestrator = SessionOrchestrator::new(Arc::clone(&storage), practice.review_scheduler())
            .with_fade_engine(practice.fade.clone())
            .with_xp_table(practice.xp.clone());
        Self {
            storage,
            orchestrator: Arc::new(orchestrator),
        }
    }
}
