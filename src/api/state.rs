use std::sync::Arc;

use crate::{
    db::WatchHistory,
    services::{
        ComparisonService, CreditIngestion, FilmographyProvider, HistoryService, SeenReporter,
        SessionRegistry, SwipeConfig,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn FilmographyProvider>,
    pub history: Arc<dyn WatchHistory>,
    pub reporter: SeenReporter,
    pub sessions: SessionRegistry,
    pub comparison: ComparisonService,
    pub user_history: HistoryService,
    pub credits: CreditIngestion,
    /// Used for sessions whose client doesn't report a screen width
    pub swipe_config: SwipeConfig,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn FilmographyProvider>,
        history: Arc<dyn WatchHistory>,
        reporter: SeenReporter,
        swipe_config: SwipeConfig,
    ) -> Self {
        Self {
            comparison: ComparisonService::new(history.clone()),
            user_history: HistoryService::new(history.clone()),
            credits: CreditIngestion::new(provider.clone(), history.clone()),
            sessions: SessionRegistry::new(),
            provider,
            history,
            reporter,
            swipe_config,
        }
    }
}
