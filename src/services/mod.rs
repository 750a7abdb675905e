pub mod comparison;
pub mod credits;
pub mod history;
pub mod providers;
pub mod reporter;
pub mod swipe;

pub use comparison::ComparisonService;
pub use credits::{CreditIngestion, IngestOutcome, WebhookPayload};
pub use history::HistoryService;
pub use providers::{FilmographyProvider, TmdbProvider};
pub use reporter::{ReporterHandle, SeenReporter, UserSeenSink};
pub use swipe::{SessionRegistry, SwipeConfig, SwipeSession};
