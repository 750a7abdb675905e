//! Credit ingestion for newly seen titles
//!
//! A database webhook fires on every insert into `seen_titles`. The first
//! time a title is seen its billed cast is fetched from the provider and
//! stored, which is what the shared-actor comparison reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    db::WatchHistory,
    error::{AppError, AppResult},
    models::{TmdbId, UserId},
    services::providers::FilmographyProvider,
};

/// Billed cast members kept per title
pub const MAX_CAST: usize = 20;

const SEEN_TITLES_TABLE: &str = "seen_titles";

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    pub table: String,
    pub record: SeenTitleRow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeenTitleRow {
    pub user_id: UserId,
    pub title_id: TmdbId,
    pub watched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// Not a seen-title insert
    Ignored,
    AlreadyFetched,
    Ingested { actors_count: usize },
}

#[derive(Clone)]
pub struct CreditIngestion {
    provider: Arc<dyn FilmographyProvider>,
    history: Arc<dyn WatchHistory>,
}

impl CreditIngestion {
    pub fn new(provider: Arc<dyn FilmographyProvider>, history: Arc<dyn WatchHistory>) -> Self {
        Self { provider, history }
    }

    pub async fn handle(&self, payload: &WebhookPayload) -> AppResult<IngestOutcome> {
        if payload.event_type != "INSERT" || payload.table != SEEN_TITLES_TABLE {
            tracing::debug!(
                event_type = %payload.event_type,
                table = %payload.table,
                "Ignoring webhook"
            );
            return Ok(IngestOutcome::Ignored);
        }

        let title_id = payload.record.title_id;
        let title = self
            .history
            .title(title_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Title {} not found", title_id)))?;

        if title.credits_fetched_at.is_some() {
            return Ok(IngestOutcome::AlreadyFetched);
        }

        let mut cast = self
            .provider
            .title_credits(title_id, title.media_kind)
            .await?;
        cast.truncate(MAX_CAST);

        self.history.record_credits(title_id, &cast).await?;

        tracing::info!(
            title_id,
            media_kind = %title.media_kind,
            user_id = %payload.record.user_id,
            actors = cast.len(),
            provider = self.provider.name(),
            "Credits ingested"
        );

        Ok(IngestOutcome::Ingested {
            actors_count: cast.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::history::MockWatchHistory;
    use crate::models::{CastMember, MediaKind, TitleRecord};
    use crate::services::providers::MockFilmographyProvider;

    fn payload(event_type: &str, table: &str) -> WebhookPayload {
        serde_json::from_value(serde_json::json!({
            "type": event_type,
            "table": table,
            "record": {
                "user_id": "6f1c1f5e-8f6a-4c52-9d5e-3b1f5a0c2e11",
                "title_id": 1396,
                "watched_at": "2024-05-01T12:00:00Z"
            }
        }))
        .unwrap()
    }

    fn title(fetched: bool) -> TitleRecord {
        TitleRecord {
            id: 1396,
            media_kind: MediaKind::Series,
            title: "Breaking Bad".to_string(),
            poster_path: None,
            release_year: Some(2008),
            credits_fetched_at: fetched.then(Utc::now),
        }
    }

    fn cast(n: usize) -> Vec<CastMember> {
        (0..n)
            .map(|i| CastMember {
                actor_id: i as TmdbId,
                name: format!("Actor {}", i),
                profile_path: None,
                character: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_other_events_are_ignored() {
        let service = CreditIngestion::new(
            Arc::new(MockFilmographyProvider::new()),
            Arc::new(MockWatchHistory::new()),
        );

        assert_eq!(
            service.handle(&payload("UPDATE", "seen_titles")).await.unwrap(),
            IngestOutcome::Ignored
        );
        assert_eq!(
            service.handle(&payload("INSERT", "titles")).await.unwrap(),
            IngestOutcome::Ignored
        );
    }

    #[tokio::test]
    async fn test_unknown_title_is_not_found() {
        let mut history = MockWatchHistory::new();
        history.expect_title().returning(|_| Ok(None));

        let service =
            CreditIngestion::new(Arc::new(MockFilmographyProvider::new()), Arc::new(history));

        let result = service.handle(&payload("INSERT", "seen_titles")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_already_fetched_skips_provider() {
        let mut history = MockWatchHistory::new();
        history.expect_title().returning(|_| Ok(Some(title(true))));
        history.expect_record_credits().never();

        let mut provider = MockFilmographyProvider::new();
        provider.expect_title_credits().never();

        let service = CreditIngestion::new(Arc::new(provider), Arc::new(history));
        assert_eq!(
            service.handle(&payload("INSERT", "seen_titles")).await.unwrap(),
            IngestOutcome::AlreadyFetched
        );
    }

    #[tokio::test]
    async fn test_keeps_top_twenty_cast() {
        let mut history = MockWatchHistory::new();
        history.expect_title().returning(|_| Ok(Some(title(false))));
        history
            .expect_record_credits()
            .withf(|title_id, cast| *title_id == 1396 && cast.len() == MAX_CAST && cast[0].actor_id == 0)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut provider = MockFilmographyProvider::new();
        provider
            .expect_title_credits()
            .withf(|title_id, kind| *title_id == 1396 && *kind == MediaKind::Series)
            .returning(|_, _| Ok(cast(35)));
        provider.expect_name().return_const("mock");

        let service = CreditIngestion::new(Arc::new(provider), Arc::new(history));
        assert_eq!(
            service.handle(&payload("INSERT", "seen_titles")).await.unwrap(),
            IngestOutcome::Ingested { actors_count: 20 }
        );
    }

    #[tokio::test]
    async fn test_empty_cast_still_recorded() {
        let mut history = MockWatchHistory::new();
        history.expect_title().returning(|_| Ok(Some(title(false))));
        history
            .expect_record_credits()
            .withf(|_, cast| cast.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));

        let mut provider = MockFilmographyProvider::new();
        provider.expect_title_credits().returning(|_, _| Ok(vec![]));
        provider.expect_name().return_const("mock");

        let service = CreditIngestion::new(Arc::new(provider), Arc::new(history));
        assert_eq!(
            service.handle(&payload("INSERT", "seen_titles")).await.unwrap(),
            IngestOutcome::Ingested { actors_count: 0 }
        );
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let mut history = MockWatchHistory::new();
        history.expect_title().returning(|_| Ok(Some(title(false))));
        history.expect_record_credits().never();

        let mut provider = MockFilmographyProvider::new();
        provider
            .expect_title_credits()
            .returning(|_, _| Err(AppError::ExternalApi("TMDB 500".to_string())));

        let service = CreditIngestion::new(Arc::new(provider), Arc::new(history));
        let result = service.handle(&payload("INSERT", "seen_titles")).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
