//! A single user's watch history: unmarking, recent titles and favourite actors

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::{
    db::WatchHistory,
    error::{AppError, AppResult},
    models::{Appearance, MediaKind, RecentTitle, TitleRecord, TmdbId, TrackedActor, UserId},
};

/// Recently watched titles returned
pub const RECENT_LIMIT: usize = 20;
/// Most seen titles scanned for tracked actors
pub const TRACKED_TITLE_LIMIT: usize = 200;
/// Tracked actors returned
pub const TRACKED_ACTOR_LIMIT: usize = 10;

/// Groups appearances by actor and counts films and shows, most seen first
///
/// Appearances in titles with no cached row count as shows.
pub fn tracked_actors(appearances: &[Appearance], titles: &[TitleRecord]) -> Vec<TrackedActor> {
    let kinds: HashMap<TmdbId, MediaKind> = titles.iter().map(|t| (t.id, t.media_kind)).collect();

    let mut by_actor: BTreeMap<TmdbId, (&Appearance, usize, usize)> = BTreeMap::new();
    for appearance in appearances {
        let counts = by_actor
            .entry(appearance.actor_id)
            .or_insert((appearance, 0, 0));
        match kinds.get(&appearance.title_id) {
            Some(MediaKind::Film) => counts.1 += 1,
            _ => counts.2 += 1,
        }
    }

    let mut actors: Vec<TrackedActor> = by_actor
        .into_values()
        .map(|(first, films, series)| {
            TrackedActor::new(
                first.actor_id,
                first.actor_name.clone(),
                first.profile_path.clone(),
                films,
                series,
            )
        })
        .collect();

    actors.sort_by(|a, b| {
        b.seen_count
            .cmp(&a.seen_count)
            .then_with(|| a.name.cmp(&b.name))
    });
    actors.truncate(TRACKED_ACTOR_LIMIT);
    actors
}

#[derive(Clone)]
pub struct HistoryService {
    history: Arc<dyn WatchHistory>,
}

impl HistoryService {
    pub fn new(history: Arc<dyn WatchHistory>) -> Self {
        Self { history }
    }

    pub async fn mark_unseen(&self, user_id: UserId, title_id: TmdbId) -> AppResult<()> {
        if !self.history.mark_unseen(user_id, title_id).await? {
            return Err(AppError::NotFound(format!(
                "Title {} is not marked seen",
                title_id
            )));
        }
        tracing::info!(user_id = %user_id, title_id, "Title marked unseen");
        Ok(())
    }

    pub async fn recent(&self, user_id: UserId) -> AppResult<Vec<RecentTitle>> {
        self.history.recent(user_id, RECENT_LIMIT).await
    }

    pub async fn tracked_actors(&self, user_id: UserId) -> AppResult<Vec<TrackedActor>> {
        let mut title_ids = self.history.seen_title_ids(user_id).await?;
        if title_ids.is_empty() {
            return Ok(Vec::new());
        }
        title_ids.truncate(TRACKED_TITLE_LIMIT);

        let appearances = self.history.appearances(&title_ids).await?;
        let titles = self.history.titles(&title_ids).await?;
        Ok(tracked_actors(&appearances, &titles))
    }
}
