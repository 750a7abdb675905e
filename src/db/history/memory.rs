use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::WatchHistory;
use crate::{
    error::AppResult,
    models::{Appearance, CastMember, MarkSeen, RecentTitle, TitleRecord, TmdbId, UserId},
};

#[derive(Default)]
struct UserSeen {
    /// Oldest first
    order: Vec<(TmdbId, DateTime<Utc>)>,
    ids: HashSet<TmdbId>,
}

#[derive(Default)]
struct Inner {
    seen: HashMap<UserId, UserSeen>,
    titles: HashMap<TmdbId, TitleRecord>,
    actors: HashMap<TmdbId, (String, Option<String>)>,
    /// (actor_id, title_id) -> (character, billing_order)
    appearances: HashMap<(TmdbId, TmdbId), (Option<String>, i32)>,
}

/// Process-local watch history used when no database is configured
#[derive(Clone, Default)]
pub struct MemoryWatchHistory {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryWatchHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl WatchHistory for MemoryWatchHistory {
    async fn seen_title_ids(&self, user_id: UserId) -> AppResult<Vec<TmdbId>> {
        let inner = self.inner.read().await;
        Ok(inner
            .seen
            .get(&user_id)
            .map(|seen| seen.order.iter().rev().map(|(id, _)| *id).collect())
            .unwrap_or_default())
    }

    async fn mark_seen(&self, user_id: UserId, command: &MarkSeen) -> AppResult<()> {
        let mut inner = self.inner.write().await;

        let credits_fetched_at = inner
            .titles
            .get(&command.title_id)
            .and_then(|t| t.credits_fetched_at);
        let mut record = TitleRecord::from(command);
        record.credits_fetched_at = credits_fetched_at;
        inner.titles.insert(command.title_id, record);

        let seen = inner.seen.entry(user_id).or_default();
        if seen.ids.insert(command.title_id) {
            seen.order.push((command.title_id, Utc::now()));
        }

        Ok(())
    }

    async fn mark_unseen(&self, user_id: UserId, title_id: TmdbId) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let Some(seen) = inner.seen.get_mut(&user_id) else {
            return Ok(false);
        };
        if !seen.ids.remove(&title_id) {
            return Ok(false);
        }
        seen.order.retain(|(id, _)| *id != title_id);
        Ok(true)
    }

    async fn recent(&self, user_id: UserId, limit: usize) -> AppResult<Vec<RecentTitle>> {
        let inner = self.inner.read().await;
        let Some(seen) = inner.seen.get(&user_id) else {
            return Ok(Vec::new());
        };

        Ok(seen
            .order
            .iter()
            .rev()
            .filter_map(|(id, watched_at)| {
                let title = inner.titles.get(id)?;
                Some(RecentTitle {
                    title_id: *id,
                    title: title.title.clone(),
                    poster_path: title.poster_path.clone(),
                    media_kind: title.media_kind,
                    watched_at: *watched_at,
                })
            })
            .take(limit)
            .collect())
    }

    async fn title(&self, title_id: TmdbId) -> AppResult<Option<TitleRecord>> {
        Ok(self.inner.read().await.titles.get(&title_id).cloned())
    }

    async fn titles(&self, title_ids: &[TmdbId]) -> AppResult<Vec<TitleRecord>> {
        let inner = self.inner.read().await;
        Ok(title_ids
            .iter()
            .filter_map(|id| inner.titles.get(id).cloned())
            .collect())
    }

    async fn actor_title_ids(&self, actor_id: TmdbId) -> AppResult<Vec<TmdbId>> {
        let inner = self.inner.read().await;
        let mut ids: Vec<TmdbId> = inner
            .appearances
            .keys()
            .filter(|(actor, _)| *actor == actor_id)
            .map(|(_, title)| *title)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn appearances(&self, title_ids: &[TmdbId]) -> AppResult<Vec<Appearance>> {
        let inner = self.inner.read().await;
        let mut appearances: Vec<Appearance> = inner
            .appearances
            .iter()
            .filter(|((_, title_id), _)| title_ids.contains(title_id))
            .filter_map(|((actor_id, title_id), (character, billing_order))| {
                let (name, profile_path) = inner.actors.get(actor_id)?;
                Some(Appearance {
                    actor_id: *actor_id,
                    title_id: *title_id,
                    actor_name: name.clone(),
                    profile_path: profile_path.clone(),
                    character: character.clone(),
                    billing_order: Some(*billing_order),
                })
            })
            .collect();
        appearances.sort_by_key(|a| (a.title_id, a.billing_order));
        Ok(appearances)
    }

    async fn record_credits(&self, title_id: TmdbId, cast: &[CastMember]) -> AppResult<()> {
        let mut inner = self.inner.write().await;

        for (billing_order, member) in cast.iter().enumerate() {
            inner.actors.insert(
                member.actor_id,
                (member.name.clone(), member.profile_path.clone()),
            );
            inner.appearances.insert(
                (member.actor_id, title_id),
                (member.character.clone(), billing_order as i32),
            );
        }

        if let Some(title) = inner.titles.get_mut(&title_id) {
            title.credits_fetched_at = Some(Utc::now());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;
    use uuid::Uuid;

    fn mark(id: TmdbId) -> MarkSeen {
        MarkSeen {
            title_id: id,
            media_kind: MediaKind::Film,
            title: format!("Title {}", id),
            poster_path: None,
            release_year: Some(2000),
        }
    }

    fn cast(id: TmdbId, name: &str) -> CastMember {
        CastMember {
            actor_id: id,
            name: name.to_string(),
            profile_path: None,
            character: None,
        }
    }

    #[tokio::test]
    async fn test_mark_seen_is_idempotent_and_most_recent_first() {
        let history = MemoryWatchHistory::new();
        let user = Uuid::new_v4();

        history.mark_seen(user, &mark(1)).await.unwrap();
        history.mark_seen(user, &mark(2)).await.unwrap();
        history.mark_seen(user, &mark(1)).await.unwrap();

        assert_eq!(history.seen_title_ids(user).await.unwrap(), vec![2, 1]);
        assert_eq!(history.seen_ids(user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mark_seen_caches_title() {
        let history = MemoryWatchHistory::new();
        history.mark_seen(Uuid::new_v4(), &mark(7)).await.unwrap();

        let title = history.title(7).await.unwrap().unwrap();
        assert_eq!(title.title, "Title 7");
        assert_eq!(title.release_year, Some(2000));
        assert!(title.credits_fetched_at.is_none());
    }

    #[tokio::test]
    async fn test_titles_skips_unknown_ids() {
        let history = MemoryWatchHistory::new();
        history.mark_seen(Uuid::new_v4(), &mark(1)).await.unwrap();

        let titles = history.titles(&[1, 99]).await.unwrap();
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].id, 1);
    }

    #[tokio::test]
    async fn test_record_credits_stamps_title_and_orders_billing() {
        let history = MemoryWatchHistory::new();
        history.mark_seen(Uuid::new_v4(), &mark(949)).await.unwrap();

        history
            .record_credits(949, &[cast(1158, "Al Pacino"), cast(380, "Robert De Niro")])
            .await
            .unwrap();

        let title = history.title(949).await.unwrap().unwrap();
        assert!(title.credits_fetched_at.is_some());

        let appearances = history.appearances(&[949]).await.unwrap();
        assert_eq!(appearances.len(), 2);
        assert_eq!(appearances[0].actor_name, "Al Pacino");
        assert_eq!(appearances[0].billing_order, Some(0));
        assert_eq!(appearances[1].actor_name, "Robert De Niro");

        assert_eq!(history.actor_title_ids(380).await.unwrap(), vec![949]);
    }

    #[tokio::test]
    async fn test_remark_keeps_credits_stamp() {
        let history = MemoryWatchHistory::new();
        let user = Uuid::new_v4();
        history.mark_seen(user, &mark(5)).await.unwrap();
        history.record_credits(5, &[]).await.unwrap();

        history.mark_seen(Uuid::new_v4(), &mark(5)).await.unwrap();

        let title = history.title(5).await.unwrap().unwrap();
        assert!(title.credits_fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_mark_unseen() {
        let history = MemoryWatchHistory::new();
        let user = Uuid::new_v4();
        for id in [1, 2, 3] {
            history.mark_seen(user, &mark(id)).await.unwrap();
        }

        assert!(history.mark_unseen(user, 2).await.unwrap());
        assert!(!history.mark_unseen(user, 2).await.unwrap());
        assert!(!history.mark_unseen(Uuid::new_v4(), 1).await.unwrap());
        assert_eq!(history.seen_title_ids(user).await.unwrap(), vec![3, 1]);

        // Marking it again puts it back on top
        history.mark_seen(user, &mark(2)).await.unwrap();
        assert_eq!(history.seen_title_ids(user).await.unwrap(), vec![2, 3, 1]);
        // The cached row outlives the seen row
        assert!(history.title(2).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_recent_newest_first_and_limited() {
        let history = MemoryWatchHistory::new();
        let user = Uuid::new_v4();
        for id in 1..=5 {
            history.mark_seen(user, &mark(id)).await.unwrap();
        }

        let recent = history.recent(user, 3).await.unwrap();
        let ids: Vec<TmdbId> = recent.iter().map(|r| r.title_id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
        assert_eq!(recent[0].title, "Title 5");
        assert!(recent[0].watched_at >= recent[2].watched_at);

        assert!(history.recent(Uuid::new_v4(), 3).await.unwrap().is_empty());
    }
}
