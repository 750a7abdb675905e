//! Watch history store
//!
//! The store is the system of record for seen titles. Swipe sessions never
//! write to it directly: right swipes go through the background reporter,
//! which calls [`WatchHistory::mark_seen`] one report at a time.

use crate::{
    error::AppResult,
    models::{
        Appearance, CastMember, MarkSeen, RecentTitle, SeenSet, TitleRecord, TmdbId, UserId,
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryWatchHistory;
pub use postgres::PgWatchHistory;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WatchHistory: Send + Sync {
    /// Titles the user has marked seen, most recent first
    async fn seen_title_ids(&self, user_id: UserId) -> AppResult<Vec<TmdbId>>;

    /// Complete seen set for a user
    async fn seen_ids(&self, user_id: UserId) -> AppResult<SeenSet> {
        Ok(self.seen_title_ids(user_id).await?.into_iter().collect())
    }

    /// Caches the title row and records it as seen; repeating a call is harmless
    async fn mark_seen(&self, user_id: UserId, command: &MarkSeen) -> AppResult<()>;

    /// Deletes the seen row; returns false when the title wasn't marked seen
    async fn mark_unseen(&self, user_id: UserId, title_id: TmdbId) -> AppResult<bool>;

    /// Most recently seen titles with their cached rows, newest first
    ///
    /// Seen titles without a cached row are left out.
    async fn recent(&self, user_id: UserId, limit: usize) -> AppResult<Vec<RecentTitle>>;

    async fn title(&self, title_id: TmdbId) -> AppResult<Option<TitleRecord>>;

    /// Cached rows for the given ids; unknown ids are skipped
    async fn titles(&self, title_ids: &[TmdbId]) -> AppResult<Vec<TitleRecord>>;

    /// Titles an actor is known to appear in
    async fn actor_title_ids(&self, actor_id: TmdbId) -> AppResult<Vec<TmdbId>>;

    /// Appearances in the given titles, joined with actor details
    async fn appearances(&self, title_ids: &[TmdbId]) -> AppResult<Vec<Appearance>>;

    /// Stores a title's billed cast and stamps its credits as fetched
    async fn record_credits(&self, title_id: TmdbId, cast: &[CastMember]) -> AppResult<()>;
}
