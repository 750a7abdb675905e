//! Film metadata providers
//!
//! Swipe sessions and credit ingestion only see the [`FilmographyProvider`]
//! trait, so the TMDB client can be swapped for a fake in tests.

use crate::{
    error::AppResult,
    models::{CastMember, FilmographyEntry, MediaKind, Person, TmdbId},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FilmographyProvider: Send + Sync {
    /// Person details (name and profile image)
    async fn person(&self, person_id: TmdbId) -> AppResult<Person>;

    /// A person's complete acting filmography in one response
    ///
    /// Entries are unique by id and ordered by popularity, most popular first;
    /// ties keep the provider's order.
    async fn filmography(&self, person_id: TmdbId) -> AppResult<Vec<FilmographyEntry>>;

    /// Billed cast of a title, in billing order
    async fn title_credits(
        &self,
        title_id: TmdbId,
        media_kind: MediaKind,
    ) -> AppResult<Vec<CastMember>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
