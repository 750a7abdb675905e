/// TMDB provider
///
/// API flow:
/// 1. Person: /person/{id}
/// 2. Filmography: /person/{id}/combined_credits (movies and TV in one list)
/// 3. Title cast: /{movie|tv}/{id}/credits
///
/// Every call is read-through cached in Redis.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        CastMember, FilmographyEntry, MediaKind, Person, TmdbCredits, TmdbId, TmdbPerson,
        TmdbPersonCreditEntry, TmdbPersonCredits,
    },
    services::providers::FilmographyProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::collections::HashSet;

const PERSON_CACHE_TTL: u64 = 86400; // 1 day
const FILMOGRAPHY_CACHE_TTL: u64 = 86400; // 1 day
const CREDITS_CACHE_TTL: u64 = 604800; // 1 week

pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

/// Poster widths offered by the TMDB image CDN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterSize {
    Small,
    Medium,
    Large,
    Original,
}

impl PosterSize {
    fn segment(&self) -> &'static str {
        match self {
            PosterSize::Small => "w185",
            PosterSize::Medium => "w342",
            PosterSize::Large => "w500",
            PosterSize::Original => "original",
        }
    }
}

/// Profile image sizes offered by the TMDB image CDN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSize {
    Small,
    Medium,
    Original,
}

impl ProfileSize {
    fn segment(&self) -> &'static str {
        match self {
            ProfileSize::Small => "w185",
            ProfileSize::Medium => "h632",
            ProfileSize::Original => "original",
        }
    }
}

pub fn poster_url(path: Option<&str>, size: PosterSize) -> Option<String> {
    path.map(|p| format!("{}/{}{}", TMDB_IMAGE_BASE, size.segment(), p))
}

pub fn profile_url(path: Option<&str>, size: ProfileSize) -> Option<String> {
    path.map(|p| format!("{}/{}{}", TMDB_IMAGE_BASE, size.segment(), p))
}

/// Dedupes credits by id (first occurrence wins) and orders by vote count, descending
///
/// The sort is stable, so equally popular credits keep TMDB's order.
pub fn normalize_filmography(cast: Vec<TmdbPersonCreditEntry>) -> Vec<FilmographyEntry> {
    let mut seen = HashSet::new();
    let mut credits: Vec<TmdbPersonCreditEntry> =
        cast.into_iter().filter(|c| seen.insert(c.id)).collect();

    credits.sort_by(|a, b| b.vote_count.unwrap_or(0).cmp(&a.vote_count.unwrap_or(0)));

    credits
        .into_iter()
        .filter_map(TmdbPersonCreditEntry::into_entry)
        .collect()
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(path = %path, status = %status, "TMDB request failed");
            return Err(AppError::ExternalApi(format!(
                "TMDB {}: {} {}",
                status, path, body
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl FilmographyProvider for TmdbProvider {
    async fn person(&self, person_id: TmdbId) -> AppResult<Person> {
        cached!(
            self.cache,
            CacheKey::Person(person_id),
            PERSON_CACHE_TTL,
            async move {
                let person: TmdbPerson = self.get_json(&format!("/person/{}", person_id)).await?;
                Ok::<Person, AppError>(person.into())
            }
        )
    }

    async fn filmography(&self, person_id: TmdbId) -> AppResult<Vec<FilmographyEntry>> {
        cached!(
            self.cache,
            CacheKey::Filmography(person_id),
            FILMOGRAPHY_CACHE_TTL,
            async move {
                let credits: TmdbPersonCredits = self
                    .get_json(&format!("/person/{}/combined_credits", person_id))
                    .await?;
                let raw_count = credits.cast.len();
                let entries = normalize_filmography(credits.cast);

                tracing::info!(
                    person_id,
                    raw_credits = raw_count,
                    entries = entries.len(),
                    provider = "tmdb",
                    "Filmography fetched"
                );

                Ok::<Vec<FilmographyEntry>, AppError>(entries)
            }
        )
    }

    async fn title_credits(
        &self,
        title_id: TmdbId,
        media_kind: MediaKind,
    ) -> AppResult<Vec<CastMember>> {
        cached!(
            self.cache,
            CacheKey::TitleCredits(media_kind, title_id),
            CREDITS_CACHE_TTL,
            async move {
                let credits: TmdbCredits = self
                    .get_json(&format!("/{}/{}/credits", media_kind.tmdb_path(), title_id))
                    .await?;
                Ok::<Vec<CastMember>, AppError>(credits.into_billed_cast())
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
