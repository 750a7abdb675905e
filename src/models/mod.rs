use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fmt::Display,
    str::FromStr,
};
use uuid::Uuid;

pub mod comparison;
pub mod history;
pub mod tmdb;

pub use comparison::{ActorComparison, OverlapScore, SharedActor, SharedTitles};
pub use history::{RecentTitle, TrackedActor};
pub use tmdb::{TmdbCastMember, TmdbCredits, TmdbPerson, TmdbPersonCreditEntry, TmdbPersonCredits};

/// TMDB identifier for a title or person
pub type TmdbId = i64;

/// Identifier of an application user
pub type UserId = Uuid;

/// Kind of title a filmography entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Feature film (TMDB `movie`)
    Film,
    /// Television series (TMDB `tv`)
    Series,
}

impl MediaKind {
    /// Path segment TMDB uses for this kind (`movie` or `tv`)
    pub fn tmdb_path(&self) -> &'static str {
        match self {
            MediaKind::Film => "movie",
            MediaKind::Series => "tv",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tmdb_path())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" | "film" => Ok(MediaKind::Film),
            "tv" | "series" => Ok(MediaKind::Series),
            other => Err(format!("unknown media kind '{}'", other)),
        }
    }
}

/// One credit in a person's filmography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmographyEntry {
    pub id: TmdbId,
    pub media_kind: MediaKind,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Character played; empty when TMDB has none
    pub character: String,
}

impl FilmographyEntry {
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }
}

/// Person details shown alongside a filmography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: TmdbId,
    pub name: String,
    pub profile_path: Option<String>,
}

/// Titles a user had already marked seen when a session started
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenSet(HashSet<TmdbId>);

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: TmdbId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TmdbId> + '_ {
        self.0.iter().copied()
    }

    /// Number of ids present in both sets
    pub fn intersection_count(&self, other: &SeenSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    /// Number of ids present in either set
    pub fn union_count(&self, other: &SeenSet) -> usize {
        self.0.union(&other.0).count()
    }
}

impl FromIterator<TmdbId> for SeenSet {
    fn from_iter<I: IntoIterator<Item = TmdbId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Command sent to the watch history store when a card is swiped right
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkSeen {
    pub title_id: TmdbId,
    pub media_kind: MediaKind,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_year: Option<i32>,
}

impl From<&FilmographyEntry> for MarkSeen {
    fn from(entry: &FilmographyEntry) -> Self {
        Self {
            title_id: entry.id,
            media_kind: entry.media_kind,
            title: entry.title.clone(),
            poster_path: entry.poster_path.clone(),
            release_year: entry.release_year(),
        }
    }
}

/// Cached title row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub id: TmdbId,
    pub media_kind: MediaKind,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_year: Option<i32>,
    pub credits_fetched_at: Option<DateTime<Utc>>,
}

impl From<&MarkSeen> for TitleRecord {
    fn from(command: &MarkSeen) -> Self {
        Self {
            id: command.title_id,
            media_kind: command.media_kind,
            title: command.title.clone(),
            poster_path: command.poster_path.clone(),
            release_year: command.release_year,
            credits_fetched_at: None,
        }
    }
}

/// Billed cast member of a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub actor_id: TmdbId,
    pub name: String,
    pub profile_path: Option<String>,
    pub character: Option<String>,
}

/// An actor's appearance in a title, joined with the actor row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub actor_id: TmdbId,
    pub title_id: TmdbId,
    pub actor_name: String,
    pub profile_path: Option<String>,
    pub character: Option<String>,
    pub billing_order: Option<i32>,
}

/// Parses a TMDB date string; empty or malformed values yield `None`
pub fn parse_release_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}
