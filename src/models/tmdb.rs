//! TMDB API wire types

use serde::{Deserialize, Serialize};

use super::{parse_release_date, CastMember, FilmographyEntry, MediaKind, Person, TmdbId};

/// Response from `GET /person/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbPerson {
    pub id: TmdbId,
    pub name: String,
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl From<TmdbPerson> for Person {
    fn from(person: TmdbPerson) -> Self {
        Person {
            id: person.id,
            name: person.name,
            profile_path: person.profile_path,
        }
    }
}

/// One cast entry from `GET /person/{id}/combined_credits`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbPersonCreditEntry {
    pub id: TmdbId,
    pub media_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub vote_count: Option<u32>,
}

impl TmdbPersonCreditEntry {
    /// Converts to a filmography entry; credits of unknown media type are dropped
    pub fn into_entry(self) -> Option<FilmographyEntry> {
        let media_kind = self.media_type.parse::<MediaKind>().ok()?;

        let title = self
            .title
            .filter(|t| !t.is_empty())
            .or(self.name)
            .unwrap_or_default();

        let release_date = parse_release_date(self.release_date.as_deref())
            .or_else(|| parse_release_date(self.first_air_date.as_deref()));

        Some(FilmographyEntry {
            id: self.id,
            media_kind,
            title,
            poster_path: self.poster_path,
            release_date,
            character: self.character.unwrap_or_default(),
        })
    }
}

/// Response from `GET /person/{id}/combined_credits`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPersonCredits {
    #[serde(default)]
    pub cast: Vec<TmdbPersonCreditEntry>,
}

/// One cast member from `GET /{movie|tv}/{id}/credits`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub id: TmdbId,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    /// Billing position; lower is billed higher
    #[serde(default)]
    pub order: Option<i32>,
}

impl From<TmdbCastMember> for CastMember {
    fn from(member: TmdbCastMember) -> Self {
        CastMember {
            actor_id: member.id,
            name: member.name,
            profile_path: member.profile_path,
            character: member.character.filter(|c| !c.is_empty()),
        }
    }
}

/// Response from `GET /{movie|tv}/{id}/credits`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
}

impl TmdbCredits {
    /// Cast in billing order; members without an `order` go last
    pub fn into_billed_cast(mut self) -> Vec<CastMember> {
        self.cast
            .sort_by_key(|member| (member.order.is_none(), member.order));
        self.cast.into_iter().map(CastMember::from).collect()
    }
}
