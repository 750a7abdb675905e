use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MediaKind, TmdbId};

/// A seen title joined with its cached row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTitle {
    pub title_id: TmdbId,
    pub title: String,
    pub poster_path: Option<String>,
    pub media_kind: MediaKind,
    pub watched_at: DateTime<Utc>,
}

/// An actor the user keeps watching, with how often
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedActor {
    pub actor_id: TmdbId,
    pub name: String,
    pub profile_path: Option<String>,
    pub seen_count: usize,
    pub film_count: usize,
    pub series_count: usize,
    /// e.g. "3 films, 1 show seen"
    pub summary: String,
}

impl TrackedActor {
    pub fn new(
        actor_id: TmdbId,
        name: String,
        profile_path: Option<String>,
        film_count: usize,
        series_count: usize,
    ) -> Self {
        let seen_count = film_count + series_count;
        Self {
            actor_id,
            name,
            profile_path,
            seen_count,
            film_count,
            series_count,
            summary: seen_summary(seen_count, film_count, series_count),
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

fn seen_summary(seen_count: usize, film_count: usize, series_count: usize) -> String {
    let mut parts = Vec::new();
    if film_count > 0 {
        parts.push(plural(film_count, "film"));
    }
    if series_count > 0 {
        parts.push(plural(series_count, "show"));
    }
    if parts.is_empty() {
        format!("{} seen", seen_count)
    } else {
        format!("{} seen", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_wording() {
        let actor = |films, shows| TrackedActor::new(1, "A".to_string(), None, films, shows);

        assert_eq!(actor(3, 1).summary, "3 films, 1 show seen");
        assert_eq!(actor(1, 0).summary, "1 film seen");
        assert_eq!(actor(0, 2).summary, "2 shows seen");
        assert_eq!(actor(0, 0).summary, "0 seen");
        assert_eq!(actor(3, 1).seen_count, 4);
    }
}
