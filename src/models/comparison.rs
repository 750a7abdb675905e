use serde::{Deserialize, Serialize};

use super::{TitleRecord, TmdbId};

/// How much two users' watch histories overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlapScore {
    pub shared_count: usize,
    pub total_unique: usize,
    /// Shared titles as a percentage of all unique titles
    pub score: u32,
}

/// Two users' progress through one actor's known titles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorComparison {
    pub total_titles: usize,
    pub user_a_seen: usize,
    pub user_b_seen: usize,
}

/// A friend's seen titles split by whether the user has seen them too
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedTitles {
    pub shared: Vec<TitleRecord>,
    pub friend_only: Vec<TitleRecord>,
}

/// An actor both users have watched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedActor {
    pub actor_id: TmdbId,
    pub name: String,
    pub profile_path: Option<String>,
    pub user_seen: usize,
    pub friend_seen: usize,
}
