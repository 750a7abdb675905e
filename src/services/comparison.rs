//! Comparing two users' watch histories

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::{
    db::WatchHistory,
    error::AppResult,
    models::{
        ActorComparison, Appearance, OverlapScore, SeenSet, SharedActor, SharedTitles,
        TitleRecord, TmdbId, UserId,
    },
};

/// Most title ids resolved to rows for one comparison
pub const RESOLVE_LIMIT: usize = 100;
/// Most friend-only titles returned
pub const FRIEND_ONLY_LIMIT: usize = 20;

pub fn overlap_score(user: &SeenSet, friend: &SeenSet) -> OverlapScore {
    let shared_count = user.intersection_count(friend);
    let total_unique = user.union_count(friend);

    let score = if total_unique == 0 {
        0
    } else {
        let (shared, unique) = (shared_count as u64, total_unique as u64);
        ((200 * shared + unique) / (2 * unique)) as u32
    };

    OverlapScore {
        shared_count,
        total_unique,
        score,
    }
}

pub fn actor_comparison(
    actor_title_ids: &[TmdbId],
    user_a: &SeenSet,
    user_b: &SeenSet,
) -> ActorComparison {
    let titles: HashSet<TmdbId> = actor_title_ids.iter().copied().collect();

    ActorComparison {
        total_titles: titles.len(),
        user_a_seen: titles.iter().filter(|id| user_a.contains(**id)).count(),
        user_b_seen: titles.iter().filter(|id| user_b.contains(**id)).count(),
    }
}

/// Splits the friend's titles into ones the user has also seen and ones
/// only the friend has, keeping the friend's order
///
/// Ids with no cached row are dropped.
pub fn split_friend_titles(
    friend_ids: &[TmdbId],
    rows: Vec<TitleRecord>,
    user: &SeenSet,
) -> SharedTitles {
    let mut rows: HashMap<TmdbId, TitleRecord> =
        rows.into_iter().map(|row| (row.id, row)).collect();

    let mut result = SharedTitles::default();
    for id in friend_ids.iter().take(RESOLVE_LIMIT) {
        let Some(row) = rows.remove(id) else {
            continue;
        };
        if user.contains(*id) {
            result.shared.push(row);
        } else if result.friend_only.len() < FRIEND_ONLY_LIMIT {
            result.friend_only.push(row);
        }
    }
    result
}

/// Actors with at least one seen title on each side, most watched first
pub fn shared_actors(
    appearances: &[Appearance],
    user: &SeenSet,
    friend: &SeenSet,
) -> Vec<SharedActor> {
    // BTreeMap keeps the output independent of hash order before sorting.
    let mut by_actor: BTreeMap<TmdbId, (&Appearance, HashSet<TmdbId>)> = BTreeMap::new();
    for appearance in appearances {
        by_actor
            .entry(appearance.actor_id)
            .or_insert_with(|| (appearance, HashSet::new()))
            .1
            .insert(appearance.title_id);
    }

    let mut actors: Vec<SharedActor> = by_actor
        .into_values()
        .filter_map(|(first, titles)| {
            let user_seen = titles.iter().filter(|id| user.contains(**id)).count();
            let friend_seen = titles.iter().filter(|id| friend.contains(**id)).count();
            (user_seen > 0 && friend_seen > 0).then(|| SharedActor {
                actor_id: first.actor_id,
                name: first.actor_name.clone(),
                profile_path: first.profile_path.clone(),
                user_seen,
                friend_seen,
            })
        })
        .collect();

    actors.sort_by(|a, b| {
        (b.user_seen + b.friend_seen)
            .cmp(&(a.user_seen + a.friend_seen))
            .then_with(|| a.name.cmp(&b.name))
    });
    actors
}

/// Loads both users' histories and runs the comparisons
#[derive(Clone)]
pub struct ComparisonService {
    history: Arc<dyn WatchHistory>,
}

impl ComparisonService {
    pub fn new(history: Arc<dyn WatchHistory>) -> Self {
        Self { history }
    }

    pub async fn overlap(&self, user_id: UserId, friend_id: UserId) -> AppResult<OverlapScore> {
        let user = self.history.seen_ids(user_id).await?;
        let friend = self.history.seen_ids(friend_id).await?;
        Ok(overlap_score(&user, &friend))
    }

    pub async fn actor(
        &self,
        user_id: UserId,
        friend_id: UserId,
        actor_id: TmdbId,
    ) -> AppResult<ActorComparison> {
        let title_ids = self.history.actor_title_ids(actor_id).await?;
        let user = self.history.seen_ids(user_id).await?;
        let friend = self.history.seen_ids(friend_id).await?;
        Ok(actor_comparison(&title_ids, &user, &friend))
    }

    pub async fn titles(&self, user_id: UserId, friend_id: UserId) -> AppResult<SharedTitles> {
        let friend_ids = self.history.seen_title_ids(friend_id).await?;
        let user = self.history.seen_ids(user_id).await?;

        let resolve: Vec<TmdbId> = friend_ids.iter().take(RESOLVE_LIMIT).copied().collect();
        let rows = self.history.titles(&resolve).await?;

        let result = split_friend_titles(&friend_ids, rows, &user);
        tracing::debug!(
            user_id = %user_id,
            friend_id = %friend_id,
            shared = result.shared.len(),
            friend_only = result.friend_only.len(),
            "Compared titles"
        );
        Ok(result)
    }

    pub async fn actors(&self, user_id: UserId, friend_id: UserId) -> AppResult<Vec<SharedActor>> {
        let user_ids = self.history.seen_title_ids(user_id).await?;
        let friend_ids = self.history.seen_title_ids(friend_id).await?;

        let user: SeenSet = user_ids.iter().copied().collect();
        let friend: SeenSet = friend_ids.iter().copied().collect();

        let mut union = Vec::new();
        let mut included = HashSet::new();
        for id in user_ids.into_iter().chain(friend_ids) {
            if union.len() == RESOLVE_LIMIT {
                break;
            }
            if included.insert(id) {
                union.push(id);
            }
        }

        let appearances = self.history.appearances(&union).await?;
        Ok(shared_actors(&appearances, &user, &friend))
    }
}
