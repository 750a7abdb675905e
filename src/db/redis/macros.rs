/// Read-through caching for provider lookups.
///
/// Looks the key up in Redis and returns the hit. On a miss the block is awaited,
/// its value is queued for a background write with the given TTL (seconds), and
/// then returned. A failed cache read is logged and treated as a miss so that a
/// Redis outage degrades to uncached lookups instead of failing requests.
///
/// The cache must expose `get_from_cache` and `set_in_background`.
///
/// ```ignore
/// async fn filmography(&self, person_id: TmdbId) -> AppResult<Vec<FilmographyEntry>> {
///     cached!(
///         self.cache,
///         CacheKey::Filmography(person_id),
///         FILMOGRAPHY_CACHE_TTL,
///         async move { self.fetch_filmography(person_id).await }
///     )
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        let hit = match $cache.get_from_cache(&key).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed, fetching upstream");
                None
            }
        };

        match hit {
            Some(cached) => Ok(cached),
            None => {
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
