use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::WatchHistory;
use crate::{
    error::{AppError, AppResult},
    models::{
        Appearance, CastMember, MarkSeen, MediaKind, RecentTitle, TitleRecord, TmdbId, UserId,
    },
};

type TitleRow = (
    i64,
    String,
    String,
    Option<String>,
    Option<i32>,
    Option<DateTime<Utc>>,
);

type RecentRow = (i64, String, Option<String>, String, DateTime<Utc>);

type AppearanceRow = (i64, i64, String, Option<String>, Option<String>, Option<i32>);

/// Watch history backed by the hosted Postgres database
#[derive(Clone)]
pub struct PgWatchHistory {
    pool: PgPool,
}

impl PgWatchHistory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn title_from_row(row: TitleRow) -> AppResult<TitleRecord> {
        let (id, media_type, title, poster_path, release_year, credits_fetched_at) = row;
        let media_kind = media_type
            .parse::<MediaKind>()
            .map_err(|e| AppError::Internal(format!("title {}: {}", id, e)))?;

        Ok(TitleRecord {
            id,
            media_kind,
            title,
            poster_path,
            release_year,
            credits_fetched_at,
        })
    }
}

#[async_trait::async_trait]
impl WatchHistory for PgWatchHistory {
    async fn seen_title_ids(&self, user_id: UserId) -> AppResult<Vec<TmdbId>> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT title_id
            FROM seen_titles
            WHERE user_id = $1
            ORDER BY watched_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn mark_seen(&self, user_id: UserId, command: &MarkSeen) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO titles (id, media_type, title, poster_path, release_year)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                poster_path = EXCLUDED.poster_path,
                release_year = EXCLUDED.release_year,
                cached_at = now()
            "#,
        )
        .bind(command.title_id)
        .bind(command.media_kind.tmdb_path())
        .bind(&command.title)
        .bind(&command.poster_path)
        .bind(command.release_year)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO seen_titles (user_id, title_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, title_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(command.title_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(user_id = %user_id, title_id = command.title_id, "Seen title stored");

        Ok(())
    }

    async fn mark_unseen(&self, user_id: UserId, title_id: TmdbId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM seen_titles WHERE user_id = $1 AND title_id = $2")
            .bind(user_id)
            .bind(title_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn recent(&self, user_id: UserId, limit: usize) -> AppResult<Vec<RecentTitle>> {
        let rows: Vec<RecentRow> = sqlx::query_as(
            r#"
            SELECT s.title_id, t.title, t.poster_path, t.media_type, s.watched_at
            FROM seen_titles s
            JOIN titles t ON t.id = s.title_id
            WHERE s.user_id = $1
            ORDER BY s.watched_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(title_id, title, poster_path, media_type, watched_at)| {
                let media_kind = media_type
                    .parse::<MediaKind>()
                    .map_err(|e| AppError::Internal(format!("title {}: {}", title_id, e)))?;
                Ok(RecentTitle {
                    title_id,
                    title,
                    poster_path,
                    media_kind,
                    watched_at,
                })
            })
            .collect()
    }

    async fn title(&self, title_id: TmdbId) -> AppResult<Option<TitleRecord>> {
        let row: Option<TitleRow> = sqlx::query_as(
            r#"
            SELECT id, media_type, title, poster_path, release_year, credits_fetched_at
            FROM titles
            WHERE id = $1
            "#,
        )
        .bind(title_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::title_from_row).transpose()
    }

    async fn titles(&self, title_ids: &[TmdbId]) -> AppResult<Vec<TitleRecord>> {
        if title_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<TitleRow> = sqlx::query_as(
            r#"
            SELECT id, media_type, title, poster_path, release_year, credits_fetched_at
            FROM titles
            WHERE id = ANY($1)
            "#,
        )
        .bind(title_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::title_from_row).collect()
    }

    async fn actor_title_ids(&self, actor_id: TmdbId) -> AppResult<Vec<TmdbId>> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT title_id
            FROM appearances
            WHERE actor_id = $1
            "#,
        )
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn appearances(&self, title_ids: &[TmdbId]) -> AppResult<Vec<Appearance>> {
        if title_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<AppearanceRow> = sqlx::query_as(
            r#"
            SELECT ap.actor_id, ap.title_id, ac.name, ac.profile_path, ap.character, ap.billing_order
            FROM appearances ap
            JOIN actors ac ON ac.id = ap.actor_id
            WHERE ap.title_id = ANY($1)
            ORDER BY ap.title_id, ap.billing_order
            "#,
        )
        .bind(title_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(actor_id, title_id, actor_name, profile_path, character, billing_order)| {
                    Appearance {
                        actor_id,
                        title_id,
                        actor_name,
                        profile_path,
                        character,
                        billing_order,
                    }
                },
            )
            .collect())
    }

    async fn record_credits(&self, title_id: TmdbId, cast: &[CastMember]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        for (billing_order, member) in cast.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO actors (id, name, profile_path)
                VALUES ($1, $2, $3)
                ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name,
                    profile_path = EXCLUDED.profile_path,
                    cached_at = now()
                "#,
            )
            .bind(member.actor_id)
            .bind(&member.name)
            .bind(&member.profile_path)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO appearances (actor_id, title_id, character, billing_order)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (actor_id, title_id) DO UPDATE
                SET character = EXCLUDED.character,
                    billing_order = EXCLUDED.billing_order
                "#,
            )
            .bind(member.actor_id)
            .bind(title_id)
            .bind(&member.character)
            .bind(billing_order as i32)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE titles SET credits_fetched_at = now() WHERE id = $1")
            .bind(title_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(title_id, actors = cast.len(), "Credits recorded");

        Ok(())
    }
}
