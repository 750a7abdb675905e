use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        ActorComparison, FilmographyEntry, OverlapScore, Person, RecentTitle, SharedActor,
        SharedTitles, TmdbId, TrackedActor, UserId,
    },
    services::{
        credits::{IngestOutcome, WebhookPayload},
        providers::tmdb::{profile_url, ProfileSize},
        swipe::{Decision, HostedSession, Release, SessionView, SwipeConfig, SwipeSession},
    },
};

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct FilmographyResponse {
    pub person: Person,
    pub profile_url: Option<String>,
    pub entries: Vec<FilmographyEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: UserId,
    pub person_id: TmdbId,
    pub screen_width: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub user_id: UserId,
    pub person: Person,
    pub session: SessionView,
}

impl SessionResponse {
    fn new(id: Uuid, hosted: &HostedSession) -> Self {
        Self {
            id,
            user_id: hosted.user_id,
            person: hosted.person.clone(),
            session: hosted.session.view(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureInput {
    Begin,
    Move,
    End,
}

#[derive(Debug, Deserialize)]
pub struct GestureRequest {
    pub phase: GestureInput,
    #[serde(default)]
    pub translation_x: f64,
    #[serde(default)]
    pub velocity_x: f64,
}

#[derive(Debug, Serialize)]
pub struct GestureResponse {
    /// False when the session ignored the event
    pub accepted: bool,
    pub release: Option<Release>,
    pub session: SessionView,
}

#[derive(Debug, Deserialize)]
pub struct FrameRequest {
    pub elapsed_ms: u64,
    /// The host stopped rendering the card that was just decided
    #[serde(default)]
    pub card_removed: bool,
}

#[derive(Debug, Serialize)]
pub struct FrameResponse {
    pub decision: Option<Decision>,
    pub session: SessionView,
}

// Handlers

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn get_filmography(
    State(state): State<AppState>,
    Path(person_id): Path<TmdbId>,
) -> AppResult<Json<FilmographyResponse>> {
    let (person, entries) = tokio::try_join!(
        state.provider.person(person_id),
        state.provider.filmography(person_id)
    )?;
    Ok(Json(FilmographyResponse {
        profile_url: profile_url(person.profile_path.as_deref(), ProfileSize::Medium),
        person,
        entries,
    }))
}

/// Starts a swipe session over the unseen part of a filmography
///
/// The filmography and the user's seen set are both loaded in full before the
/// deck is frozen.
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let config = match request.screen_width {
        Some(width) if !width.is_finite() || width <= 0.0 => {
            return Err(AppError::InvalidInput(format!(
                "screen_width must be positive, got {}",
                width
            )));
        }
        Some(width) => SwipeConfig {
            screen_width: width,
            ..state.swipe_config
        },
        None => state.swipe_config,
    };

    let (person, filmography, seen) = tokio::try_join!(
        state.provider.person(request.person_id),
        state.provider.filmography(request.person_id),
        state.history.seen_ids(request.user_id)
    )?;

    let sink = Arc::new(state.reporter.for_user(request.user_id));
    let hosted = HostedSession {
        user_id: request.user_id,
        person,
        session: SwipeSession::new(filmography, &seen, config, sink),
    };
    let id = state.sessions.insert(hosted).await;
    let response = state
        .sessions
        .read(id, |hosted| SessionResponse::new(id, hosted))
        .await?;
    state.sessions.release_if_finished(id).await;

    tracing::info!(
        session_id = %id,
        user_id = %request.user_id,
        person_id = request.person_id,
        deck = response.session.total,
        already_seen = response.session.already_seen,
        "Swipe session started"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    let response = state
        .sessions
        .read(id, |hosted| SessionResponse::new(id, hosted))
        .await?;
    Ok(Json(response))
}

pub async fn gesture(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<GestureRequest>,
) -> AppResult<Json<GestureResponse>> {
    if !request.translation_x.is_finite() || !request.velocity_x.is_finite() {
        return Err(AppError::InvalidInput(
            "translation_x and velocity_x must be finite".to_string(),
        ));
    }

    let response = state
        .sessions
        .update(id, |hosted| {
            let session = &mut hosted.session;
            let (accepted, release) = match request.phase {
                GestureInput::Begin => (session.begin_gesture(), None),
                GestureInput::Move => (session.move_gesture(request.translation_x), None),
                GestureInput::End => {
                    let release = session.end_gesture(request.translation_x, request.velocity_x);
                    (release.is_some(), release)
                }
            };
            GestureResponse {
                accepted,
                release,
                session: session.view(),
            }
        })
        .await?;

    Ok(Json(response))
}

pub async fn advance_frames(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<FrameRequest>,
) -> AppResult<Json<FrameResponse>> {
    let response = state
        .sessions
        .update(id, |hosted| {
            let session = &mut hosted.session;
            let decision = session.advance(Duration::from_millis(request.elapsed_ms));
            if request.card_removed {
                session.card_removed();
            }
            FrameResponse {
                decision,
                session: session.view(),
            }
        })
        .await?;

    if let Some(decision) = response.decision {
        tracing::debug!(
            session_id = %id,
            title_id = decision.title_id,
            direction = ?decision.direction,
            "Swipe committed"
        );
    }

    Ok(Json(response))
}

/// Unmounts the session; a swipe still animating out is applied first
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    let view = state.sessions.remove(id).await?;
    tracing::info!(
        session_id = %id,
        seen_this_session = view.seen_this_session,
        "Swipe session closed"
    );
    Ok(Json(view))
}

pub async fn mark_unseen(
    State(state): State<AppState>,
    Path((user_id, title_id)): Path<(UserId, TmdbId)>,
) -> AppResult<StatusCode> {
    state.user_history.mark_unseen(user_id, title_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn recently_watched(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<RecentTitle>>> {
    Ok(Json(state.user_history.recent(user_id).await?))
}

pub async fn tracked_actors(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> AppResult<Json<Vec<TrackedActor>>> {
    Ok(Json(state.user_history.tracked_actors(user_id).await?))
}

pub async fn friend_overlap(
    State(state): State<AppState>,
    Path((user_id, friend_id)): Path<(UserId, UserId)>,
) -> AppResult<Json<OverlapScore>> {
    Ok(Json(state.comparison.overlap(user_id, friend_id).await?))
}

pub async fn friend_titles(
    State(state): State<AppState>,
    Path((user_id, friend_id)): Path<(UserId, UserId)>,
) -> AppResult<Json<SharedTitles>> {
    Ok(Json(state.comparison.titles(user_id, friend_id).await?))
}

pub async fn friend_actors(
    State(state): State<AppState>,
    Path((user_id, friend_id)): Path<(UserId, UserId)>,
) -> AppResult<Json<Vec<SharedActor>>> {
    Ok(Json(state.comparison.actors(user_id, friend_id).await?))
}

pub async fn friend_actor(
    State(state): State<AppState>,
    Path((user_id, friend_id, actor_id)): Path<(UserId, UserId, TmdbId)>,
) -> AppResult<Json<ActorComparison>> {
    Ok(Json(
        state.comparison.actor(user_id, friend_id, actor_id).await?,
    ))
}

pub async fn fetch_credits(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> AppResult<Json<IngestOutcome>> {
    Ok(Json(state.credits.handle(&payload).await?))
}
