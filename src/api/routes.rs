use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Filmography
        .route("/actors/:id/filmography", get(handlers::get_filmography))
        // Swipe sessions
        .route("/swipe-sessions", post(handlers::create_session))
        .route(
            "/swipe-sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/swipe-sessions/:id/gesture", post(handlers::gesture))
        .route("/swipe-sessions/:id/frames", post(handlers::advance_frames))
        // Watch history
        .route(
            "/users/:user_id/seen/:title_id",
            delete(handlers::mark_unseen),
        )
        .route("/users/:user_id/recent", get(handlers::recently_watched))
        .route("/users/:user_id/actors", get(handlers::tracked_actors))
        // Friend comparison
        .route(
            "/users/:user_id/friends/:friend_id/overlap",
            get(handlers::friend_overlap),
        )
        .route(
            "/users/:user_id/friends/:friend_id/titles",
            get(handlers::friend_titles),
        )
        .route(
            "/users/:user_id/friends/:friend_id/actors",
            get(handlers::friend_actors),
        )
        .route(
            "/users/:user_id/friends/:friend_id/actors/:actor_id",
            get(handlers::friend_actor),
        )
        // Webhooks
        .route("/hooks/fetch-credits", post(handlers::fetch_credits))
}
