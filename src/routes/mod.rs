use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer};
use crate::handlers::{auth, events, health_check, responses, search};
use crate::AppState;

pub fn create_routes(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/events/create", post(events::create_event))
        .route("/events/my-events", get(events::my_events))
        .route("/events/me", get(events::all_events_for_user))
        .route("/events/invited", get(events::invited_events))
        .route("/events/invite", post(events::invite_user))
        .route("/events/search", get(search::search_events))
        .route("/events/:event_id", delete(events::delete_event))
        .route("/events/:event_id/respond", post(responses::respond_to_event))
        .route("/events/:event_id/attendees", get(responses::event_attendees))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer());

    apply_security_headers(router)
}
