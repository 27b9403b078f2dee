pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use auth::TokenKeys;
use services::{EventLifecycle, EventSearch, Membership, ResponseTracker};
use store::{EventStore, UserStore};

/// Application state shared across all request handlers. Each manager is
/// handed its store client here, once, at process start.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub lifecycle: Arc<EventLifecycle>,
    pub membership: Arc<Membership>,
    pub responses: Arc<ResponseTracker>,
    pub search: Arc<EventSearch>,
    pub tokens: Arc<TokenKeys>,
    pub token_ttl_minutes: i64,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        events: Arc<dyn EventStore>,
        jwt_secret: &str,
        token_ttl_minutes: i64,
    ) -> Self {
        Self {
            lifecycle: Arc::new(EventLifecycle::new(events.clone())),
            membership: Arc::new(Membership::new(events.clone(), users.clone())),
            responses: Arc::new(ResponseTracker::new(events.clone())),
            search: Arc::new(EventSearch::new(events)),
            users,
            tokens: Arc::new(TokenKeys::from_secret(jwt_secret)),
            token_ttl_minutes,
        }
    }
}
