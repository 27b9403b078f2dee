use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};

use crate::auth::AuthUser;
use crate::services::SearchParams;
use crate::utils::error::AppError;
use crate::utils::response::success;
use crate::AppState;

pub async fn search_events(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let results = state.search.search(&viewer, params).await?;
    Ok(success(results, "Search completed successfully").into_response())
}
