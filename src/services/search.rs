use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{parse_event_date, EventView};
use crate::store::{EventFilter, EventStore};
use crate::utils::error::AppError;

const MAX_KEYWORD_LEN: usize = 200;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleFilter {
    Organizer,
    Attendee,
}

/// Echo of the validated filters a search actually applied.
#[derive(Debug, Serialize)]
pub struct AppliedFilters {
    pub keyword: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub role: Option<RoleFilter>,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub results: Vec<EventView>,
    pub count: usize,
    pub filters_applied: AppliedFilters,
}

/// Filtered event listing. Without a role filter the listing is not
/// scoped to the caller; a role filter restricts it to the caller's
/// organized or invited events.
pub struct EventSearch {
    events: Arc<dyn EventStore>,
}

impl EventSearch {
    pub fn new(events: Arc<dyn EventStore>) -> Self {
        Self { events }
    }

    pub async fn search(
        &self,
        viewer: &str,
        params: SearchParams,
    ) -> Result<SearchResults, AppError> {
        // All filter validation happens before the store is touched.
        let keyword = params.keyword.as_deref().and_then(sanitize_keyword);
        if let Some(keyword) = &keyword {
            if keyword.len() > MAX_KEYWORD_LEN {
                return Err(AppError::ValidationError(format!(
                    "Keyword search term is too long (max {} characters)",
                    MAX_KEYWORD_LEN
                )));
            }
        }

        let start_date = params
            .start_date
            .as_deref()
            .map(|raw| parse_event_date(raw, "start_date"))
            .transpose()?;
        let end_date = params
            .end_date
            .as_deref()
            .map(|raw| parse_event_date(raw, "end_date"))
            .transpose()?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(AppError::ValidationError(
                    "start_date must be before or equal to end_date".to_string(),
                ));
            }
        }

        let role = params.role.as_deref().map(parse_role).transpose()?;

        let mut filter = EventFilter {
            keyword: keyword.clone(),
            date_from: start_date,
            date_to: end_date,
            ..EventFilter::default()
        };
        match role {
            Some(RoleFilter::Organizer) => {
                filter.organizer = Some(viewer.to_string());
            }
            Some(RoleFilter::Attendee) => {
                filter.member = Some(viewer.to_string());
                filter.exclude_organizer = Some(viewer.to_string());
            }
            None => {}
        }

        let results: Vec<EventView> = self
            .events
            .find(&filter)
            .await?
            .into_iter()
            .map(|event| EventView::for_viewer(event, viewer))
            .collect();

        tracing::info!(viewer, count = results.len(), "Search completed");

        Ok(SearchResults {
            count: results.len(),
            results,
            filters_applied: AppliedFilters {
                keyword,
                start_date: start_date.map(|d| d.to_string()),
                end_date: end_date.map(|d| d.to_string()),
                role,
            },
        })
    }
}

fn sanitize_keyword(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_role(raw: &str) -> Result<RoleFilter, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "organizer" => Ok(RoleFilter::Organizer),
        "attendee" => Ok(RoleFilter::Attendee),
        _ => Err(AppError::ValidationError(
            "Invalid role. Must be one of: organizer, attendee".to_string(),
        )),
    }
}
