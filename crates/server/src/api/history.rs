use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use seedwatch_core::{
    history::{HistoryError, HistoryRow, Page},
    query::{HistoryView, SortDirection, SortField},
    TriState,
};

use super::handlers::{api_error, ApiError};
use crate::state::AppState;

/// Query parameters for the history endpoint. Every axis is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryQueryParams {
    /// Space-separated name fragments
    pub name: Option<String>,
    pub unsatisfied: Option<String>,
    pub active: Option<String>,
    pub completed: Option<String>,
    pub prewarn: Option<String>,
    pub hitrun: Option<String>,
    pub immune: Option<String>,
    pub uploaded: Option<String>,
    /// Comma-separated status codes
    pub status: Option<String>,
    #[serde(alias = "sortField")]
    pub sort_field: Option<String>,
    #[serde(alias = "sortDirection")]
    pub sort_direction: Option<String>,
    #[serde(alias = "perPage")]
    pub per_page: Option<i64>,
    pub page: Option<i64>,
}

impl HistoryQueryParams {
    /// Apply the parameters to a fresh view, rejecting malformed values.
    pub fn into_view(self, user_id: u64, default_per_page: u32) -> Result<HistoryView, String> {
        let mut view = HistoryView::new(user_id, default_per_page);

        if let Some(name) = self.name {
            view.set_name(name);
        }

        let axes: [(Option<String>, fn(&mut HistoryView, TriState)); 7] = [
            (self.unsatisfied, HistoryView::set_unsatisfied),
            (self.active, HistoryView::set_active),
            (self.completed, HistoryView::set_completed),
            (self.prewarn, HistoryView::set_prewarn),
            (self.hitrun, HistoryView::set_hitrun),
            (self.immune, HistoryView::set_immune),
            (self.uploaded, HistoryView::set_uploaded),
        ];
        for (raw, apply) in axes {
            if let Some(raw) = raw {
                let state: TriState = raw.parse()?;
                apply(&mut view, state);
            }
        }

        if let Some(raw) = self.status {
            view.set_status(parse_status(&raw)?);
        }

        match (self.sort_field, self.sort_direction) {
            (None, None) => {}
            (field, direction) => {
                let field = match field {
                    Some(raw) => raw.parse::<SortField>().map_err(|e| e.to_string())?,
                    None => view.sort().field,
                };
                let direction = match direction {
                    Some(raw) => raw.parse::<SortDirection>().map_err(|e| e.to_string())?,
                    None => SortDirection::Asc,
                };
                view.set_sort(field, direction);
            }
        }

        if let Some(per_page) = self.per_page {
            if per_page < 1 {
                return Err(format!("Invalid page size: {}", per_page));
            }
            let per_page = u32::try_from(per_page).unwrap_or(u32::MAX);
            view.set_per_page(per_page).map_err(|e| e.to_string())?;
        }

        // Last, since filter and page-size changes reset the page.
        if let Some(page) = self.page {
            view.set_page(page).map_err(|e| e.to_string())?;
        }

        Ok(view)
    }
}

fn parse_status(raw: &str) -> Result<std::collections::BTreeSet<i32>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i32>()
                .map_err(|_| format!("Invalid status code: {:?}", s))
        })
        .collect()
}

/// Page through one user's session history.
pub async fn user_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
    Query(params): Query<HistoryQueryParams>,
) -> Result<Json<Page<HistoryRow>>, ApiError> {
    let default_per_page = state.history().composer().default_per_page();
    let view = params
        .into_view(user_id, default_per_page)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?;

    match state.history().query(&view).await {
        Ok(page) => Ok(Json(page)),
        Err(e) => {
            let status = match e {
                HistoryError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
                HistoryError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                HistoryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err(api_error(status, e))
        }
    }
}
