use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::{error_response, AppState};
use crate::error::Result;
use crate::models::RecordsPage;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// SQLite binds LIMIT/OFFSET as signed 64-bit integers.
const MAX_SQL_INT: u64 = i64::MAX as u64;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageParams {
    /// Effective (page, limit), both at least 1. `limit` is capped so it
    /// stays a valid SQL integer.
    pub fn resolve(&self) -> (u64, u64) {
        (
            self.page.unwrap_or(DEFAULT_PAGE).max(1),
            self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_SQL_INT),
        )
    }

    /// Rows to skip before the requested page. Saturates instead of
    /// overflowing for absurd page numbers.
    pub fn offset(&self) -> u64 {
        let (page, limit) = self.resolve();
        (page - 1).saturating_mul(limit).min(MAX_SQL_INT)
    }
}

pub fn fetch_page(state: &AppState, sheet_name: &str, params: &PageParams) -> Result<RecordsPage> {
    let (_, limit) = params.resolve();
    let records = state
        .store
        .find_by_sheet(sheet_name, params.offset(), limit)?;
    let total = state.store.count_by_sheet(sheet_name)?;
    Ok(RecordsPage {
        records,
        total,
        pages: total.div_ceil(limit),
    })
}

pub async fn handle(
    State(state): State<AppState>,
    Path(sheet_name): Path<String>,
    params: std::result::Result<Query<PageParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(p) => p,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid query: {}", rejection.body_text()),
            );
        }
    };

    let result = tokio::task::spawn_blocking(move || fetch_page(&state, &sheet_name, &params)).await;
    match result {
        Ok(Ok(page)) => Json(page).into_response(),
        Ok(Err(e)) => {
            log::error!("Fetch error: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch records")
        }
        Err(e) => {
            log::error!("Fetch task failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch records")
        }
    }
}
