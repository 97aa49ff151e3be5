use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{NaiveDate, Utc};
use futures::future::join_all;

use super::{error_response, AppState};
use crate::error::{Result, SheetportError};
use crate::models::{ImportSummary, IncomingImport, IncomingRecord, NewRecord};
use crate::validator::{in_month_window, parse_date_text};

pub const CHUNK_SIZE: usize = 1000;

/// Keep the records whose date lies in `today`'s month, tagged with the sheet.
/// Records with unreadable dates are dropped along with out-of-window ones.
pub fn accept_records(records: Vec<IncomingRecord>, sheet_name: &str, today: NaiveDate) -> Vec<NewRecord> {
    records
        .into_iter()
        .filter_map(|rec| {
            let date = parse_date_text(&rec.date)?;
            in_month_window(date, today).then(|| NewRecord {
                name: rec.name,
                amount: rec.amount,
                date,
                verified: rec.verified,
                sheet_name: sheet_name.to_string(),
            })
        })
        .collect()
}

/// Filter and insert one import. Chunks are written concurrently, each in its
/// own transaction; a failed chunk does not undo the others.
pub async fn import_records(state: &AppState, payload: IncomingImport) -> Result<ImportSummary> {
    let received = payload.records.len();
    let accepted = accept_records(payload.records, &payload.sheet_name, state.clock.today());
    let imported = accepted.len();
    let imported_at = Utc::now();

    let tasks = accepted.chunks(CHUNK_SIZE).map(|chunk| {
        let store = Arc::clone(&state.store);
        let chunk = chunk.to_vec();
        tokio::task::spawn_blocking(move || store.insert_chunk(&chunk, imported_at))
    });

    let mut failure = None;
    for outcome in join_all(tasks).await {
        let err = match outcome {
            Ok(Ok(_)) => continue,
            Ok(Err(e)) => e,
            Err(e) => SheetportError::Storage(format!("insert task failed: {e}")),
        };
        log::error!("chunk insert for sheet {:?} failed: {err}", payload.sheet_name);
        failure.get_or_insert(err);
    }
    if let Some(err) = failure {
        return Err(err);
    }

    Ok(ImportSummary {
        success: true,
        imported,
        skipped: received - imported,
    })
}

pub async fn handle(
    State(state): State<AppState>,
    payload: std::result::Result<Json<IncomingImport>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            log::warn!("rejected import body: {}", rejection.body_text());
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid import payload: {}", rejection.body_text()),
            );
        }
    };

    let sheet_name = payload.sheet_name.clone();
    let received = payload.records.len();
    match import_records(&state, payload).await {
        Ok(summary) => {
            log::info!(
                "sheet {sheet_name:?}: {received} received, {} imported, {} skipped",
                summary.imported,
                summary.skipped
            );
            Json(summary).into_response()
        }
        Err(e) => {
            log::error!("Import error: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to import records")
        }
    }
}
