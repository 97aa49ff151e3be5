use reqwest::blocking::{Client, Response};
use reqwest::Url;

use crate::error::{ImportError, Result, SheetportError};
use crate::models::{ErrorBody, ImportRequest, ImportSummary, RecordsPage, SheetResult};

fn endpoint(api_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(api_url)
        .map_err(|e| SheetportError::Settings(format!("invalid API URL {api_url:?}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| SheetportError::Settings(format!("API URL cannot be a base: {api_url}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Pull the server's message out of a failed response.
fn failure_message(resp: Response) -> ImportError {
    let status = resp.status();
    let message = resp
        .json::<ErrorBody>()
        .map(|b| b.error)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown error").to_string());
    ImportError::Server {
        status: status.as_u16(),
        message,
    }
}

/// Sends one validated sheet to the import endpoint.
pub struct ImportSubmitter {
    client: Client,
    url: Url,
}

impl ImportSubmitter {
    pub fn new(api_url: &str) -> Result<Self> {
        Ok(Self {
            client: Client::new(),
            url: endpoint(api_url, &["import"])?,
        })
    }

    /// Post the sheet's valid rows. The counts come back exactly as the server
    /// reported them.
    pub fn submit(&self, sheet: &SheetResult) -> std::result::Result<ImportSummary, ImportError> {
        log::debug!("POST {} ({} rows, sheet {:?})", self.url, sheet.rows.len(), sheet.label);
        let resp = self
            .client
            .post(self.url.clone())
            .json(&ImportRequest {
                records: &sheet.rows,
                sheet_name: &sheet.label,
            })
            .send()?;

        if !resp.status().is_success() {
            return Err(failure_message(resp));
        }
        let summary: ImportSummary = resp
            .json()
            .map_err(|e| ImportError::Malformed(e.to_string()))?;
        if !summary.success {
            return Err(ImportError::Malformed("server did not report success".into()));
        }
        Ok(summary)
    }
}

/// Reads previously imported records back from the query endpoint.
pub struct RecordsClient {
    client: Client,
    api_url: String,
}

impl RecordsClient {
    pub fn new(api_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.to_string(),
        }
    }

    pub fn fetch(&self, sheet_name: &str, page: u64, limit: u64) -> Result<RecordsPage> {
        let mut url = endpoint(&self.api_url, &["records", sheet_name])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        log::debug!("GET {url}");

        let resp = self.client.get(url).send()?;
        if !resp.status().is_success() {
            return Err(failure_message(resp).into());
        }
        Ok(resp.json()?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::models::Row;
    use crate::server::testing::spawn_server;
    use crate::server::{AppState, FixedClock};
    use crate::store::SqliteStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn server(clock_day: NaiveDate) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("test.db")).unwrap();
        let base = spawn_server(AppState::new(Arc::new(store), Arc::new(FixedClock(clock_day))));
        (dir, base)
    }

    fn sheet(label: &str, days: &[u32]) -> SheetResult {
        SheetResult {
            label: label.to_string(),
            rows: days
                .iter()
                .map(|&d| Row {
                    name: format!("row {d}"),
                    amount: 100.0 + d as f64,
                    date: day(d),
                    verified: d % 2 == 0,
                })
                .collect(),
            errors: Vec::new(),
        }
    }

    #[test]
    fn test_endpoint_joins_and_encodes() {
        let url = endpoint("http://localhost:3000/api/", &["records", "Q3 / west"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/records/Q3%20%2F%20west");
        assert!(endpoint("not a url", &["import"]).is_err());
    }

    #[test]
    fn test_submit_then_fetch_round_trip() {
        let (_dir, base) = server(day(18));
        let submitter = ImportSubmitter::new(&base).unwrap();
        let summary = submitter.submit(&sheet("Oct / A", &[1, 2, 3])).unwrap();
        assert_eq!(summary.imported, 3);
        assert_eq!(summary.skipped, 0);

        let page = RecordsClient::new(&base).fetch("Oct / A", 1, 2).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.pages, 2);
        assert_eq!(page.records[0].date, day(3));
        assert!(!page.records[0].verified);
        assert_eq!(page.records[1].date, day(2));
        assert!(page.records[1].verified);
    }

    #[test]
    fn test_submit_reports_server_skips_verbatim() {
        // The server has already moved into November.
        let (_dir, base) = server(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        let summary = ImportSubmitter::new(&base)
            .unwrap()
            .submit(&sheet("Oct", &[30, 31]))
            .unwrap();
        assert_eq!(summary.imported, 0);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn test_submit_surfaces_server_error_message() {
        let (_dir, base) = server(day(18));
        let mut bad = sheet("Oct", &[4]);
        bad.rows[0].amount = -1.0;
        let err = ImportSubmitter::new(&base).unwrap().submit(&bad).unwrap_err();
        match err {
            ImportError::Server { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Failed to import records");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_submit_unreachable_server() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = ImportSubmitter::new(&format!("http://{addr}"))
            .unwrap()
            .submit(&sheet("Oct", &[1]))
            .unwrap_err();
        assert!(matches!(err, ImportError::Request(_)));
    }
}
