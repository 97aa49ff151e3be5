use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single decoded spreadsheet cell, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

/// One data row keyed by normalized (trimmed, lower-cased) header name.
/// Empty cells are not present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: BTreeMap<String, CellValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: &str, value: CellValue) {
        self.cells.insert(normalize_header(header), value);
    }

    pub fn with(mut self, header: &str, value: CellValue) -> Self {
        self.insert(header, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.cells.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

impl From<&Row> for RawRow {
    fn from(row: &Row) -> Self {
        let verified = if row.verified { "yes" } else { "no" };
        RawRow::new()
            .with("name", CellValue::Text(row.name.clone()))
            .with("amount", CellValue::Number(row.amount))
            .with("date", CellValue::Date(row.date))
            .with("verified", CellValue::Text(verified.to_string()))
    }
}

/// A validated, normalized row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub name: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub sheet_label: String,
    /// 1-based, counting the header row.
    pub row_number: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetResult {
    pub label: String,
    pub rows: Vec<Row>,
    pub errors: Vec<ValidationError>,
}

// ---------------------------------------------------------------------------
// Wire types shared by the client and the server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest<'a> {
    pub records: &'a [Row],
    pub sheet_name: &'a str,
}

/// A record as received by the import endpoint. The date stays textual so a
/// record with an unreadable date can be skipped rather than failing the body.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingRecord {
    pub name: String,
    pub amount: f64,
    pub date: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingImport {
    pub records: Vec<IncomingRecord>,
    pub sheet_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub success: bool,
    pub imported: usize,
    pub skipped: usize,
}

/// A row that passed the server-side window check, ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub name: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub verified: bool,
    pub sheet_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub id: i64,
    pub name: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub verified: bool,
    pub sheet_name: String,
    pub imported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordsPage {
    pub records: Vec<PersistedRecord>,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_normalized() {
        let row = RawRow::new().with("  Name ", CellValue::Text("Asha".into()));
        assert_eq!(row.get("name"), Some(&CellValue::Text("Asha".into())));
        assert!(row.get("Name").is_none());
    }

    #[test]
    fn test_import_request_uses_camel_case() {
        let rows = vec![Row {
            name: "Asha".into(),
            amount: 12.5,
            date: NaiveDate::from_ymd_opt(2026, 10, 3).unwrap(),
            verified: true,
        }];
        let body = serde_json::to_value(ImportRequest {
            records: &rows,
            sheet_name: "October",
        })
        .unwrap();
        assert_eq!(body["sheetName"], "October");
        assert_eq!(body["records"][0]["date"], "2026-10-03");
        assert_eq!(body["records"][0]["verified"], true);
    }

    #[test]
    fn test_incoming_record_defaults_verified() {
        let rec: IncomingRecord =
            serde_json::from_str(r#"{"name":"A","amount":1,"date":"2026-10-01"}"#).unwrap();
        assert!(!rec.verified);
    }
}
