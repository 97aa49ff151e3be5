use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx};
use chrono::{Local, NaiveDate};

use crate::error::{Result, SheetportError};
use crate::models::{CellValue, RawRow, SheetResult};
use crate::validator::{excel_serial_to_date, validate};

/// Upload ceiling, inclusive.
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024;

fn check_size(size: u64) -> Result<()> {
    if size > MAX_UPLOAD_BYTES {
        return Err(SheetportError::FileTooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// Read an upload from disk, rejecting non-.xlsx files and anything over the
/// size ceiling before the contents are touched.
pub fn read_upload(path: &Path) -> Result<Vec<u8>> {
    let is_xlsx = path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("xlsx"));
    if !is_xlsx {
        return Err(SheetportError::UnsupportedFile(path.display().to_string()));
    }
    check_size(std::fs::metadata(path)?.len())?;
    Ok(std::fs::read(path)?)
}

pub fn parse_workbook(bytes: &[u8]) -> Result<Vec<SheetResult>> {
    parse_workbook_at(bytes, Local::now().date_naive())
}

/// Decode every worksheet in file order and validate its rows against
/// `today`. Sheets without a single valid row are still returned.
pub fn parse_workbook_at(bytes: &[u8], today: NaiveDate) -> Result<Vec<SheetResult>> {
    check_size(bytes.len() as u64)?;

    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    let mut sheets = Vec::new();
    for label in workbook.sheet_names() {
        let range = workbook.worksheet_range(&label)?;
        sheets.push(validate_sheet(&label, &sheet_rows(&range), today));
    }
    Ok(sheets)
}

pub fn validate_sheet(label: &str, rows: &[RawRow], today: NaiveDate) -> SheetResult {
    let mut result = SheetResult {
        label: label.to_string(),
        ..Default::default()
    };
    for (index, raw) in rows.iter().enumerate() {
        match validate(raw, index, label, today) {
            Ok(row) => result.rows.push(row),
            Err(errors) => result.errors.extend(errors),
        }
    }
    result
}

/// Turn a worksheet into header-keyed rows. The first row supplies the field
/// names; fully blank rows are dropped.
fn sheet_rows(range: &Range<Data>) -> Vec<RawRow> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = header_row.iter().map(header_text).collect();

    rows.filter_map(|cells| {
        let mut raw = RawRow::new();
        for (header, cell) in headers.iter().zip(cells) {
            if header.is_empty() {
                continue;
            }
            if let Some(value) = cell_value(cell) {
                raw.insert(header, value);
            }
        }
        (!raw.is_empty()).then_some(raw)
    })
    .collect()
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            Some(excel_serial_to_date(serial).map_or(CellValue::Number(serial), CellValue::Date))
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
    }
}
