use crate::client::ImportSubmitter;
use crate::error::{Result, SheetportError};
use crate::fmt::import_message;
use crate::models::SheetResult;

use super::load_workbook;

pub fn run(file: &str, sheet: Option<&str>, api_url: &str) -> Result<()> {
    let sheets = load_workbook(file)?;
    let target = pick_sheet(sheets, sheet)?;

    if !target.errors.is_empty() {
        println!(
            "{} rows in \"{}\" failed validation and will not be sent (run `sheetport check` for details).",
            target.errors.len(),
            target.label
        );
    }

    let submitter = ImportSubmitter::new(api_url)?;
    let summary = submitter.submit(&target)?;
    println!("{}", import_message(&summary));
    Ok(())
}

fn pick_sheet(sheets: Vec<SheetResult>, name: Option<&str>) -> Result<SheetResult> {
    match name {
        Some(name) => sheets
            .into_iter()
            .find(|s| s.label == name)
            .ok_or_else(|| SheetportError::UnknownSheet(name.to_string())),
        None => sheets
            .into_iter()
            .next()
            .ok_or_else(|| SheetportError::Other("Workbook has no worksheets".into())),
    }
}
