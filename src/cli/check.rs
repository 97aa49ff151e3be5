use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::models::SheetResult;

use super::load_workbook;

pub fn run(file: &str) -> Result<()> {
    let sheets = load_workbook(file)?;
    if sheets.is_empty() {
        println!("No worksheets found.");
        return Ok(());
    }
    print!("{}", render(&sheets));
    Ok(())
}

fn render(sheets: &[SheetResult]) -> String {
    let mut summary = Table::new();
    summary.set_header(vec!["Sheet", "Valid rows", "Errors"]);
    for sheet in sheets {
        let errors = if sheet.errors.is_empty() {
            "0".green().to_string()
        } else {
            sheet.errors.len().to_string().red().to_string()
        };
        summary.add_row(vec![
            Cell::new(&sheet.label),
            Cell::new(sheet.rows.len()),
            Cell::new(errors),
        ]);
    }
    let mut out = format!("{}\n{summary}\n", "Sheets".bold());

    let total: usize = sheets.iter().map(|s| s.errors.len()).sum();
    if total == 0 {
        out.push_str(&format!("{}\n", "All rows are valid.".green()));
        return out;
    }

    let mut errors = Table::new();
    errors.set_header(vec!["Sheet", "Row", "Problem"]);
    for err in sheets.iter().flat_map(|s| s.errors.iter()) {
        errors.add_row(vec![
            Cell::new(&err.sheet_label),
            Cell::new(err.row_number),
            Cell::new(&err.message),
        ]);
    }
    out.push_str(&format!("\n{}\n{errors}\n", format!("Validation errors ({total})").red().bold()));
    out
}
