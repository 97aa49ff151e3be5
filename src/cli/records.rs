use comfy_table::{Cell, Table};

use crate::client::RecordsClient;
use crate::error::Result;
use crate::fmt::{display_date, rupees, yes_no};
use crate::models::RecordsPage;

pub fn run(sheet: &str, page: u64, limit: u64, api_url: &str) -> Result<()> {
    let result = RecordsClient::new(api_url).fetch(sheet, page, limit)?;
    if result.records.is_empty() {
        println!("No records for \"{sheet}\" on page {page} ({} total).", result.total);
        return Ok(());
    }
    println!("{}", render(sheet, page, &result));
    Ok(())
}

fn render(sheet: &str, page: u64, result: &RecordsPage) -> String {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Amount", "Date", "Verified", "Imported"]);
    for r in &result.records {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.name),
            Cell::new(rupees(r.amount)),
            Cell::new(display_date(r.date)),
            Cell::new(yes_no(r.verified)),
            Cell::new(r.imported_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    format!(
        "{sheet}\n{table}\nPage {page} of {} | {} records",
        result.pages.max(1),
        result.total
    )
}
