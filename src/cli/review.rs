use crate::browser::SheetBrowser;
use crate::client::ImportSubmitter;
use crate::error::Result;
use crate::fmt::import_message;
use crate::workspace::Workspace;

use super::load_workbook;

pub fn run(file: &str, api_url: &str) -> Result<()> {
    let sheets = load_workbook(file)?;
    let submitter = ImportSubmitter::new(api_url)?;
    let mut browser = SheetBrowser::new(Workspace::new(sheets));
    browser.run(&submitter)?;

    for (label, summary) in browser.imported() {
        println!("{label}: {}", import_message(summary));
    }
    let left = browser.workspace().sheets().len();
    if left > 0 {
        println!("{left} sheet(s) were not imported.");
    }
    Ok(())
}
