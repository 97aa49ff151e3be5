pub mod check;
pub mod config;
pub mod import;
pub mod records;
pub mod review;
pub mod serve;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::models::SheetResult;
use crate::sheet::{parse_workbook, read_upload};

/// Read, size-check and validate an upload in one go.
pub(crate) fn load_workbook(file: &str) -> Result<Vec<SheetResult>> {
    let bytes = read_upload(Path::new(file))?;
    parse_workbook(&bytes)
}

#[derive(Parser)]
#[command(name = "sheetport", about = "Validate spreadsheet rows and import them into the record store.")]
pub struct Cli {
    /// Base URL of the import server (overrides settings and SHEETPORT_API_URL)
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate an .xlsx file and list the problems found in each sheet.
    Check {
        /// Path to the .xlsx file (2MB max)
        file: String,
    },
    /// Interactively review, prune and import the sheets of an .xlsx file.
    Review {
        /// Path to the .xlsx file (2MB max)
        file: String,
    },
    /// Validate an .xlsx file and import one sheet's valid rows.
    Import {
        /// Path to the .xlsx file (2MB max)
        file: String,
        /// Sheet to import (default: the first sheet)
        #[arg(long)]
        sheet: Option<String>,
    },
    /// Show records previously imported for a sheet.
    Records {
        /// Sheet name used at import time
        sheet: String,
        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u64,
        /// Records per page
        #[arg(long, default_value = "10")]
        limit: u64,
    },
    /// Run the import server.
    Serve {
        /// Address to listen on (default from settings: 127.0.0.1:3000)
        #[arg(long)]
        bind: Option<String>,
        /// SQLite database path (default: <data_dir>/sheetport.db)
        #[arg(long)]
        db: Option<String>,
    },
    /// Show or update saved settings. A global --api-url is saved as the default server URL.
    Config {
        /// Default listen address for `serve`
        #[arg(long)]
        bind: Option<String>,
        /// Directory holding the server database
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
}
