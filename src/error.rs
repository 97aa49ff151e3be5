use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetportError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read workbook: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("File size exceeds {}MB limit ({size} bytes)", .limit / (1024 * 1024))]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Unsupported file: {0} (only .xlsx files are accepted)")]
    UnsupportedFile(String),

    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

/// Failure while submitting a sheet to the import endpoint.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server responded {status}: {message}")]
    Server { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, SheetportError>;
