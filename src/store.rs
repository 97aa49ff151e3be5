use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::error::Result;
use crate::models::{NewRecord, PersistedRecord};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    amount REAL NOT NULL CHECK (amount >= 0),
    date TEXT NOT NULL,
    verified INTEGER NOT NULL DEFAULT 0,
    sheet_name TEXT NOT NULL,
    imported_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_records_sheet_date ON records (sheet_name, date);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistence for imported records. Implementations are shared across
/// request handlers and blocking insert tasks.
pub trait RecordStore: Send + Sync {
    /// Insert one chunk as a unit. Returns the number of rows written.
    fn insert_chunk(&self, rows: &[NewRecord], imported_at: DateTime<Utc>) -> Result<usize>;

    /// Records for a sheet, newest date first.
    fn find_by_sheet(&self, sheet_name: &str, offset: u64, limit: u64) -> Result<Vec<PersistedRecord>>;

    fn count_by_sheet(&self, sheet_name: &str) -> Result<u64>;
}

/// Clamp a row count into SQLite's signed integer range. A negative LIMIT
/// would mean "no limit".
fn sql_int(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite-backed store. Every call opens its own connection so concurrent
/// chunk inserts do not share a handle.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        Ok(Self {
            db_path: db_path.to_path_buf(),
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl RecordStore for SqliteStore {
    fn insert_chunk(&self, rows: &[NewRecord], imported_at: DateTime<Utc>) -> Result<usize> {
        let mut conn = get_connection(&self.db_path)?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO records (name, amount, date, verified, sheet_name, imported_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.name,
                    row.amount,
                    row.date,
                    row.verified,
                    row.sheet_name,
                    imported_at,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn find_by_sheet(&self, sheet_name: &str, offset: u64, limit: u64) -> Result<Vec<PersistedRecord>> {
        let conn = get_connection(&self.db_path)?;
        let mut stmt = conn.prepare(
            "SELECT id, name, amount, date, verified, sheet_name, imported_at \
             FROM records WHERE sheet_name = ?1 \
             ORDER BY date DESC, id ASC \
             LIMIT ?2 OFFSET ?3",
        )?;
        let records = stmt
            .query_map(
                rusqlite::params![sheet_name, sql_int(limit), sql_int(offset)],
                |row| {
                    Ok(PersistedRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        amount: row.get(2)?,
                        date: row.get(3)?,
                        verified: row.get(4)?,
                        sheet_name: row.get(5)?,
                        imported_at: row.get(6)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn count_by_sheet(&self, sheet_name: &str) -> Result<u64> {
        let conn = get_connection(&self.db_path)?;
        let count: i64 = conn.query_row(
            "SELECT count(*) FROM records WHERE sheet_name = ?1",
            [sheet_name],
            |r| r.get(0),
        )?;
        Ok(count as u64)
    }
}
