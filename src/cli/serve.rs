use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Result, SheetportError};
use crate::server::{self, AppState, SystemClock};
use crate::settings::load_settings;
use crate::store::SqliteStore;

pub fn run(bind: Option<&str>, db: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let bind = bind.unwrap_or(&settings.bind_addr);
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| SheetportError::Settings(format!("invalid bind address {bind:?}: {e}")))?;
    let db_path = db.map(PathBuf::from).unwrap_or_else(|| settings.db_path());

    let store = SqliteStore::open(&db_path)?;
    log::info!("using database {}", store.db_path().display());
    let state = AppState::new(Arc::new(store), Arc::new(SystemClock));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(addr, state))
}
