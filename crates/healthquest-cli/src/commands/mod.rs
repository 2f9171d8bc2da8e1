pub mod config;
pub mod goal;
pub mod insights;
pub mod ledger;
pub mod metrics;
pub mod profile;
pub mod rewards;
pub mod score;

use healthquest_core::{HealthSession, SqliteStore};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the session backed by the default database.
pub fn open_session() -> Result<HealthSession<SqliteStore>, Box<dyn std::error::Error>> {
    let store = SqliteStore::open()?;
    Ok(HealthSession::load(store)?)
}

/// Single-threaded runtime for the async collaborators.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}
