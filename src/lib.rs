use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use helper::media_storage::MediaFileStore;

pub type DbPool = Pool<SqliteConnectionManager>;

pub struct AppState {
    pub media_store: Arc<dyn MediaFileStore>,
}

pub mod config;
pub mod helper;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod setup;
