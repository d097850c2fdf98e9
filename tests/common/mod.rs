#![allow(dead_code)]

use association_backend::helper::media_storage::{LocalMediaStore, MediaFileStore};
use association_backend::middleware::AuthenticatedAdmin;
use association_backend::models::db_operations::open_pool;
use association_backend::setup::db_setup;
use association_backend::DbPool;
use std::io;
use std::path::PathBuf;
use tempfile::TempDir;

/// A site database and gallery directory in a temporary folder.
pub struct TestSite {
    pub dir: TempDir,
    pub pool: DbPool,
    pub store: LocalMediaStore,
}

pub fn site() -> TestSite {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = open_pool(&dir.path().join("site.db")).expect("pool");
    {
        let mut conn = pool.get().expect("connection");
        db_setup::setup_site_db(&mut conn).expect("schema");
    }
    let store = LocalMediaStore::new(dir.path().join("gallery"));
    TestSite { dir, pool, store }
}

pub fn admin() -> AuthenticatedAdmin {
    AuthenticatedAdmin { username: "moderator".to_string() }
}

/// Local store whose deletions always fail.
pub struct UndeletableStore(pub LocalMediaStore);

impl MediaFileStore for UndeletableStore {
    fn root_exists(&self) -> bool {
        self.0.root_exists()
    }
    fn create_root(&self) -> io::Result<()> {
        self.0.create_root()
    }
    fn write_file(&self, key: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        self.0.write_file(key, bytes)
    }
    fn delete_file(&self, _key: &str) -> io::Result<bool> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"))
    }
    fn file_exists(&self, key: &str) -> bool {
        self.0.file_exists(key)
    }
    fn list_files(&self) -> io::Result<Vec<String>> {
        self.0.list_files()
    }
}
