use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn setup_site_db(conn: &mut Connection) -> Result<(), SetupError> {
    let tx = conn.transaction()?;
    log::info!("Creating 'members' table...");
    // The UNIQUE constraint on email is the authoritative duplicate check;
    // the registration workflow only checks ahead of it.
    tx.execute(
        "CREATE TABLE IF NOT EXISTS members (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT NOT NULL,
            message TEXT,
            registered_at TEXT NOT NULL,
            status TEXT NOT NULL CHECK(status IN ('PENDING', 'ACTIVE', 'INACTIVE'))
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_members_status ON members (status, registered_at)",
        [],
    )?;

    log::info!("Creating 'contact_messages' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS contact_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            subject TEXT NOT NULL,
            body TEXT NOT NULL,
            received_at TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_contact_messages_read ON contact_messages (is_read, received_at)",
        [],
    )?;

    log::info!("Creating 'media_items' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS media_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            media_type TEXT NOT NULL CHECK(media_type IN ('PHOTO', 'VIDEO')),
            file_path TEXT NOT NULL,
            original_filename TEXT,
            uploaded_at TEXT NOT NULL,
            is_published INTEGER NOT NULL DEFAULT 1,
            display_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;
    tx.execute(
        "CREATE INDEX IF NOT EXISTS idx_media_items_gallery ON media_items (media_type, is_published, display_order)",
        [],
    )?;

    log::info!("Creating 'admin_users' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS admin_users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            full_name TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            last_login_time TEXT
        )",
        [],
    )?;

    tx.commit()?;
    Ok(())
}
