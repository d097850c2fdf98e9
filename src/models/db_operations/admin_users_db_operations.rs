use crate::models::AdminUser;
use bcrypt::{hash, verify, BcryptError};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row, Error as RusqliteError};

fn bcrypt_to_rusqlite_error(e: BcryptError) -> RusqliteError {
    RusqliteError::ToSqlConversionFailure(Box::new(e))
}

fn admin_from_row(row: &Row<'_>) -> Result<AdminUser, RusqliteError> {
    Ok(AdminUser {
        id: row.get(0)?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        is_active: row.get(3)?,
        created_at: row.get(4)?,
        last_login_time: row.get(5)?,
    })
}

pub fn create_admin(
    conn: &Connection,
    username: &str,
    password: &str,
    full_name: Option<&str>,
) -> Result<(), RusqliteError> {
    let hashed_password = hash(password, bcrypt::DEFAULT_COST).map_err(bcrypt_to_rusqlite_error)?;
    conn.execute(
        "INSERT INTO admin_users (username, password_hash, full_name, is_active, created_at) VALUES (?1, ?2, ?3, 1, ?4)",
        params![username, hashed_password, full_name, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

pub fn read_all_admins(conn: &Connection) -> Result<Vec<AdminUser>, RusqliteError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, full_name, is_active, created_at, last_login_time FROM admin_users ORDER BY username"
    )?;
    let admins = stmt.query_map([], admin_from_row)?;
    admins.collect()
}

pub fn read_admin_by_username(conn: &Connection, username: &str) -> Result<Option<AdminUser>, RusqliteError> {
    conn.query_row(
        "SELECT id, username, full_name, is_active, created_at, last_login_time FROM admin_users WHERE username = ?1",
        [username],
        admin_from_row,
    ).optional()
}

pub fn count_admins(conn: &Connection) -> Result<i64, RusqliteError> {
    conn.query_row("SELECT COUNT(*) FROM admin_users", [], |row| row.get(0))
}

/// Returns the username when the password matches an active account.
pub fn verify_credentials(conn: &Connection, username: &str, password: &str) -> Option<String> {
    let res: rusqlite::Result<(String, bool)> = conn.query_row(
        "SELECT password_hash, is_active FROM admin_users WHERE username = ?1",
        [username],
        |row| Ok((row.get(0)?, row.get(1)?)),
    );

    if let Ok((hash, is_active)) = res {
        if is_active && verify(password, &hash).unwrap_or(false) {
            return Some(username.to_string());
        }
    }
    None
}

pub fn update_last_login_time(conn: &Connection, username: &str) -> Result<(), RusqliteError> {
    let now = Utc::now().to_rfc3339();
    conn.execute("UPDATE admin_users SET last_login_time = ?1 WHERE username = ?2", params![now, username])?;
    Ok(())
}

pub fn change_password(conn: &Connection, username: &str, new_password: &str) -> Result<usize, RusqliteError> {
    let hashed_password = hash(new_password, bcrypt::DEFAULT_COST).map_err(bcrypt_to_rusqlite_error)?;
    conn.execute(
        "UPDATE admin_users SET password_hash = ?1 WHERE username = ?2",
        params![hashed_password, username],
    )
}

pub fn set_active(conn: &Connection, username: &str, is_active: bool) -> Result<usize, RusqliteError> {
    conn.execute(
        "UPDATE admin_users SET is_active = ?1 WHERE username = ?2",
        params![is_active, username],
    )
}
