use crate::models::ContactMessage;
use crate::models::db_operations::{decode_timestamp, encode_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Error as RusqliteError};

const CONTACT_COLUMNS: &str = "id, name, email, subject, body, received_at, is_read";

fn contact_from_row(row: &Row<'_>) -> Result<ContactMessage, RusqliteError> {
    let received_at: String = row.get(5)?;
    Ok(ContactMessage {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        subject: row.get(3)?,
        body: row.get(4)?,
        received_at: decode_timestamp(5, &received_at)?,
        is_read: row.get(6)?,
    })
}

pub fn insert_contact_message(
    conn: &Connection,
    name: &str,
    email: &str,
    subject: &str,
    body: &str,
    received_at: &DateTime<Utc>,
) -> Result<ContactMessage, RusqliteError> {
    conn.execute(
        "INSERT INTO contact_messages (name, email, subject, body, received_at, is_read) VALUES (?1, ?2, ?3, ?4, ?5, 0)",
        params![name, email, subject, body, encode_timestamp(received_at)],
    )?;
    let id = conn.last_insert_rowid();
    read_contact_message_by_id(conn, id)?.ok_or(RusqliteError::QueryReturnedNoRows)
}

pub fn read_contact_message_by_id(conn: &Connection, id: i64) -> Result<Option<ContactMessage>, RusqliteError> {
    conn.query_row(
        &format!("SELECT {} FROM contact_messages WHERE id = ?1", CONTACT_COLUMNS),
        [id],
        contact_from_row,
    ).optional()
}

fn query_contacts<P: rusqlite::Params>(
    conn: &Connection,
    filter: &str,
    args: P,
) -> Result<Vec<ContactMessage>, RusqliteError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM contact_messages {} ORDER BY received_at DESC, id DESC",
        CONTACT_COLUMNS, filter
    ))?;
    let rows = stmt.query_map(args, contact_from_row)?;
    rows.collect()
}

/// All messages, newest received first.
pub fn read_all_contact_messages(conn: &Connection) -> Result<Vec<ContactMessage>, RusqliteError> {
    query_contacts(conn, "", params![])
}

pub fn read_contact_messages_by_read_flag(conn: &Connection, is_read: bool) -> Result<Vec<ContactMessage>, RusqliteError> {
    query_contacts(conn, "WHERE is_read = ?1", [is_read])
}

pub fn read_contact_messages_by_email(conn: &Connection, email: &str) -> Result<Vec<ContactMessage>, RusqliteError> {
    query_contacts(conn, "WHERE email = ?1", [email])
}

pub fn read_recent_unread_contact_messages(conn: &Connection, limit: u32) -> Result<Vec<ContactMessage>, RusqliteError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM contact_messages WHERE is_read = 0 ORDER BY received_at DESC, id DESC LIMIT ?1",
        CONTACT_COLUMNS
    ))?;
    let rows = stmt.query_map([limit], contact_from_row)?;
    rows.collect()
}

pub fn count_unread_contact_messages(conn: &Connection) -> Result<i64, RusqliteError> {
    conn.query_row(
        "SELECT COUNT(*) FROM contact_messages WHERE is_read = 0",
        [],
        |row| row.get(0),
    )
}

/// Returns the number of rows changed: 0 means no such message.
pub fn update_read_flag(conn: &Connection, id: i64, is_read: bool) -> Result<usize, RusqliteError> {
    conn.execute(
        "UPDATE contact_messages SET is_read = ?1 WHERE id = ?2",
        params![is_read, id],
    )
}

pub fn delete_contact_message(conn: &Connection, id: i64) -> Result<usize, RusqliteError> {
    conn.execute("DELETE FROM contact_messages WHERE id = ?1", [id])
}
