use crate::models::{Member, MemberStatus};
use crate::models::db_operations::{decode_timestamp, encode_timestamp};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Error as RusqliteError};

const MEMBER_COLUMNS: &str = "id, full_name, email, phone, message, registered_at, status";

fn member_from_row(row: &Row<'_>) -> Result<Member, RusqliteError> {
    let registered_at: String = row.get(5)?;
    Ok(Member {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        message: row.get(4)?,
        registered_at: decode_timestamp(5, &registered_at)?,
        status: row.get(6)?,
    })
}

/// Inserts a member row. A second row with the same email fails on the
/// table's UNIQUE constraint, whatever the caller checked beforehand.
pub fn insert_member(
    conn: &Connection,
    full_name: &str,
    email: &str,
    phone: &str,
    message: Option<&str>,
    registered_at: &DateTime<Utc>,
    status: MemberStatus,
) -> Result<Member, RusqliteError> {
    conn.execute(
        "INSERT INTO members (full_name, email, phone, message, registered_at, status) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![full_name, email, phone, message, encode_timestamp(registered_at), status],
    )?;
    let id = conn.last_insert_rowid();
    read_member_by_id(conn, id)?.ok_or(RusqliteError::QueryReturnedNoRows)
}

pub fn read_member_by_id(conn: &Connection, id: i64) -> Result<Option<Member>, RusqliteError> {
    conn.query_row(
        &format!("SELECT {} FROM members WHERE id = ?1", MEMBER_COLUMNS),
        [id],
        member_from_row,
    ).optional()
}

pub fn read_member_by_email(conn: &Connection, email: &str) -> Result<Option<Member>, RusqliteError> {
    conn.query_row(
        &format!("SELECT {} FROM members WHERE email = ?1", MEMBER_COLUMNS),
        [email],
        member_from_row,
    ).optional()
}

pub fn member_exists_by_email(conn: &Connection, email: &str) -> Result<bool, RusqliteError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM members WHERE email = ?1)",
        [email],
        |row| row.get(0),
    )
}

pub fn read_all_members(conn: &Connection) -> Result<Vec<Member>, RusqliteError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM members ORDER BY registered_at DESC, id DESC", MEMBER_COLUMNS
    ))?;
    let rows = stmt.query_map([], member_from_row)?;
    rows.collect()
}

/// Members in a given status, newest registration first. `limit` bounds the
/// result for previews.
pub fn read_members_by_status(
    conn: &Connection,
    status: MemberStatus,
    limit: Option<u32>,
) -> Result<Vec<Member>, RusqliteError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM members WHERE status = ?1 ORDER BY registered_at DESC, id DESC LIMIT ?2",
        MEMBER_COLUMNS
    ))?;
    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map(i64::from).unwrap_or(-1);
    let rows = stmt.query_map(params![status, limit], member_from_row)?;
    rows.collect()
}

pub fn count_members_by_status(conn: &Connection, status: MemberStatus) -> Result<i64, RusqliteError> {
    conn.query_row(
        "SELECT COUNT(*) FROM members WHERE status = ?1",
        params![status],
        |row| row.get(0),
    )
}

pub fn count_members(conn: &Connection) -> Result<i64, RusqliteError> {
    conn.query_row("SELECT COUNT(*) FROM members", [], |row| row.get(0))
}

/// Returns the number of rows changed: 0 means no such member.
pub fn update_member_status(conn: &Connection, id: i64, status: MemberStatus) -> Result<usize, RusqliteError> {
    conn.execute(
        "UPDATE members SET status = ?1 WHERE id = ?2",
        params![status, id],
    )
}

pub fn delete_member(conn: &Connection, id: i64) -> Result<usize, RusqliteError> {
    conn.execute("DELETE FROM members WHERE id = ?1", [id])
}
