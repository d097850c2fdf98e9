use crate::models::{MediaItem, MediaType, NewMediaItem};
use crate::models::db_operations::{decode_timestamp, encode_timestamp};
use rusqlite::{params, Connection, OptionalExtension, Row, Error as RusqliteError};

const MEDIA_COLUMNS: &str =
    "id, title, description, media_type, file_path, original_filename, uploaded_at, is_published, display_order";

fn media_from_row(row: &Row<'_>) -> Result<MediaItem, RusqliteError> {
    let uploaded_at: String = row.get(6)?;
    Ok(MediaItem {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        media_type: row.get(3)?,
        file_path: row.get(4)?,
        original_filename: row.get(5)?,
        uploaded_at: decode_timestamp(6, &uploaded_at)?,
        is_published: row.get(7)?,
        display_order: row.get(8)?,
    })
}

pub fn insert_media_item(conn: &Connection, item: &NewMediaItem<'_>) -> Result<MediaItem, RusqliteError> {
    conn.execute(
        "INSERT INTO media_items (title, description, media_type, file_path, original_filename, uploaded_at, is_published, display_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            item.title,
            item.description,
            item.media_type,
            item.file_path,
            item.original_filename,
            encode_timestamp(&item.uploaded_at),
            item.is_published,
            item.display_order,
        ],
    )?;
    let id = conn.last_insert_rowid();
    read_media_item_by_id(conn, id)?.ok_or(RusqliteError::QueryReturnedNoRows)
}

pub fn read_media_item_by_id(conn: &Connection, id: i64) -> Result<Option<MediaItem>, RusqliteError> {
    conn.query_row(
        &format!("SELECT {} FROM media_items WHERE id = ?1", MEDIA_COLUMNS),
        [id],
        media_from_row,
    ).optional()
}

/// Every item, most recently uploaded first (the admin management view).
pub fn read_all_media_items(conn: &Connection) -> Result<Vec<MediaItem>, RusqliteError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM media_items ORDER BY uploaded_at DESC, id DESC", MEDIA_COLUMNS
    ))?;
    let rows = stmt.query_map([], media_from_row)?;
    rows.collect()
}

/// Published items of one type in gallery order: ascending display order, then insertion order.
pub fn read_published_media_by_type(conn: &Connection, media_type: MediaType) -> Result<Vec<MediaItem>, RusqliteError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM media_items WHERE media_type = ?1 AND is_published = 1 ORDER BY display_order ASC, id ASC",
        MEDIA_COLUMNS
    ))?;
    let rows = stmt.query_map(params![media_type], media_from_row)?;
    rows.collect()
}

pub fn read_published_media(conn: &Connection) -> Result<Vec<MediaItem>, RusqliteError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM media_items WHERE is_published = 1 ORDER BY display_order ASC, id ASC",
        MEDIA_COLUMNS
    ))?;
    let rows = stmt.query_map([], media_from_row)?;
    rows.collect()
}

/// File paths of every photo row, for reconciliation against the file store.
pub fn read_photo_file_paths(conn: &Connection) -> Result<Vec<(i64, String)>, RusqliteError> {
    let mut stmt = conn.prepare("SELECT id, file_path FROM media_items WHERE media_type = ?1 ORDER BY id")?;
    let rows = stmt.query_map(params![MediaType::Photo], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

pub fn count_media_by_type(conn: &Connection, media_type: MediaType) -> Result<i64, RusqliteError> {
    conn.query_row(
        "SELECT COUNT(*) FROM media_items WHERE media_type = ?1",
        params![media_type],
        |row| row.get(0),
    )
}

pub fn count_published_media(conn: &Connection) -> Result<i64, RusqliteError> {
    conn.query_row(
        "SELECT COUNT(*) FROM media_items WHERE is_published = 1",
        [],
        |row| row.get(0),
    )
}

pub fn count_published_media_by_type(conn: &Connection, media_type: MediaType) -> Result<i64, RusqliteError> {
    conn.query_row(
        "SELECT COUNT(*) FROM media_items WHERE media_type = ?1 AND is_published = 1",
        params![media_type],
        |row| row.get(0),
    )
}

/// Returns the number of rows changed: 0 means no such item.
pub fn update_published_flag(conn: &Connection, id: i64, is_published: bool) -> Result<usize, RusqliteError> {
    conn.execute(
        "UPDATE media_items SET is_published = ?1 WHERE id = ?2",
        params![is_published, id],
    )
}

pub fn update_display_order(conn: &Connection, id: i64, display_order: i32) -> Result<usize, RusqliteError> {
    conn.execute(
        "UPDATE media_items SET display_order = ?1 WHERE id = ?2",
        params![display_order, id],
    )
}

pub fn update_media_details(
    conn: &Connection,
    id: i64,
    title: &str,
    description: Option<&str>,
    display_order: i32,
    is_published: bool,
) -> Result<usize, RusqliteError> {
    conn.execute(
        "UPDATE media_items SET title = ?1, description = ?2, display_order = ?3, is_published = ?4 WHERE id = ?5",
        params![title, description, display_order, is_published, id],
    )
}

pub fn delete_media_item(conn: &Connection, id: i64) -> Result<usize, RusqliteError> {
    conn.execute("DELETE FROM media_items WHERE id = ?1", [id])
}
