use crate::helper::media_storage::{
    key_from_photo_url, photo_url, FileCleanup, MediaFileStore, StorageCleanupFailed,
};
use crate::helper::sanitization_helpers::{optional_text, required_text};
use crate::helper::{get_conn, WorkflowError};
use crate::middleware::AuthenticatedAdmin;
use crate::models::db_operations::media_db_operations;
use crate::models::{MediaDetailsUpdate, MediaItem, MediaType, NewMediaItem};
use crate::DbPool;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

const MEDIA_ITEM: &str = "Media item";
const DEFAULT_EXTENSION: &str = "jpg";

/// Extension for a stored photo, taken from the uploaded file name.
/// Anything that is not 1 to 10 ASCII alphanumerics falls back to `jpg`.
fn safe_extension(original_filename: Option<&str>) -> String {
    original_filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .filter(|ext| (1..=10).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn validated_title(title: &str) -> Result<String, WorkflowError> {
    required_text("title", title, 3, 150)
}

fn validated_description(description: Option<&str>) -> Result<Option<String>, WorkflowError> {
    optional_text("description", description, 500)
}

/// Stores an uploaded photo and records it as a published PHOTO item.
///
/// The file is written first. If the record cannot be inserted the file is
/// removed again; a failed removal is logged and left for [`reconcile`].
pub fn add_photo(
    pool: &DbPool,
    store: &dyn MediaFileStore,
    admin: &AuthenticatedAdmin,
    bytes: &[u8],
    original_filename: Option<&str>,
    title: &str,
    description: Option<&str>,
) -> Result<MediaItem, WorkflowError> {
    if bytes.is_empty() {
        return Err(WorkflowError::InvalidInput("photo file is empty".to_string()));
    }
    let title = validated_title(title)?;
    let description = validated_description(description)?;
    let original_filename = original_filename.map(str::trim).filter(|name| !name.is_empty());

    if !store.root_exists() {
        store.create_root().map_err(WorkflowError::StorageWriteFailed)?;
    }

    let key = format!("{}.{}", Uuid::new_v4(), safe_extension(original_filename));
    store.write_file(&key, bytes).map_err(|e| {
        log::error!("Failed to write photo file '{}': {}", key, e);
        WorkflowError::StorageWriteFailed(e)
    })?;

    let file_path = photo_url(&key);
    let inserted = get_conn(pool).and_then(|conn| {
        media_db_operations::insert_media_item(&conn, &NewMediaItem {
            title: &title,
            description: description.as_deref(),
            media_type: MediaType::Photo,
            file_path: &file_path,
            original_filename,
            uploaded_at: Utc::now(),
            is_published: true,
            display_order: 0,
        })
        .map_err(WorkflowError::from)
    });

    match inserted {
        Ok(item) => {
            log::info!("Admin '{}' added photo {} at '{}'", admin.username, item.id, item.file_path);
            Ok(item)
        }
        Err(e) => {
            log::error!("Failed to record photo '{}', removing the file: {}", key, e);
            if let Err(cleanup) = store.delete_file(&key) {
                let failure = StorageCleanupFailed { path: file_path, reason: cleanup.to_string() };
                log::error!("{}", failure);
            }
            Err(e)
        }
    }
}

/// Records an externally hosted video as a published VIDEO item.
pub fn add_video(
    pool: &DbPool,
    admin: &AuthenticatedAdmin,
    title: &str,
    description: Option<&str>,
    url: &str,
) -> Result<MediaItem, WorkflowError> {
    let title = validated_title(title)?;
    let description = validated_description(description)?;
    let url = url.trim();
    if url.is_empty() {
        return Err(WorkflowError::InvalidInput("video URL is required".to_string()));
    }
    if url.chars().count() > 500 {
        return Err(WorkflowError::InvalidInput("video URL must not exceed 500 characters".to_string()));
    }

    let conn = get_conn(pool)?;
    let item = media_db_operations::insert_media_item(&conn, &NewMediaItem {
        title: &title,
        description: description.as_deref(),
        media_type: MediaType::Video,
        file_path: url,
        original_filename: None,
        uploaded_at: Utc::now(),
        is_published: true,
        display_order: 0,
    })?;
    log::info!("Admin '{}' added video {} ({})", admin.username, item.id, item.file_path);
    Ok(item)
}

pub fn set_published(
    pool: &DbPool,
    admin: &AuthenticatedAdmin,
    id: i64,
    is_published: bool,
) -> Result<(), WorkflowError> {
    let conn = get_conn(pool)?;
    match media_db_operations::update_published_flag(&conn, id, is_published)? {
        0 => Err(WorkflowError::not_found(MEDIA_ITEM, id)),
        _ => {
            log::info!("Admin '{}' set media item {} published={}", admin.username, id, is_published);
            Ok(())
        }
    }
}

pub fn set_display_order(
    pool: &DbPool,
    admin: &AuthenticatedAdmin,
    id: i64,
    display_order: i32,
) -> Result<(), WorkflowError> {
    let conn = get_conn(pool)?;
    match media_db_operations::update_display_order(&conn, id, display_order)? {
        0 => Err(WorkflowError::not_found(MEDIA_ITEM, id)),
        _ => {
            log::info!("Admin '{}' moved media item {} to position {}", admin.username, id, display_order);
            Ok(())
        }
    }
}

/// Edits title, description, position and visibility. Type and file reference stay as they are.
pub fn update_details(
    pool: &DbPool,
    admin: &AuthenticatedAdmin,
    id: i64,
    update: &MediaDetailsUpdate,
) -> Result<MediaItem, WorkflowError> {
    let title = validated_title(&update.title)?;
    let description = validated_description(update.description.as_deref())?;

    let conn = get_conn(pool)?;
    let changed = media_db_operations::update_media_details(
        &conn,
        id,
        &title,
        description.as_deref(),
        update.display_order,
        update.is_published,
    )?;
    if changed == 0 {
        return Err(WorkflowError::not_found(MEDIA_ITEM, id));
    }
    log::info!("Admin '{}' updated media item {}", admin.username, id);
    media_db_operations::read_media_item_by_id(&conn, id)?.ok_or_else(|| WorkflowError::not_found(MEDIA_ITEM, id))
}

/// Deletes a media item. The record goes first; for a photo the backing file
/// is then removed on a best-effort basis and the outcome reported.
pub fn delete(
    pool: &DbPool,
    store: &dyn MediaFileStore,
    admin: &AuthenticatedAdmin,
    id: i64,
) -> Result<FileCleanup, WorkflowError> {
    let conn = get_conn(pool)?;
    let item = media_db_operations::read_media_item_by_id(&conn, id)?
        .ok_or_else(|| WorkflowError::not_found(MEDIA_ITEM, id))?;

    if media_db_operations::delete_media_item(&conn, id)? == 0 {
        return Err(WorkflowError::not_found(MEDIA_ITEM, id));
    }
    log::info!("Admin '{}' deleted media item {} ({})", admin.username, id, item.media_type);

    if item.media_type == MediaType::Video {
        return Ok(FileCleanup::NotRequired);
    }

    let cleanup = match key_from_photo_url(&item.file_path) {
        Some(key) => match store.delete_file(key) {
            Ok(true) => FileCleanup::Removed,
            Ok(false) => {
                log::warn!("Photo file '{}' was already missing when media item {} was deleted", item.file_path, id);
                FileCleanup::AlreadyMissing
            }
            Err(e) => FileCleanup::Failed(StorageCleanupFailed { path: item.file_path.clone(), reason: e.to_string() }),
        },
        None => FileCleanup::Failed(StorageCleanupFailed {
            path: item.file_path.clone(),
            reason: "reference is not a stored gallery file".to_string(),
        }),
    };
    if let FileCleanup::Failed(failure) = &cleanup {
        log::error!("Media item {} deleted but {}", id, failure);
    }
    Ok(cleanup)
}

pub fn get(pool: &DbPool, id: i64) -> Result<MediaItem, WorkflowError> {
    let conn = get_conn(pool)?;
    media_db_operations::read_media_item_by_id(&conn, id)?.ok_or_else(|| WorkflowError::not_found(MEDIA_ITEM, id))
}

pub fn list_published_by_type(pool: &DbPool, media_type: MediaType) -> Result<Vec<MediaItem>, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(media_db_operations::read_published_media_by_type(&conn, media_type)?)
}

pub fn list_published(pool: &DbPool) -> Result<Vec<MediaItem>, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(media_db_operations::read_published_media(&conn)?)
}

pub fn list_all(pool: &DbPool) -> Result<Vec<MediaItem>, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(media_db_operations::read_all_media_items(&conn)?)
}

pub fn count_by_type(pool: &DbPool, media_type: MediaType) -> Result<i64, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(media_db_operations::count_media_by_type(&conn, media_type)?)
}

pub fn count_published(pool: &DbPool) -> Result<i64, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(media_db_operations::count_published_media(&conn)?)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MissingPhotoFile {
    pub id: i64,
    pub file_path: String,
}

/// Differences between photo records and the files in the store.
#[derive(Debug, Serialize, Default)]
pub struct ReconciliationReport {
    /// Stored files that no photo record points to.
    pub orphaned_files: Vec<String>,
    /// Photo records whose file is gone.
    pub missing_files: Vec<MissingPhotoFile>,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.orphaned_files.is_empty() && self.missing_files.is_empty()
    }
}

/// Compares photo records with the stored files. Changes nothing.
pub fn reconcile(pool: &DbPool, store: &dyn MediaFileStore) -> Result<ReconciliationReport, WorkflowError> {
    let conn = get_conn(pool)?;
    let photos = media_db_operations::read_photo_file_paths(&conn)?;
    let stored = store.list_files().map_err(WorkflowError::StorageReadFailed)?;

    let mut referenced = HashSet::new();
    let mut report = ReconciliationReport::default();
    for (id, file_path) in photos {
        match key_from_photo_url(&file_path) {
            Some(key) if store.file_exists(key) => {
                referenced.insert(key.to_string());
            }
            _ => report.missing_files.push(MissingPhotoFile { id, file_path }),
        }
    }
    report.orphaned_files = stored.into_iter().filter(|key| !referenced.contains(key)).collect();

    if !report.is_clean() {
        log::warn!(
            "Media reconciliation: {} orphaned file(s), {} record(s) with missing files",
            report.orphaned_files.len(),
            report.missing_files.len()
        );
    }
    Ok(report)
}
