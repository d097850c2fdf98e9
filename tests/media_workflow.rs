mod common;

use association_backend::helper::media_storage::{FileCleanup, MediaFileStore, PHOTO_URL_PREFIX};
use association_backend::helper::{media_helpers, WorkflowError};
use association_backend::models::{MediaDetailsUpdate, MediaType};
use common::UndeletableStore;
use std::fs;

fn key_of(file_path: &str) -> &str {
    file_path.strip_prefix(PHOTO_URL_PREFIX).expect("gallery path")
}

#[test]
fn photo_upload_stores_the_file_and_a_published_record() {
    let site = common::site();
    let admin = common::admin();
    let bytes = b"\x89PNG\r\n\x1a\nfake image data";

    let item = media_helpers::add_photo(
        &site.pool, &site.store, &admin, bytes, Some("cat.png"), "Cat on the stage", Some("Spring concert"),
    )
    .unwrap();

    assert_eq!(item.media_type, MediaType::Photo);
    assert!(item.is_published);
    assert_eq!(item.display_order, 0);
    assert_eq!(item.original_filename.as_deref(), Some("cat.png"));
    assert!(item.file_path.starts_with(PHOTO_URL_PREFIX));
    assert!(item.file_path.ends_with(".png"));

    let stored = site.store.root().join(key_of(&item.file_path));
    assert_eq!(fs::read(stored).unwrap(), bytes);

    let gallery = media_helpers::list_published_by_type(&site.pool, MediaType::Photo).unwrap();
    assert_eq!(gallery, vec![item]);
}

#[test]
fn uploads_of_the_same_name_never_share_a_file() {
    let site = common::site();
    let admin = common::admin();

    let first = media_helpers::add_photo(&site.pool, &site.store, &admin, b"one", Some("cat.png"), "First cat", None).unwrap();
    let second = media_helpers::add_photo(&site.pool, &site.store, &admin, b"two", Some("cat.png"), "Second cat", None).unwrap();

    assert_ne!(first.file_path, second.file_path);
    assert_eq!(site.store.list_files().unwrap().len(), 2);
}

#[test]
fn empty_or_untitled_photos_are_rejected_without_writing() {
    let site = common::site();
    let admin = common::admin();

    let empty = media_helpers::add_photo(&site.pool, &site.store, &admin, b"", Some("cat.png"), "Cat photo", None);
    assert!(matches!(empty, Err(WorkflowError::InvalidInput(_))));

    let untitled = media_helpers::add_photo(&site.pool, &site.store, &admin, b"data", Some("cat.png"), "  ", None);
    assert!(matches!(untitled, Err(WorkflowError::InvalidInput(_))));

    assert!(site.store.list_files().unwrap().is_empty());
    assert_eq!(media_helpers::count_by_type(&site.pool, MediaType::Photo).unwrap(), 0);
}

#[test]
fn failed_insert_removes_the_written_file() {
    let site = common::site();
    let admin = common::admin();
    site.pool.get().unwrap().execute("DROP TABLE media_items", []).unwrap();

    let result = media_helpers::add_photo(&site.pool, &site.store, &admin, b"data", Some("cat.png"), "Cat photo", None);

    assert!(matches!(result, Err(WorkflowError::Database(_))));
    assert!(site.store.list_files().unwrap().is_empty());
}

#[test]
fn failed_rollback_still_reports_the_insert_error() {
    let site = common::site();
    let admin = common::admin();
    let store = UndeletableStore(site.store.clone());
    site.pool.get().unwrap().execute("DROP TABLE media_items", []).unwrap();

    let result = media_helpers::add_photo(&site.pool, &store, &admin, b"data", Some("cat.png"), "Cat photo", None);

    assert!(matches!(result, Err(WorkflowError::Database(_))));
    assert_eq!(site.store.list_files().unwrap().len(), 1);
}

#[test]
fn unusable_extensions_fall_back_to_jpg() {
    let site = common::site();
    let admin = common::admin();

    let item = media_helpers::add_photo(&site.pool, &site.store, &admin, b"data", Some("photo.ph p"), "Odd name", None).unwrap();
    assert!(item.file_path.ends_with(".jpg"));

    let item = media_helpers::add_photo(&site.pool, &site.store, &admin, b"data", None, "No name", None).unwrap();
    assert!(item.file_path.ends_with(".jpg"));
    assert_eq!(item.original_filename, None);
}

#[test]
fn videos_need_a_url() {
    let site = common::site();
    let admin = common::admin();

    let blank = media_helpers::add_video(&site.pool, &admin, "Festival recap", None, "   ");
    assert!(matches!(blank, Err(WorkflowError::InvalidInput(_))));

    let video = media_helpers::add_video(&site.pool, &admin, "Festival recap", Some(" "), "https://video.example.org/recap").unwrap();
    assert_eq!(video.media_type, MediaType::Video);
    assert_eq!(video.file_path, "https://video.example.org/recap");
    assert_eq!(video.description, None);
    assert!(video.is_published);
}

#[test]
fn gallery_follows_display_order_and_hides_unpublished_items() {
    let site = common::site();
    let admin = common::admin();
    let url = "https://video.example.org/v";

    let third = media_helpers::add_video(&site.pool, &admin, "Third video", None, url).unwrap();
    let first = media_helpers::add_video(&site.pool, &admin, "First video", None, url).unwrap();
    let second = media_helpers::add_video(&site.pool, &admin, "Second video", None, url).unwrap();
    let hidden = media_helpers::add_video(&site.pool, &admin, "Hidden video", None, url).unwrap();

    media_helpers::set_display_order(&site.pool, &admin, third.id, 3).unwrap();
    media_helpers::set_display_order(&site.pool, &admin, first.id, 1).unwrap();
    media_helpers::set_display_order(&site.pool, &admin, second.id, 2).unwrap();
    media_helpers::set_published(&site.pool, &admin, hidden.id, false).unwrap();

    let ids: Vec<i64> = media_helpers::list_published_by_type(&site.pool, MediaType::Video)
        .unwrap()
        .iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
    assert_eq!(media_helpers::count_published(&site.pool).unwrap(), 3);
    assert_eq!(media_helpers::count_by_type(&site.pool, MediaType::Video).unwrap(), 4);
    assert_eq!(media_helpers::list_all(&site.pool).unwrap().len(), 4);
}

#[test]
fn published_listing_mixes_types_in_display_order() {
    let site = common::site();
    let admin = common::admin();
    let video = media_helpers::add_video(&site.pool, &admin, "Late video", None, "https://video.example.org/v").unwrap();
    let photo = media_helpers::add_photo(&site.pool, &site.store, &admin, b"data", Some("a.png"), "Early photo", None).unwrap();
    media_helpers::set_display_order(&site.pool, &admin, video.id, 2).unwrap();
    media_helpers::set_display_order(&site.pool, &admin, photo.id, 1).unwrap();

    let ids: Vec<i64> = media_helpers::list_published(&site.pool).unwrap().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![photo.id, video.id]);
}

#[test]
fn details_update_edits_metadata_only() {
    let site = common::site();
    let admin = common::admin();
    let item = media_helpers::add_video(&site.pool, &admin, "Festival recap", None, "https://video.example.org/recap").unwrap();

    let update = MediaDetailsUpdate {
        title: "Festival highlights".to_string(),
        description: Some("Ten minutes of the best moments".to_string()),
        display_order: 7,
        is_published: false,
    };
    let updated = media_helpers::update_details(&site.pool, &admin, item.id, &update).unwrap();

    assert_eq!(updated.title, "Festival highlights");
    assert_eq!(updated.display_order, 7);
    assert!(!updated.is_published);
    assert_eq!(updated.media_type, MediaType::Video);
    assert_eq!(updated.file_path, item.file_path);

    let missing = media_helpers::update_details(&site.pool, &admin, item.id + 99, &update);
    assert!(matches!(missing, Err(WorkflowError::NotFound { .. })));
}

#[test]
fn deleting_a_photo_removes_record_and_file() {
    let site = common::site();
    let admin = common::admin();
    let item = media_helpers::add_photo(&site.pool, &site.store, &admin, b"data", Some("cat.png"), "Cat photo", None).unwrap();

    let cleanup = media_helpers::delete(&site.pool, &site.store, &admin, item.id).unwrap();

    assert_eq!(cleanup, FileCleanup::Removed);
    assert!(site.store.list_files().unwrap().is_empty());
    assert!(matches!(media_helpers::get(&site.pool, item.id), Err(WorkflowError::NotFound { .. })));
}

#[test]
fn deleting_a_video_touches_no_file() {
    let site = common::site();
    let admin = common::admin();
    let video = media_helpers::add_video(&site.pool, &admin, "Festival recap", None, "https://video.example.org/recap").unwrap();

    let cleanup = media_helpers::delete(&site.pool, &site.store, &admin, video.id).unwrap();
    assert_eq!(cleanup, FileCleanup::NotRequired);
}

#[test]
fn photo_with_a_missing_file_is_still_deleted() {
    let site = common::site();
    let admin = common::admin();
    let item = media_helpers::add_photo(&site.pool, &site.store, &admin, b"data", Some("cat.png"), "Cat photo", None).unwrap();
    fs::remove_file(site.store.root().join(key_of(&item.file_path))).unwrap();

    let cleanup = media_helpers::delete(&site.pool, &site.store, &admin, item.id).unwrap();

    assert_eq!(cleanup, FileCleanup::AlreadyMissing);
    assert_eq!(media_helpers::count_by_type(&site.pool, MediaType::Photo).unwrap(), 0);
}

#[test]
fn file_removal_failure_does_not_block_record_deletion() {
    let site = common::site();
    let admin = common::admin();
    let store = UndeletableStore(site.store.clone());
    let item = media_helpers::add_photo(&site.pool, &store, &admin, b"data", Some("cat.png"), "Cat photo", None).unwrap();

    let cleanup = media_helpers::delete(&site.pool, &store, &admin, item.id).unwrap();

    match cleanup {
        FileCleanup::Failed(failure) => assert_eq!(failure.path, item.file_path),
        other => panic!("expected a cleanup failure, got {:?}", other),
    }
    assert!(matches!(media_helpers::get(&site.pool, item.id), Err(WorkflowError::NotFound { .. })));

    let report = media_helpers::reconcile(&site.pool, &site.store).unwrap();
    assert_eq!(report.orphaned_files, vec![key_of(&item.file_path).to_string()]);
}

#[test]
fn unknown_media_ids_are_not_found() {
    let site = common::site();
    let admin = common::admin();

    assert!(matches!(media_helpers::set_published(&site.pool, &admin, 5, true), Err(WorkflowError::NotFound { .. })));
    assert!(matches!(media_helpers::set_display_order(&site.pool, &admin, 5, 1), Err(WorkflowError::NotFound { .. })));
    assert!(matches!(media_helpers::delete(&site.pool, &site.store, &admin, 5), Err(WorkflowError::NotFound { .. })));
}

#[test]
fn publishing_twice_succeeds_and_stays_published() {
    let site = common::site();
    let admin = common::admin();
    let item = media_helpers::add_photo(&site.pool, &site.store, &admin, b"data", Some("cat.png"), "Cat photo", None).unwrap();
    assert!(item.is_published);

    media_helpers::set_published(&site.pool, &admin, item.id, true).unwrap();
    media_helpers::set_published(&site.pool, &admin, item.id, true).unwrap();

    assert!(media_helpers::get(&site.pool, item.id).unwrap().is_published);
    assert_eq!(media_helpers::count_published(&site.pool).unwrap(), 1);
}

#[test]
fn deleting_an_unknown_id_leaves_existing_media_alone() {
    let site = common::site();
    let admin = common::admin();
    let photo = media_helpers::add_photo(&site.pool, &site.store, &admin, b"data", Some("cat.png"), "Cat photo", None).unwrap();
    let video = media_helpers::add_video(&site.pool, &admin, "Festival recap", None, "https://video.example.org/recap").unwrap();
    let unknown = photo.id.max(video.id) + 1;

    let result = media_helpers::delete(&site.pool, &site.store, &admin, unknown);

    assert!(matches!(result, Err(WorkflowError::NotFound { .. })));
    assert_eq!(media_helpers::list_all(&site.pool).unwrap().len(), 2);
    assert_eq!(media_helpers::get(&site.pool, photo.id).unwrap(), photo);
    assert_eq!(site.store.list_files().unwrap(), vec![key_of(&photo.file_path).to_string()]);
}

#[test]
fn reconciliation_reports_both_directions_without_changing_anything() {
    let site = common::site();
    let admin = common::admin();
    let kept = media_helpers::add_photo(&site.pool, &site.store, &admin, b"kept", Some("a.png"), "Kept photo", None).unwrap();
    let lost = media_helpers::add_photo(&site.pool, &site.store, &admin, b"lost", Some("b.png"), "Lost photo", None).unwrap();
    fs::remove_file(site.store.root().join(key_of(&lost.file_path))).unwrap();
    site.store.write_file("stray.jpg", b"stray").unwrap();

    let report = media_helpers::reconcile(&site.pool, &site.store).unwrap();

    assert_eq!(report.orphaned_files, vec!["stray.jpg".to_string()]);
    assert_eq!(report.missing_files.len(), 1);
    assert_eq!(report.missing_files[0].id, lost.id);
    assert!(site.store.file_exists("stray.jpg"));
    assert!(site.store.file_exists(key_of(&kept.file_path)));
    assert_eq!(media_helpers::count_by_type(&site.pool, MediaType::Photo).unwrap(), 2);
}
