mod common;

use association_backend::helper::{admin_helpers, contact_helpers, media_helpers, membership_helpers};
use association_backend::models::db_operations::admin_users_db_operations;
use association_backend::models::{ContactSubmission, MediaType, MemberStatus, MembershipApplication};

fn register(pool: &association_backend::DbPool, n: usize) -> i64 {
    membership_helpers::register(pool, &MembershipApplication {
        full_name: format!("Member {}", n),
        email: format!("member{}@example.org", n),
        phone: "0612345678".to_string(),
        message: None,
    })
    .unwrap()
    .id
}

fn contact(pool: &association_backend::DbPool, n: usize) -> i64 {
    contact_helpers::submit(pool, &ContactSubmission {
        name: format!("Sender {}", n),
        email: format!("sender{}@example.org", n),
        subject: format!("Question number {}", n),
        body: "Could you tell me more about the choir?".to_string(),
    })
    .unwrap()
    .id
}

#[test]
fn empty_site_has_an_empty_dashboard() {
    let site = common::site();
    let summary = admin_helpers::dashboard(&site.pool).unwrap();

    assert_eq!(summary.total_members, 0);
    assert_eq!(summary.unread_messages, 0);
    assert_eq!(summary.published_photos + summary.published_videos, 0);
    assert!(summary.recent_pending_members.is_empty());
    assert!(summary.recent_unread_messages.is_empty());
}

#[test]
fn dashboard_counts_match_the_workflow_queries() {
    let site = common::site();
    let admin = common::admin();

    let members: Vec<i64> = (0..7).map(|n| register(&site.pool, n)).collect();
    membership_helpers::set_status(&site.pool, &admin, members[0], MemberStatus::Active).unwrap();
    membership_helpers::set_status(&site.pool, &admin, members[1], MemberStatus::Inactive).unwrap();

    let messages: Vec<i64> = (0..6).map(|n| contact(&site.pool, n)).collect();
    contact_helpers::set_read(&site.pool, &admin, messages[0], true).unwrap();

    media_helpers::add_photo(&site.pool, &site.store, &admin, b"data", Some("a.jpg"), "Choir photo", None).unwrap();
    let video = media_helpers::add_video(&site.pool, &admin, "Choir video", None, "https://video.example.org/choir").unwrap();
    media_helpers::add_video(&site.pool, &admin, "Other video", None, "https://video.example.org/other").unwrap();
    media_helpers::set_published(&site.pool, &admin, video.id, false).unwrap();

    let summary = admin_helpers::dashboard(&site.pool).unwrap();

    assert_eq!(summary.pending_members, membership_helpers::count_by_status(&site.pool, MemberStatus::Pending).unwrap());
    assert_eq!(summary.pending_members, 5);
    assert_eq!(summary.active_members, 1);
    assert_eq!(summary.inactive_members, 1);
    assert_eq!(summary.total_members, membership_helpers::list_all(&site.pool).unwrap().len() as i64);
    assert_eq!(
        summary.total_members,
        summary.pending_members + summary.active_members + summary.inactive_members
    );
    assert_eq!(summary.unread_messages, contact_helpers::count_unread(&site.pool).unwrap());
    assert_eq!(summary.unread_messages, 5);
    assert_eq!(summary.published_photos, 1);
    assert_eq!(summary.published_videos, 1);
    assert_eq!(
        summary.published_photos + summary.published_videos,
        media_helpers::count_published(&site.pool).unwrap()
    );
    assert_eq!(media_helpers::count_by_type(&site.pool, MediaType::Video).unwrap(), 2);
}

#[test]
fn previews_show_the_five_newest_entries() {
    let site = common::site();
    let members: Vec<i64> = (0..7).map(|n| register(&site.pool, n)).collect();
    let messages: Vec<i64> = (0..7).map(|n| contact(&site.pool, n)).collect();

    let summary = admin_helpers::dashboard(&site.pool).unwrap();

    let preview_members: Vec<i64> = summary.recent_pending_members.iter().map(|m| m.id).collect();
    let newest_members: Vec<i64> = members.iter().rev().take(5).copied().collect();
    assert_eq!(preview_members, newest_members);

    let preview_messages: Vec<i64> = summary.recent_unread_messages.iter().map(|m| m.id).collect();
    let newest_messages: Vec<i64> = messages.iter().rev().take(5).copied().collect();
    assert_eq!(preview_messages, newest_messages);
}

#[test]
fn admin_accounts_gate_login() {
    let site = common::site();
    assert!(!admin_helpers::admin_exists(&site.pool).unwrap());

    {
        let conn = site.pool.get().unwrap();
        admin_users_db_operations::create_admin(&conn, "moderator", "long-enough-pass", None).unwrap();
    }

    assert!(admin_helpers::admin_exists(&site.pool).unwrap());
    assert_eq!(
        admin_helpers::verify_admin_credentials(&site.pool, "moderator", "long-enough-pass").as_deref(),
        Some("moderator")
    );
    assert!(admin_helpers::verify_admin_credentials(&site.pool, "moderator", "wrong").is_none());

    admin_helpers::record_login(&site.pool, "moderator").unwrap();
    let conn = site.pool.get().unwrap();
    let stored = admin_users_db_operations::read_admin_by_username(&conn, "moderator").unwrap().unwrap();
    assert!(stored.last_login_time.is_some());
}
