use crate::helper::{get_conn, WorkflowError};
use crate::models::db_operations::{
    admin_users_db_operations, contacts_db_operations, media_db_operations, members_db_operations,
};
use crate::models::{DashboardSummary, MediaType, MemberStatus};
use crate::DbPool;

/// Number of newest pending members and unread messages shown on the dashboard.
pub const PREVIEW_LIMIT: u32 = 5;

/// Builds the dashboard figures from current state on every call.
pub fn dashboard(pool: &DbPool) -> Result<DashboardSummary, WorkflowError> {
    let conn = get_conn(pool)?;

    let mut status_counts = [0; MemberStatus::ALL.len()];
    for (count, status) in status_counts.iter_mut().zip(MemberStatus::ALL) {
        *count = members_db_operations::count_members_by_status(&conn, status)?;
    }
    let [pending_members, active_members, inactive_members] = status_counts;

    Ok(DashboardSummary {
        pending_members,
        active_members,
        inactive_members,
        total_members: members_db_operations::count_members(&conn)?,
        unread_messages: contacts_db_operations::count_unread_contact_messages(&conn)?,
        published_photos: media_db_operations::count_published_media_by_type(&conn, MediaType::Photo)?,
        published_videos: media_db_operations::count_published_media_by_type(&conn, MediaType::Video)?,
        recent_pending_members: members_db_operations::read_members_by_status(
            &conn,
            MemberStatus::Pending,
            Some(PREVIEW_LIMIT),
        )?,
        recent_unread_messages: contacts_db_operations::read_recent_unread_contact_messages(&conn, PREVIEW_LIMIT)?,
    })
}

/// Returns the username when the credentials match an active admin account.
pub fn verify_admin_credentials(pool: &DbPool, username: &str, password: &str) -> Option<String> {
    let conn = match pool.get() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Failed to get DB connection for credential verification: {}", e);
            return None;
        }
    };
    admin_users_db_operations::verify_credentials(&conn, username, password)
}

pub fn record_login(pool: &DbPool, username: &str) -> Result<(), WorkflowError> {
    let conn = get_conn(pool)?;
    admin_users_db_operations::update_last_login_time(&conn, username)?;
    log::info!("Admin '{}' logged in", username);
    Ok(())
}

pub fn admin_exists(pool: &DbPool) -> Result<bool, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(admin_users_db_operations::count_admins(&conn)? > 0)
}
