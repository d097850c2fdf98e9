use crate::helper::sanitization_helpers::{optional_text, required_email, required_text};
use crate::helper::{get_conn, WorkflowError};
use crate::middleware::AuthenticatedAdmin;
use crate::models::db_operations::{is_unique_violation, members_db_operations};
use crate::models::{Member, MemberStatus, MembershipApplication};
use crate::DbPool;
use chrono::Utc;

const MEMBER: &str = "Member";

/// Records a public membership application as a PENDING member.
pub fn register(pool: &DbPool, application: &MembershipApplication) -> Result<Member, WorkflowError> {
    let full_name = required_text("full_name", &application.full_name, 2, 100)?;
    let email = required_email("email", &application.email, 150)?;
    let phone = required_text("phone", &application.phone, 10, 20)?;
    let message = optional_text("message", application.message.as_deref(), 500)?;

    let conn = get_conn(pool)?;
    if members_db_operations::member_exists_by_email(&conn, &email)? {
        log::warn!("Rejected membership application: email '{}' already registered", email);
        return Err(WorkflowError::DuplicateEmail(email));
    }

    // A concurrent registration can pass the check above; the table's UNIQUE
    // constraint rejects the second insert.
    let member = members_db_operations::insert_member(
        &conn,
        &full_name,
        &email,
        &phone,
        message.as_deref(),
        &Utc::now(),
        MemberStatus::Pending,
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            log::warn!("Rejected membership application: email '{}' registered concurrently", email);
            WorkflowError::DuplicateEmail(email.clone())
        } else {
            WorkflowError::Database(e)
        }
    })?;

    log::info!("New membership application {} from '{}'", member.id, member.email);
    Ok(member)
}

/// Sets a member's status. Any status may follow any other.
///
/// Concurrent changes to the same member are last-write-wins.
pub fn set_status(
    pool: &DbPool,
    admin: &AuthenticatedAdmin,
    id: i64,
    status: MemberStatus,
) -> Result<(), WorkflowError> {
    let conn = get_conn(pool)?;
    match members_db_operations::update_member_status(&conn, id, status)? {
        0 => Err(WorkflowError::not_found(MEMBER, id)),
        _ => {
            log::info!("Admin '{}' set member {} to {}", admin.username, id, status);
            Ok(())
        }
    }
}

pub fn delete(pool: &DbPool, admin: &AuthenticatedAdmin, id: i64) -> Result<(), WorkflowError> {
    let conn = get_conn(pool)?;
    match members_db_operations::delete_member(&conn, id)? {
        0 => Err(WorkflowError::not_found(MEMBER, id)),
        _ => {
            log::info!("Admin '{}' deleted member {}", admin.username, id);
            Ok(())
        }
    }
}

pub fn get(pool: &DbPool, id: i64) -> Result<Member, WorkflowError> {
    let conn = get_conn(pool)?;
    members_db_operations::read_member_by_id(&conn, id)?.ok_or_else(|| WorkflowError::not_found(MEMBER, id))
}

pub fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<Member>, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(members_db_operations::read_member_by_email(&conn, email.trim())?)
}

pub fn list_by_status(pool: &DbPool, status: MemberStatus) -> Result<Vec<Member>, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(members_db_operations::read_members_by_status(&conn, status, None)?)
}

pub fn count_by_status(pool: &DbPool, status: MemberStatus) -> Result<i64, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(members_db_operations::count_members_by_status(&conn, status)?)
}

pub fn list_all(pool: &DbPool) -> Result<Vec<Member>, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(members_db_operations::read_all_members(&conn)?)
}
