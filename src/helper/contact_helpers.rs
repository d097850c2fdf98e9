use crate::helper::sanitization_helpers::{required_email, required_text};
use crate::helper::{get_conn, WorkflowError};
use crate::middleware::AuthenticatedAdmin;
use crate::models::db_operations::contacts_db_operations;
use crate::models::{ContactMessage, ContactSubmission};
use crate::DbPool;
use chrono::Utc;

const CONTACT_MESSAGE: &str = "Contact message";

/// Stores a message from the public contact form. New messages are unread.
pub fn submit(pool: &DbPool, submission: &ContactSubmission) -> Result<ContactMessage, WorkflowError> {
    let name = required_text("name", &submission.name, 2, 100)?;
    let email = required_email("email", &submission.email, 150)?;
    let subject = required_text("subject", &submission.subject, 5, 150)?;
    let body = required_text("body", &submission.body, 10, 1000)?;

    let conn = get_conn(pool)?;
    let message = contacts_db_operations::insert_contact_message(&conn, &name, &email, &subject, &body, &Utc::now())?;
    log::info!("New contact message {} from '{}'", message.id, message.email);
    Ok(message)
}

/// Marks a message read or unread. Setting the current value again is a no-op success.
pub fn set_read(pool: &DbPool, admin: &AuthenticatedAdmin, id: i64, is_read: bool) -> Result<(), WorkflowError> {
    let conn = get_conn(pool)?;
    match contacts_db_operations::update_read_flag(&conn, id, is_read)? {
        0 => Err(WorkflowError::not_found(CONTACT_MESSAGE, id)),
        _ => {
            log::debug!("Admin '{}' marked contact message {} read={}", admin.username, id, is_read);
            Ok(())
        }
    }
}

pub fn delete(pool: &DbPool, admin: &AuthenticatedAdmin, id: i64) -> Result<(), WorkflowError> {
    let conn = get_conn(pool)?;
    match contacts_db_operations::delete_contact_message(&conn, id)? {
        0 => Err(WorkflowError::not_found(CONTACT_MESSAGE, id)),
        _ => {
            log::info!("Admin '{}' deleted contact message {}", admin.username, id);
            Ok(())
        }
    }
}

pub fn get(pool: &DbPool, id: i64) -> Result<ContactMessage, WorkflowError> {
    let conn = get_conn(pool)?;
    contacts_db_operations::read_contact_message_by_id(&conn, id)?
        .ok_or_else(|| WorkflowError::not_found(CONTACT_MESSAGE, id))
}

pub fn list_unread(pool: &DbPool) -> Result<Vec<ContactMessage>, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(contacts_db_operations::read_contact_messages_by_read_flag(&conn, false)?)
}

pub fn list_read(pool: &DbPool) -> Result<Vec<ContactMessage>, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(contacts_db_operations::read_contact_messages_by_read_flag(&conn, true)?)
}

pub fn list_all(pool: &DbPool) -> Result<Vec<ContactMessage>, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(contacts_db_operations::read_all_contact_messages(&conn)?)
}

/// Every message sent from one address, newest first.
pub fn list_by_sender(pool: &DbPool, email: &str) -> Result<Vec<ContactMessage>, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(contacts_db_operations::read_contact_messages_by_email(&conn, email.trim())?)
}

pub fn count_unread(pool: &DbPool) -> Result<i64, WorkflowError> {
    let conn = get_conn(pool)?;
    Ok(contacts_db_operations::count_unread_contact_messages(&conn)?)
}
