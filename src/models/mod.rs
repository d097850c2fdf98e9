use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Unknown {kind} label: '{label}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}

/// Membership lifecycle. Any status may follow any other; the admin decides.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    #[serde(alias = "EN_ATTENTE")]
    Pending,
    #[serde(alias = "ACTIF")]
    Active,
    #[serde(alias = "INACTIF")]
    Inactive,
}

impl MemberStatus {
    pub const ALL: [MemberStatus; 3] = [MemberStatus::Pending, MemberStatus::Active, MemberStatus::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Pending => "PENDING",
            MemberStatus::Active => "ACTIVE",
            MemberStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The French labels come from older admin forms and are still accepted on input.
impl FromStr for MemberStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "EN_ATTENTE" => Ok(MemberStatus::Pending),
            "ACTIVE" | "ACTIF" => Ok(MemberStatus::Active),
            "INACTIVE" | "INACTIF" => Ok(MemberStatus::Inactive),
            _ => Err(UnknownLabel { kind: "member status", label: s.to_string() }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Member {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub status: MemberStatus,
}

/// A membership application as submitted by a visitor. It carries no status:
/// every new member starts out pending.
#[derive(Debug, Deserialize, Clone)]
pub struct MembershipApplication {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Photo,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Photo => "PHOTO",
            MediaType::Video => "VIDEO",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PHOTO" | "PHOTOS" => Ok(MediaType::Photo),
            "VIDEO" | "VIDEOS" => Ok(MediaType::Video),
            _ => Err(UnknownLabel { kind: "media type", label: s.to_string() }),
        }
    }
}

/// A gallery entry. For photos `file_path` is the public path of the stored
/// file; for videos it is the external URL.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MediaItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub media_type: MediaType,
    pub file_path: String,
    pub original_filename: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub is_published: bool,
    pub display_order: i32,
}

/// Row contents for a media insert; the store assigns the id.
pub struct NewMediaItem<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub media_type: MediaType,
    pub file_path: &'a str,
    pub original_filename: Option<&'a str>,
    pub uploaded_at: DateTime<Utc>,
    pub is_published: bool,
    pub display_order: i32,
}

/// Editable metadata of an existing media item. The type and file reference never change.
#[derive(Debug, Deserialize, Clone)]
pub struct MediaDetailsUpdate {
    pub title: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_published: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub last_login_time: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct DashboardSummary {
    pub pending_members: i64,
    pub active_members: i64,
    pub inactive_members: i64,
    pub total_members: i64,
    pub unread_messages: i64,
    pub published_photos: i64,
    pub published_videos: i64,
    pub recent_pending_members: Vec<Member>,
    pub recent_unread_messages: Vec<ContactMessage>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notification {
    pub message: String,
    pub r#type: String, // 'success' or 'error'
}

pub mod db_operations;
