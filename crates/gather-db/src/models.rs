//! Database row types — these map directly to SQLite rows.
//! Distinct from the gather-types API models to keep the DB layer independent.

use chrono::{DateTime, Utc};
use tracing::warn;

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct EventRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub user_id: String,
    pub category: Option<CategoryRow>,
    pub created_at: String,
    pub updated_at: String,
}

pub struct RequestRow {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One row answering a `decide` lookup: the pending request joined with its
/// requester and event, already scoped to the deciding manager.
pub struct PendingRequestRow {
    pub id: String,
    pub requester_id: String,
    pub requester_name: String,
    pub requester_email: String,
    pub event_title: String,
    pub event_description: String,
}

/// SQLite stores both RFC 3339 strings (written by us) and
/// "YYYY-MM-DD HH:MM:SS" (from `datetime('now')` defaults). Parse either,
/// falling back to the epoch on corrupt data rather than failing the read.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}
