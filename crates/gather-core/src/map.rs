//! Row-to-model conversions. IDs written by this codebase are always UUIDs;
//! corrupt values are logged and defaulted rather than failing the read,
//! matching how timestamps are handled in gather-db.

use gather_db::models::{CategoryRow, EventRow, UserRow, parse_timestamp};
use gather_types::models::{Category, Event, User, UserSummary};
use tracing::warn;
use uuid::Uuid;

pub(crate) fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", what, raw, e);
        Uuid::default()
    })
}

pub(crate) fn user_from_row(row: &UserRow) -> User {
    User {
        id: parse_id(&row.id, "user"),
        name: row.name.clone(),
        email: row.email.clone(),
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    }
}

pub(crate) fn category_from_row(row: &CategoryRow) -> Category {
    Category {
        id: parse_id(&row.id, "category"),
        name: row.name.clone(),
        kind: row.kind.clone(),
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    }
}

pub(crate) fn event_from_row(row: &EventRow, owner: Option<UserSummary>) -> Event {
    Event {
        id: parse_id(&row.id, "event"),
        title: row.title.clone(),
        description: row.description.clone(),
        date: parse_timestamp(&row.date),
        category: row.category.as_ref().map(category_from_row),
        user: owner,
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    }
}
