use crate::Database;
use crate::models::{CategoryRow, EventRow, PendingRequestRow, RequestRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, Row};

/// Conjunctive listing filters. Category name/type are matched as
/// case-insensitive substrings (relaxed search); date is exact equality.
#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub date: Option<String>,
    pub category_name: Option<String>,
    pub category_type: Option<String>,
}

impl Database {
    // -- Users --

    pub fn insert_user(&self, id: &str, name: &str, email: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, password) VALUES (?1, ?2, ?3, ?4)",
                (id, name, email, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Partial update; returns the number of rows that matched. A patch with
    /// no fields is a no-op reported as zero rows.
    pub fn update_user(&self, id: &str, name: Option<&str>, email: Option<&str>) -> Result<usize> {
        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<&dyn rusqlite::types::ToSql> = Vec::new();

        if let Some(name) = &name {
            sets.push("name = ?");
            params.push(name);
        }
        if let Some(email) = &email {
            sets.push("email = ?");
            params.push(email);
        }
        if sets.is_empty() {
            return Ok(0);
        }
        sets.push("updated_at = datetime('now')");
        params.push(&id);

        let sql = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        self.with_conn(|conn| Ok(conn.execute(&sql, params.as_slice())?))
    }

    // -- Categories --

    /// Exact, case-sensitive match — deliberately stricter than the listing
    /// filter so find-or-create stays idempotent per (name, type).
    pub fn find_category(&self, name: &str, kind: Option<&str>) -> Result<Option<CategoryRow>> {
        self.with_conn(|conn| match kind {
            Some(kind) => {
                let mut stmt = conn.prepare(
                    "SELECT id, name, type, created_at, updated_at FROM categories
                     WHERE name = ?1 AND type = ?2",
                )?;
                stmt.query_row((name, kind), map_category).optional()
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, name, type, created_at, updated_at FROM categories
                     WHERE name = ?1",
                )?;
                stmt.query_row([name], map_category).optional()
            }
        })
    }

    pub fn insert_category(&self, id: &str, name: &str, kind: Option<&str>) -> Result<()> {
        self.with_conn(|conn| {
            match kind {
                Some(kind) => conn.execute(
                    "INSERT INTO categories (id, name, type) VALUES (?1, ?2, ?3)",
                    (id, name, kind),
                )?,
                // type falls back to the schema default ('tech')
                None => conn.execute(
                    "INSERT INTO categories (id, name) VALUES (?1, ?2)",
                    (id, name),
                )?,
            };
            Ok(())
        })
    }

    pub fn get_category(&self, id: &str) -> Result<Option<CategoryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, type, created_at, updated_at FROM categories WHERE id = ?1",
            )?;
            Ok(stmt.query_row([id], map_category).optional()?)
        })
    }

    // -- Events --

    pub fn insert_event(
        &self,
        id: &str,
        title: &str,
        description: &str,
        date: &str,
        category_id: &str,
        user_id: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (id, title, description, date, category_id, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, title, description, date, category_id, user_id),
            )?;
            Ok(())
        })
    }

    pub fn get_event(&self, id: &str) -> Result<Option<EventRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{EVENT_SELECT} WHERE e.id = ?1"
            ))?;
            Ok(stmt.query_row([id], map_event).optional()?)
        })
    }

    /// The event's owning user, resolved through the events table.
    pub fn get_event_owner(&self, event_id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.id, u.name, u.email, u.password, u.created_at, u.updated_at
                 FROM users u JOIN events e ON e.user_id = u.id
                 WHERE e.id = ?1",
            )?;
            Ok(stmt.query_row([event_id], map_user).optional()?)
        })
    }

    pub fn count_events(&self, filter: &EventFilter) -> Result<u64> {
        let (where_sql, params) = build_event_where(filter);
        let sql = format!(
            "SELECT COUNT(*) FROM events e
             LEFT JOIN categories c ON e.category_id = c.id{where_sql}"
        );
        self.with_conn(|conn| {
            let refs: Vec<&dyn rusqlite::types::ToSql> =
                params.iter().map(|p| p as &dyn rusqlite::types::ToSql).collect();
            Ok(conn.query_row(&sql, refs.as_slice(), |r| r.get::<_, i64>(0))? as u64)
        })
    }

    pub fn list_events(&self, filter: &EventFilter, limit: u32, offset: u64) -> Result<Vec<EventRow>> {
        let (where_sql, params) = build_event_where(filter);
        let sql = format!(
            "{EVENT_SELECT}{where_sql} ORDER BY e.created_at, e.id LIMIT ? OFFSET ?"
        );
        let limit = i64::from(limit);
        // an offset past i64::MAX is past any real table anyway
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut refs: Vec<&dyn rusqlite::types::ToSql> =
                params.iter().map(|p| p as &dyn rusqlite::types::ToSql).collect();
            refs.push(&limit);
            refs.push(&offset);
            let rows = stmt
                .query_map(refs.as_slice(), map_event)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_events_by_owner(&self, user_id: &str) -> Result<Vec<EventRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{EVENT_SELECT} WHERE e.user_id = ?1 ORDER BY e.created_at, e.id"
            ))?;
            let rows = stmt
                .query_map([user_id], map_event)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Owner-scoped conditional update: the WHERE clause carries the
    /// authorization check, so a non-owner matches zero rows instead of
    /// getting a permission error.
    pub fn update_event(
        &self,
        event_id: &str,
        owner_id: &str,
        title: Option<&str>,
        description: Option<&str>,
        date: Option<&str>,
        category_id: Option<&str>,
    ) -> Result<usize> {
        let mut sets: Vec<&str> = Vec::new();
        let mut params: Vec<&dyn rusqlite::types::ToSql> = Vec::new();

        if let Some(title) = &title {
            sets.push("title = ?");
            params.push(title);
        }
        if let Some(description) = &description {
            sets.push("description = ?");
            params.push(description);
        }
        if let Some(date) = &date {
            sets.push("date = ?");
            params.push(date);
        }
        if let Some(category_id) = &category_id {
            sets.push("category_id = ?");
            params.push(category_id);
        }
        if sets.is_empty() {
            return Ok(0);
        }
        sets.push("updated_at = datetime('now')");
        params.push(&event_id);
        params.push(&owner_id);

        let sql = format!(
            "UPDATE events SET {} WHERE id = ? AND user_id = ?",
            sets.join(", ")
        );
        self.with_conn(|conn| Ok(conn.execute(&sql, params.as_slice())?))
    }

    // -- Join requests --

    pub fn find_request(&self, user_id: &str, event_id: &str) -> Result<Option<RequestRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, event_id, status, created_at, updated_at
                 FROM requests WHERE user_id = ?1 AND event_id = ?2",
            )?;
            Ok(stmt.query_row((user_id, event_id), map_request).optional()?)
        })
    }

    /// Fails with a constraint violation if (user_id, event_id) already
    /// exists — the backstop behind the workflow's duplicate pre-check.
    pub fn insert_request(&self, id: &str, user_id: &str, event_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO requests (id, user_id, event_id) VALUES (?1, ?2, ?3)",
                (id, user_id, event_id),
            )?;
            Ok(())
        })
    }

    /// Existence + authorization + state in one lookup: the request must
    /// belong to the given event, the event to the given manager, and the
    /// status must still be pending. Joins requester and event for the
    /// notification payload.
    pub fn find_pending_for_manager(
        &self,
        request_id: &str,
        event_id: &str,
        manager_id: &str,
    ) -> Result<Option<PendingRequestRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT r.id, u.id, u.name, u.email, e.title, e.description
                 FROM requests r
                 JOIN events e ON r.event_id = e.id
                 JOIN users u ON r.user_id = u.id
                 WHERE r.id = ?1 AND r.event_id = ?2 AND e.user_id = ?3
                   AND r.status = 'pending'",
            )?;
            let row = stmt
                .query_row((request_id, event_id, manager_id), |row| {
                    Ok(PendingRequestRow {
                        id: row.get(0)?,
                        requester_id: row.get(1)?,
                        requester_name: row.get(2)?,
                        requester_email: row.get(3)?,
                        event_title: row.get(4)?,
                        event_description: row.get(5)?,
                    })
                })
                .optional()?;
            Ok(row)
        })
    }

    /// Transition guarded on the pending state; a request already moved to a
    /// terminal state matches zero rows.
    pub fn set_request_status(&self, request_id: &str, status: &str) -> Result<usize> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE requests SET status = ?1, updated_at = datetime('now')
                 WHERE id = ?2 AND status = 'pending'",
                (status, request_id),
            )?)
        })
    }

    pub fn get_request(&self, id: &str) -> Result<Option<RequestRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, event_id, status, created_at, updated_at
                 FROM requests WHERE id = ?1",
            )?;
            Ok(stmt.query_row([id], map_request).optional()?)
        })
    }
}

const EVENT_SELECT: &str =
    "SELECT e.id, e.title, e.description, e.date, e.user_id, e.created_at, e.updated_at,
            c.id, c.name, c.type, c.created_at, c.updated_at
     FROM events e
     LEFT JOIN categories c ON e.category_id = c.id";

fn build_event_where(filter: &EventFilter) -> (String, Vec<String>) {
    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(date) = &filter.date {
        clauses.push("e.date = ?");
        params.push(date.clone());
    }
    if let Some(name) = &filter.category_name {
        clauses.push("LOWER(c.name) LIKE '%' || LOWER(?) || '%'");
        params.push(name.clone());
    }
    if let Some(kind) = &filter.category_type {
        clauses.push("LOWER(c.type) LIKE '%' || LOWER(?) || '%'");
        params.push(kind.clone());
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, name, email, password, created_at, updated_at FROM users WHERE {column} = ?1"
    ))?;
    Ok(stmt.query_row([value], map_user).optional()?)
}

fn map_user(row: &Row<'_>) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn map_category(row: &Row<'_>) -> std::result::Result<CategoryRow, rusqlite::Error> {
    Ok(CategoryRow {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn map_event(row: &Row<'_>) -> std::result::Result<EventRow, rusqlite::Error> {
    // Joined category columns are all-or-nothing; a NULL id means no category.
    let category = match row.get::<_, Option<String>>(7)? {
        Some(id) => Some(CategoryRow {
            id,
            name: row.get(8)?,
            kind: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        }),
        None => None,
    };

    Ok(EventRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        date: row.get(3)?,
        user_id: row.get(4)?,
        category,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn map_request(row: &Row<'_>) -> std::result::Result<RequestRow, rusqlite::Error> {
    Ok(RequestRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        event_id: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_constraint_violation;
    use uuid::Uuid;

    fn seed_user(db: &Database, name: &str, email: &str) -> String {
        let id = Uuid::new_v4().to_string();
        db.insert_user(&id, name, email, "$argon2id$stub").unwrap();
        id
    }

    fn seed_event(db: &Database, owner: &str, title: &str, category: Option<&str>) -> String {
        let id = Uuid::new_v4().to_string();
        let cat = category.unwrap_or("");
        db.with_conn(|conn| {
            if category.is_some() {
                conn.execute(
                    "INSERT INTO events (id, title, description, date, category_id, user_id)
                     VALUES (?1, ?2, 'desc', '2025-06-01T18:00:00+00:00', ?3, ?4)",
                    (&id, title, cat, owner),
                )?;
            } else {
                conn.execute(
                    "INSERT INTO events (id, title, description, date, user_id)
                     VALUES (?1, ?2, 'desc', '2025-06-01T18:00:00+00:00', ?3)",
                    (&id, title, owner),
                )?;
            }
            Ok(())
        })
        .unwrap();
        id
    }

    #[test]
    fn duplicate_email_hits_unique_constraint() {
        let db = Database::open_in_memory().unwrap();
        seed_user(&db, "a", "a@example.com");
        let err = db
            .insert_user(&Uuid::new_v4().to_string(), "b", "a@example.com", "h")
            .unwrap_err();
        assert!(is_constraint_violation(&err));
    }

    #[test]
    fn duplicate_request_hits_unique_constraint() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner", "o@example.com");
        let requester = seed_user(&db, "req", "r@example.com");
        let event = seed_event(&db, &owner, "meetup", None);

        db.insert_request(&Uuid::new_v4().to_string(), &requester, &event)
            .unwrap();
        let err = db
            .insert_request(&Uuid::new_v4().to_string(), &requester, &event)
            .unwrap_err();
        assert!(is_constraint_violation(&err));
    }

    #[test]
    fn update_event_is_owner_scoped() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner", "o@example.com");
        let other = seed_user(&db, "other", "x@example.com");
        let event = seed_event(&db, &owner, "meetup", None);

        let n = db
            .update_event(&event, &other, Some("hijacked"), None, None, None)
            .unwrap();
        assert_eq!(n, 0);
        assert_eq!(db.get_event(&event).unwrap().unwrap().title, "meetup");

        let n = db
            .update_event(&event, &owner, Some("renamed"), None, None, None)
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(db.get_event(&event).unwrap().unwrap().title, "renamed");
    }

    #[test]
    fn category_filter_is_case_insensitive_substring() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner", "o@example.com");
        let cat = Uuid::new_v4().to_string();
        db.insert_category(&cat, "Tech", Some("tech")).unwrap();
        seed_event(&db, &owner, "conf", Some(&cat));
        seed_event(&db, &owner, "uncategorized", None);

        let filter = EventFilter {
            category_name: Some("tec".into()),
            ..Default::default()
        };
        let rows = db.list_events(&filter, 30, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "conf");
        assert_eq!(db.count_events(&filter).unwrap(), 1);

        // no filter lists everything, category or not
        let all = db.list_events(&EventFilter::default(), 30, 0).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn set_request_status_only_moves_pending() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner", "o@example.com");
        let requester = seed_user(&db, "req", "r@example.com");
        let event = seed_event(&db, &owner, "meetup", None);
        let req = Uuid::new_v4().to_string();
        db.insert_request(&req, &requester, &event).unwrap();

        assert_eq!(db.set_request_status(&req, "accepted").unwrap(), 1);
        // terminal state is immutable
        assert_eq!(db.set_request_status(&req, "rejected").unwrap(), 0);
        assert_eq!(db.get_request(&req).unwrap().unwrap().status, "accepted");
    }

    #[test]
    fn pending_lookup_scopes_by_event_manager_and_state() {
        let db = Database::open_in_memory().unwrap();
        let owner = seed_user(&db, "owner", "o@example.com");
        let other = seed_user(&db, "other", "x@example.com");
        let requester = seed_user(&db, "req", "r@example.com");
        let event = seed_event(&db, &owner, "meetup", None);
        let req = Uuid::new_v4().to_string();
        db.insert_request(&req, &requester, &event).unwrap();

        assert!(db.find_pending_for_manager(&req, &event, &other).unwrap().is_none());
        let hit = db.find_pending_for_manager(&req, &event, &owner).unwrap().unwrap();
        assert_eq!(hit.requester_email, "r@example.com");
        assert_eq!(hit.event_title, "meetup");

        db.set_request_status(&req, "rejected").unwrap();
        assert!(db.find_pending_for_manager(&req, &event, &owner).unwrap().is_none());
    }
}
