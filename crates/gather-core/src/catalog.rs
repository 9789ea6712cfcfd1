//! Event Catalog: filtered paginated listing, creation (with category
//! find-or-create and owner resolution), and owner-scoped updates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use gather_db::queries::EventFilter;
use gather_db::Database;
use gather_types::api::CategoryRef;
use gather_types::models::{Category, Event, EventPage, PageInfo};

use crate::directory::UserDirectory;
use crate::error::Error;
use crate::map::{category_from_row, event_from_row};
use crate::run_blocking;

#[derive(Debug, Clone)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    pub date: Option<DateTime<Utc>>,
    pub category_name: Option<String>,
    pub category_type: Option<String>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 30,
            date: None,
            category_name: None,
            category_type: None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub category: Option<CategoryRef>,
}

impl EventPatch {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.category.is_none()
    }
}

#[derive(Clone)]
pub struct EventCatalog {
    db: Arc<Database>,
    directory: UserDirectory,
}

impl EventCatalog {
    pub fn new(db: Arc<Database>, directory: UserDirectory) -> Self {
        Self { db, directory }
    }

    /// Offset-paginated listing. Filters are conjunctive; category name/type
    /// match case-insensitively as substrings, date matches exactly.
    pub async fn list(&self, params: ListParams) -> Result<EventPage, Error> {
        let page = params.page.max(1);
        let limit = params.limit.max(1);
        // u64 math: a huge page number is an empty page, not an overflow
        let offset = u64::from(page - 1) * u64::from(limit);

        let filter = EventFilter {
            date: params.date.map(|d| d.to_rfc3339()),
            category_name: params.category_name,
            category_type: params.category_type,
        };

        let db = self.db.clone();
        let (rows, total) = run_blocking(move || {
            let total = db.count_events(&filter)?;
            let rows = db.list_events(&filter, limit, offset)?;
            Ok((rows, total))
        })
        .await?;

        let events: Vec<Event> = rows.iter().map(|r| event_from_row(r, None)).collect();
        Ok(EventPage {
            events,
            total,
            pages: PageInfo {
                current: page,
                total: total.div_ceil(u64::from(limit)) as u32,
            },
        })
    }

    /// Create an event. Category is find-or-created, then the owner resolved
    /// through the user directory — all reads succeed before the write, so a
    /// failed resolution leaves no orphaned event row.
    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        description: &str,
        date: DateTime<Utc>,
        category: CategoryRef,
    ) -> Result<Event, Error> {
        let category = self
            .find_or_create_category(&category.name, category.kind.as_deref())
            .await?;
        let owner = self.directory.get(owner_id, false).await?;

        let id = Uuid::new_v4();
        let db = self.db.clone();
        let (title, description) = (title.to_string(), description.to_string());
        let category_id = category.id.to_string();
        let row = run_blocking(move || {
            db.insert_event(
                &id.to_string(),
                &title,
                &description,
                &date.to_rfc3339(),
                &category_id,
                &owner_id.to_string(),
            )?;
            db.get_event(&id.to_string())?
                .ok_or_else(|| anyhow::anyhow!("event vanished after insert"))
        })
        .await?;

        let summary = gather_types::models::UserSummary {
            id: owner.user.id,
            name: owner.user.name,
            email: owner.user.email,
        };
        Ok(event_from_row(&row, Some(summary)))
    }

    /// Owner-scoped update: the storage predicate carries the authorization
    /// check, so a non-owner's patch matches zero rows and reports `false`
    /// rather than raising a permission error.
    pub async fn update(
        &self,
        owner_id: Uuid,
        event_id: Uuid,
        patch: EventPatch,
    ) -> Result<bool, Error> {
        if patch.is_empty() {
            return Ok(false);
        }

        let category_id = match &patch.category {
            Some(cat) => Some(
                self.find_or_create_category(&cat.name, cat.kind.as_deref())
                    .await?
                    .id
                    .to_string(),
            ),
            None => None,
        };

        let db = self.db.clone();
        let affected = run_blocking(move || {
            db.update_event(
                &event_id.to_string(),
                &owner_id.to_string(),
                patch.title.as_deref(),
                patch.description.as_deref(),
                patch.date.map(|d| d.to_rfc3339()).as_deref(),
                category_id.as_deref(),
            )
        })
        .await?;

        Ok(affected > 0)
    }

    /// Exact-match lookup (case-sensitive, unlike the listing filter) that
    /// creates the category on a miss. Concurrent callers may race into a
    /// benign duplicate row; events join by category id, so listing never
    /// double-counts.
    pub async fn find_or_create_category(
        &self,
        name: &str,
        kind: Option<&str>,
    ) -> Result<Category, Error> {
        let db = self.db.clone();
        let name = name.to_string();
        let kind = kind.map(str::to_string);
        let row = run_blocking(move || {
            if let Some(row) = db.find_category(&name, kind.as_deref())? {
                return Ok(row);
            }
            let id = Uuid::new_v4().to_string();
            db.insert_category(&id, &name, kind.as_deref())?;
            db.get_category(&id)?
                .ok_or_else(|| anyhow::anyhow!("category vanished after insert"))
        })
        .await?;

        Ok(category_from_row(&row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn catalog() -> (Arc<Database>, EventCatalog) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let directory = UserDirectory::new(db.clone());
        (db.clone(), EventCatalog::new(db, directory))
    }

    fn seed_user(db: &Database, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        db.insert_user(&id.to_string(), "owner", email, "$argon2id$stub")
            .unwrap();
        id
    }

    fn tech_category() -> CategoryRef {
        CategoryRef {
            name: "Tech".into(),
            kind: Some("tech".into()),
        }
    }

    fn june(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, 18, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn create_resolves_category_and_owner() {
        let (db, catalog) = catalog();
        let owner = seed_user(&db, "o@example.com");

        let event = catalog
            .create(owner, "Biban24", "Opportunities", june(1), tech_category())
            .await
            .unwrap();

        assert_eq!(event.title, "Biban24");
        assert_eq!(event.category.as_ref().unwrap().name, "Tech");
        assert_eq!(event.user.as_ref().unwrap().id, owner);

        // missing owner fails before any write
        let err = catalog
            .create(Uuid::new_v4(), "ghost", "d", june(1), tech_category())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound));
        assert_eq!(catalog.list(ListParams::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn find_or_create_category_is_idempotent() {
        let (_db, catalog) = catalog();
        let first = catalog
            .find_or_create_category("Tech", Some("tech"))
            .await
            .unwrap();
        let second = catalog
            .find_or_create_category("Tech", Some("tech"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        // different type is a different category
        let third = catalog
            .find_or_create_category("Tech", Some("meetup"))
            .await
            .unwrap();
        assert_ne!(first.id, third.id);
    }

    #[tokio::test]
    async fn pagination_splits_35_events_across_two_pages() {
        let (db, catalog) = catalog();
        let owner = seed_user(&db, "o@example.com");
        for i in 0..35 {
            catalog
                .create(owner, &format!("event {i}"), "d", june(1), tech_category())
                .await
                .unwrap();
        }

        let page1 = catalog
            .list(ListParams { page: 1, limit: 30, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page1.events.len(), 30);
        assert_eq!(page1.total, 35);
        assert_eq!(page1.pages.total, 2);
        assert_eq!(page1.pages.current, 1);

        let page2 = catalog
            .list(ListParams { page: 2, limit: 30, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page2.events.len(), 5);
        assert_eq!(page2.pages.current, 2);
    }

    #[tokio::test]
    async fn a_huge_page_number_is_an_empty_page() {
        let (db, catalog) = catalog();
        let owner = seed_user(&db, "o@example.com");
        catalog
            .create(owner, "only one", "d", june(1), tech_category())
            .await
            .unwrap();

        let page = catalog
            .list(ListParams { page: 50_000_000, limit: 100, ..Default::default() })
            .await
            .unwrap();
        assert!(page.events.is_empty());
        assert_eq!(page.total, 1);
        assert_eq!(page.pages.current, 50_000_000);
    }

    #[tokio::test]
    async fn duplicate_category_rows_never_double_count_events() {
        let (db, catalog) = catalog();
        let owner = seed_user(&db, "o@example.com");

        // two near-duplicate rows, as a racing find-or-create can leave behind
        let cat_a = Uuid::new_v4().to_string();
        let cat_b = Uuid::new_v4().to_string();
        db.insert_category(&cat_a, "Tech", Some("tech")).unwrap();
        db.insert_category(&cat_b, "Tech", Some("tech")).unwrap();
        db.insert_event(
            &Uuid::new_v4().to_string(),
            "first",
            "d",
            &june(1).to_rfc3339(),
            &cat_a,
            &owner.to_string(),
        )
        .unwrap();
        db.insert_event(
            &Uuid::new_v4().to_string(),
            "second",
            "d",
            &june(2).to_rfc3339(),
            &cat_b,
            &owner.to_string(),
        )
        .unwrap();

        // each event joins its own category row: exactly two hits, none lost
        let hits = catalog
            .list(ListParams { category_name: Some("Tech".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(hits.total, 2);
        assert_eq!(hits.events.len(), 2);
    }

    #[tokio::test]
    async fn filters_are_conjunctive_and_fuzzy_on_category() {
        let (db, catalog) = catalog();
        let owner = seed_user(&db, "o@example.com");
        catalog
            .create(owner, "tech day", "d", june(1), tech_category())
            .await
            .unwrap();
        catalog
            .create(
                owner,
                "music night",
                "d",
                june(2),
                CategoryRef { name: "Music".into(), kind: Some("art".into()) },
            )
            .await
            .unwrap();

        // substring, case-insensitive
        let hits = catalog
            .list(ListParams { category_name: Some("tec".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(hits.events.len(), 1);
        assert_eq!(hits.events[0].title, "tech day");

        // date AND category must both match
        let none = catalog
            .list(ListParams {
                date: Some(june(2)),
                category_name: Some("tec".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(none.events.is_empty());
        assert_eq!(none.pages.total, 0);
    }

    #[tokio::test]
    async fn update_by_non_owner_changes_nothing() {
        let (db, catalog) = catalog();
        let owner = seed_user(&db, "o@example.com");
        let stranger = seed_user(&db, "s@example.com");
        let event = catalog
            .create(owner, "original", "d", june(1), tech_category())
            .await
            .unwrap();

        let patch = EventPatch { title: Some("hijacked".into()), ..Default::default() };
        assert!(!catalog.update(stranger, event.id, patch).await.unwrap());

        let listed = catalog.list(ListParams::default()).await.unwrap();
        assert_eq!(listed.events[0].title, "original");

        let patch = EventPatch { title: Some("renamed".into()), ..Default::default() };
        assert!(catalog.update(owner, event.id, patch).await.unwrap());
    }
}
