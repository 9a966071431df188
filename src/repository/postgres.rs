use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPool;
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use super::{CatalogRepository, EventFilter, EventRepository, FavoriteRepository};
use crate::models::{
    CatalogEntry, CatalogKind, Event, EventRecord, EventStatus, Favorite, FavoriteAdded,
};
use crate::utils::error::{AppError, AppResult};

const EVENT_SELECT: &str = r#"
SELECT e.id, e.name, e.description, e.start_date, e.end_date, e.location, e.full_address,
       e.image_url, e.event_type_id, e.category_id, e.status, e.creator_id, e.creation_date,
       t.label AS type_label, c.label AS category_label
FROM event e
LEFT JOIN event_type t ON t.id = e.event_type_id
LEFT JOIN event_category c ON c.id = e.category_id
"#;

const EVENT_ORDER: &str = "ORDER BY e.start_date ASC, e.id ASC";

/// Keyword and location use `strpos` rather than `LIKE` so that `%` and `_`
/// in user input are matched literally.
const AVAILABLE_WHERE: &str = r#"
WHERE e.status = 'active'
  AND ($1::text IS NULL
       OR strpos(lower(e.name), lower($1)) > 0
       OR strpos(lower(coalesce(e.description, '')), lower($1)) > 0)
  AND ($2::text IS NULL OR strpos(lower(coalesce(e.location, '')), lower($2)) > 0)
  AND ($3::uuid IS NULL OR e.category_id = $3)
"#;

const KEYWORD_WHERE: &str = r#"
WHERE strpos(lower(e.name), lower($1)) > 0
   OR strpos(lower(coalesce(e.description, '')), lower($1)) > 0
"#;

const FAVORITE_COLUMNS: &str = "id, user_id, event_id, added_date";

#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    location: Option<String>,
    full_address: Option<String>,
    image_url: Option<String>,
    event_type_id: Option<Uuid>,
    category_id: Option<Uuid>,
    status: String,
    creator_id: Uuid,
    creation_date: NaiveDate,
    type_label: Option<String>,
    category_label: Option<String>,
}

impl TryFrom<EventRow> for EventRecord {
    type Error = AppError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let status: EventStatus = row.status.parse().map_err(|_| {
            AppError::InternalServerError(format!(
                "Event {} has unknown status '{}'",
                row.id, row.status
            ))
        })?;

        Ok(EventRecord {
            event: Event {
                id: row.id,
                name: row.name,
                description: row.description,
                start_date: row.start_date,
                end_date: row.end_date,
                location: row.location,
                full_address: row.full_address,
                image_url: row.image_url,
                event_type_id: row.event_type_id,
                category_id: row.category_id,
                status,
                creator_id: row.creator_id,
                creation_date: row.creation_date,
            },
            type_label: row.type_label,
            category_label: row.category_label,
        })
    }
}

fn into_records(rows: Vec<EventRow>) -> AppResult<Vec<EventRecord>> {
    rows.into_iter().map(EventRecord::try_from).collect()
}

/// Maps constraint violations to client errors; anything else stays a
/// database error.
fn constraint_error(err: sqlx::Error, what: &str) -> AppError {
    if let Some(db) = err.as_database_error() {
        if db.is_unique_violation() {
            return AppError::Conflict(format!("{} already exists", what));
        }
        if db.is_foreign_key_violation() {
            return AppError::NotFound(format!("{} references a row that does not exist", what));
        }
    }
    AppError::DatabaseError(err)
}

async fn fetch_event<'e, E>(executor: E, id: Uuid) -> AppResult<Option<EventRecord>>
where
    E: PgExecutor<'e>,
{
    let sql = format!("{EVENT_SELECT} WHERE e.id = $1");
    let row: Option<EventRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;

    row.map(EventRecord::try_from).transpose()
}

/// The row that made the insert a no-op can be deleted before it is read
/// back; the caller then gets a conflict to retry on.
fn existing_favorite(existing: Option<Favorite>, wanted: &Favorite) -> AppResult<FavoriteAdded> {
    existing.map(FavoriteAdded::Existing).ok_or_else(|| {
        AppError::Conflict(format!(
            "Favorite for user {} and event {} changed concurrently, retry",
            wanted.user_id, wanted.event_id
        ))
    })
}

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EventRepository for PgStore {
    async fn insert_event(&self, event: Event) -> AppResult<EventRecord> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO event (id, name, description, start_date, end_date, location,
                               full_address, image_url, event_type_id, category_id,
                               status, creator_id, creation_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.location)
        .bind(&event.full_address)
        .bind(&event.image_url)
        .bind(event.event_type_id)
        .bind(event.category_id)
        .bind(event.status.as_ref())
        .bind(event.creator_id)
        .bind(event.creation_date)
        .execute(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, "Event"))?;

        let record = fetch_event(&mut *tx, event.id)
            .await?
            .ok_or_else(|| AppError::InternalServerError("Inserted event vanished".to_string()))?;

        tx.commit().await?;
        tracing::debug!(event_id = %event.id, "Inserted event row");
        Ok(record)
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<EventRecord>> {
        fetch_event(&self.pool, id).await
    }

    async fn update_event(&self, event: Event) -> AppResult<Option<EventRecord>> {
        let mut tx = self.pool.begin().await?;

        // creation_date, creator_id and status are never written here.
        let result = sqlx::query(
            r#"
            UPDATE event
            SET name = $2, description = $3, start_date = $4, end_date = $5,
                location = $6, full_address = $7, image_url = $8,
                event_type_id = $9, category_id = $10
            WHERE id = $1
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.location)
        .bind(&event.full_address)
        .bind(&event.image_url)
        .bind(event.event_type_id)
        .bind(event.category_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, "Event"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let record = fetch_event(&mut *tx, event.id).await?;
        tx.commit().await?;
        tracing::debug!(event_id = %event.id, "Updated event row");
        Ok(record)
    }

    async fn set_event_status(
        &self,
        id: Uuid,
        status: EventStatus,
    ) -> AppResult<Option<EventRecord>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE event SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_ref())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let record = fetch_event(&mut *tx, id).await?;
        tx.commit().await?;
        tracing::debug!(event_id = %id, status = %status, "Updated event status row");
        Ok(record)
    }

    async fn delete_event(&self, id: Uuid) -> AppResult<bool> {
        // favorite.event_id is ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM event WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_events(&self, filter: EventFilter) -> AppResult<Vec<EventRecord>> {
        let rows: Vec<EventRow> = match filter {
            EventFilter::All => {
                let sql = format!("{EVENT_SELECT} {EVENT_ORDER}");
                sqlx::query_as(&sql).fetch_all(&self.pool).await?
            }
            EventFilter::Available(search) => {
                let sql = format!("{EVENT_SELECT} {AVAILABLE_WHERE} {EVENT_ORDER}");
                sqlx::query_as(&sql)
                    .bind(search.search)
                    .bind(search.location)
                    .bind(search.category_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            EventFilter::Keyword(keyword) => {
                let sql = format!("{EVENT_SELECT} {KEYWORD_WHERE} {EVENT_ORDER}");
                sqlx::query_as(&sql)
                    .bind(keyword)
                    .fetch_all(&self.pool)
                    .await?
            }
            EventFilter::Status(status) => {
                let sql = format!("{EVENT_SELECT} WHERE e.status = $1 {EVENT_ORDER}");
                sqlx::query_as(&sql)
                    .bind(status.as_ref())
                    .fetch_all(&self.pool)
                    .await?
            }
            EventFilter::Creator(creator_id) => {
                let sql = format!("{EVENT_SELECT} WHERE e.creator_id = $1 {EVENT_ORDER}");
                sqlx::query_as(&sql)
                    .bind(creator_id)
                    .fetch_all(&self.pool)
                    .await?
            }
            EventFilter::StartingAfter(instant) => {
                let sql = format!("{EVENT_SELECT} WHERE e.start_date > $1 {EVENT_ORDER}");
                sqlx::query_as(&sql)
                    .bind(instant)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        into_records(rows)
    }
}

#[async_trait]
impl CatalogRepository for PgStore {
    async fn list_entries(&self, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>> {
        let sql = format!("SELECT id, label FROM {} ORDER BY label, id", kind.table());
        let entries = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(entries)
    }

    async fn find_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<Option<CatalogEntry>> {
        let sql = format!("SELECT id, label FROM {} WHERE id = $1", kind.table());
        let entry = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    async fn insert_entry(&self, kind: CatalogKind, label: String) -> AppResult<CatalogEntry> {
        let sql = format!(
            "INSERT INTO {} (id, label) VALUES ($1, $2) RETURNING id, label",
            kind.table()
        );
        sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&label)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, &format!("{} '{}'", kind.display_name(), label)))
    }

    async fn update_entry(
        &self,
        kind: CatalogKind,
        id: Uuid,
        label: String,
    ) -> AppResult<Option<CatalogEntry>> {
        let sql = format!(
            "UPDATE {} SET label = $2 WHERE id = $1 RETURNING id, label",
            kind.table()
        );
        sqlx::query_as(&sql)
            .bind(id)
            .bind(&label)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, &format!("{} '{}'", kind.display_name(), label)))
    }

    async fn delete_entry(&self, kind: CatalogKind, id: Uuid) -> AppResult<bool> {
        // event references are ON DELETE SET NULL
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl FavoriteRepository for PgStore {
    async fn add_favorite(&self, favorite: Favorite) -> AppResult<FavoriteAdded> {
        let mut tx = self.pool.begin().await?;

        let insert = format!(
            r#"
            INSERT INTO favorite ({FAVORITE_COLUMNS})
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, event_id) DO NOTHING
            RETURNING {FAVORITE_COLUMNS}
            "#
        );
        let inserted: Option<Favorite> = sqlx::query_as(&insert)
            .bind(favorite.id)
            .bind(favorite.user_id)
            .bind(favorite.event_id)
            .bind(favorite.added_date)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| match constraint_error(e, "Favorite") {
                AppError::NotFound(_) => AppError::not_found("Event", favorite.event_id),
                other => other,
            })?;

        let added = match inserted {
            Some(created) => FavoriteAdded::Created(created),
            None => {
                let select = format!(
                    "SELECT {FAVORITE_COLUMNS} FROM favorite WHERE user_id = $1 AND event_id = $2"
                );
                let existing: Option<Favorite> = sqlx::query_as(&select)
                    .bind(favorite.user_id)
                    .bind(favorite.event_id)
                    .fetch_optional(&mut *tx)
                    .await?;
                existing_favorite(existing, &favorite)?
            }
        };

        tx.commit().await?;
        Ok(added)
    }

    async fn find_favorite(&self, id: Uuid) -> AppResult<Option<Favorite>> {
        let sql = format!("SELECT {FAVORITE_COLUMNS} FROM favorite WHERE id = $1");
        let favorite = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(favorite)
    }

    async fn list_favorites_by_user(&self, user_id: Uuid) -> AppResult<Vec<Favorite>> {
        let sql = format!(
            "SELECT {FAVORITE_COLUMNS} FROM favorite WHERE user_id = $1 ORDER BY added_date, id"
        );
        let favorites = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(favorites)
    }

    async fn delete_favorite(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM favorite WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_favorite_by_user_and_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM favorite WHERE user_id = $1 AND event_id = $2")
            .bind(user_id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventRequest, EventSearch};
    use chrono::Duration;
    use sqlx::postgres::PgPoolOptions;

    fn row(status: &str) -> EventRow {
        EventRow {
            id: Uuid::new_v4(),
            name: "Broken".to_string(),
            description: None,
            start_date: Utc::now(),
            end_date: Utc::now(),
            location: None,
            full_address: None,
            image_url: None,
            event_type_id: None,
            category_id: None,
            status: status.to_string(),
            creator_id: Uuid::new_v4(),
            creation_date: Utc::now().date_naive(),
            type_label: None,
            category_label: None,
        }
    }

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        assert!(matches!(
            EventRecord::try_from(row("ACTIVE")),
            Err(AppError::InternalServerError(_))
        ));
        assert_eq!(
            EventRecord::try_from(row("full")).unwrap().event.status,
            EventStatus::Full
        );
    }

    #[test]
    fn test_vanished_conflicting_favorite_is_a_conflict() {
        let wanted = Favorite::new(Uuid::new_v4(), Uuid::new_v4(), None);
        assert!(matches!(
            existing_favorite(None, &wanted),
            Err(AppError::Conflict(_))
        ));

        let stored = Favorite::new(wanted.user_id, wanted.event_id, None);
        assert_eq!(
            existing_favorite(Some(stored.clone()), &wanted).unwrap(),
            FavoriteAdded::Existing(stored)
        );
    }

    async fn connect() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new().connect(&url).await.unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        PgStore::new(pool)
    }

    fn new_event(name: &str, description: Option<&str>, location: &str, days_ahead: i64) -> Event {
        let start = Utc::now() + Duration::days(days_ahead);
        Event::create(
            EventRequest {
                name: name.to_string(),
                description: description.map(String::from),
                start_date: start,
                end_date: start + Duration::hours(3),
                location: location.to_string(),
                full_address: None,
                image_url: None,
                event_type_id: None,
                category_id: None,
                creator_id: None,
            },
            Uuid::new_v4(),
        )
    }

    /// Names of the records that belong to this run, in query order. The
    /// database may hold rows from other runs.
    fn names_within(records: &[EventRecord], ids: &[Uuid]) -> Vec<String> {
        records
            .iter()
            .filter(|r| ids.contains(&r.event.id))
            .map(|r| r.event.name.clone())
            .collect()
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
    async fn test_cascade_and_upsert_against_postgres() {
        let store = connect().await;

        let category = store
            .insert_entry(CatalogKind::EventCategory, format!("Music {}", Uuid::new_v4()))
            .await
            .unwrap();
        let mut event = new_event("Jazz Festival", None, "Paris", 1);
        event.category_id = Some(category.id);
        let record = store.insert_event(event).await.unwrap();
        assert_eq!(record.category_label.as_deref(), Some(category.label.as_str()));

        let user = Uuid::new_v4();
        let first = store
            .add_favorite(Favorite::new(user, record.event.id, None))
            .await
            .unwrap();
        let second = store
            .add_favorite(Favorite::new(user, record.event.id, None))
            .await
            .unwrap();
        assert_eq!(second, FavoriteAdded::Existing(first.favorite().clone()));

        assert!(store.delete_event(record.event.id).await.unwrap());
        assert!(store
            .find_favorite(first.favorite().id)
            .await
            .unwrap()
            .is_none());

        sqlx::query("DELETE FROM event_category WHERE id = $1")
            .bind(category.id)
            .execute(store.pool())
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
    async fn test_search_queries_against_postgres() {
        let store = connect().await;
        // Per-run marker so keyword matches only see this run's rows.
        let tag = Uuid::new_v4().simple().to_string();

        let music = store
            .insert_entry(CatalogKind::EventCategory, format!("Music {}", tag))
            .await
            .unwrap();

        let mut jazz = new_event(&format!("Jazz Festival {}", tag), None, "Paris", 2);
        jazz.category_id = Some(music.id);
        let jazz = store.insert_event(jazz).await.unwrap().event;

        let described = new_event(
            &format!("Night Session {}", tag),
            Some("Smooth JAZZ trio"),
            "Lyon",
            3,
        );
        let described = store.insert_event(described).await.unwrap().event;

        let brunch = new_event(&format!("Jazz Brunch {}", tag), None, "Paris", 1);
        let brunch = store.insert_event(brunch).await.unwrap().event;
        store
            .set_event_status(brunch.id, EventStatus::Canceled)
            .await
            .unwrap();

        let past = new_event(&format!("Rock Night {}", tag), None, "Lyon", -1);
        let past = store.insert_event(past).await.unwrap().event;
        store
            .set_event_status(past.id, EventStatus::Full)
            .await
            .unwrap();

        let ids = [jazz.id, described.id, brunch.id, past.id];

        // Active only, matching on name or description, ordered by start.
        let available = store
            .list_events(EventFilter::Available(EventSearch {
                search: Some("jazz".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(
            names_within(&available, &ids),
            vec![jazz.name.clone(), described.name.clone()]
        );

        let in_paris = store
            .list_events(EventFilter::Available(EventSearch {
                location: Some("PARIS".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(names_within(&in_paris, &ids), vec![jazz.name.clone()]);

        let in_music = store
            .list_events(EventFilter::Available(EventSearch {
                category_id: Some(music.id),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(names_within(&in_music, &ids), vec![jazz.name.clone()]);
        assert_eq!(
            in_music[0].category_label.as_deref(),
            Some(music.label.as_str())
        );

        // Keyword search ignores status; the tag keeps other runs out.
        let keyword = store
            .list_events(EventFilter::Keyword(tag.to_uppercase()))
            .await
            .unwrap();
        assert_eq!(keyword.len(), 4);
        assert_eq!(
            names_within(&keyword, &ids),
            vec![
                past.name.clone(),
                brunch.name.clone(),
                jazz.name.clone(),
                described.name.clone()
            ]
        );

        let full = store
            .list_events(EventFilter::Status(EventStatus::Full))
            .await
            .unwrap();
        assert_eq!(names_within(&full, &ids), vec![past.name.clone()]);

        let by_creator = store
            .list_events(EventFilter::Creator(described.creator_id))
            .await
            .unwrap();
        assert_eq!(names_within(&by_creator, &ids), vec![described.name.clone()]);

        let upcoming = store
            .list_events(EventFilter::StartingAfter(Utc::now()))
            .await
            .unwrap();
        assert_eq!(
            names_within(&upcoming, &ids),
            vec![brunch.name.clone(), jazz.name.clone(), described.name.clone()]
        );

        // Deleting the category keeps the event and clears the reference.
        assert!(store
            .delete_entry(CatalogKind::EventCategory, music.id)
            .await
            .unwrap());
        let reloaded = store.find_event(jazz.id).await.unwrap().unwrap();
        assert_eq!(reloaded.event.category_id, None);
        assert_eq!(reloaded.category_label, None);

        for id in ids {
            store.delete_event(id).await.unwrap();
        }
    }

    #[tokio::test]
    #[ignore = "requires a PostgreSQL instance at DATABASE_URL"]
    async fn test_update_keeps_immutable_columns_against_postgres() {
        let store = connect().await;
        let original = store
            .insert_event(new_event("Original", None, "Paris", 1))
            .await
            .unwrap()
            .event;
        store
            .set_event_status(original.id, EventStatus::Canceled)
            .await
            .unwrap();

        let mut stale = original.clone();
        stale.name = "Renamed".to_string();
        stale.status = EventStatus::Active;
        stale.creator_id = Uuid::nil();
        stale.creation_date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();

        let updated = store.update_event(stale).await.unwrap().unwrap().event;
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.status, EventStatus::Canceled);
        assert_eq!(updated.creator_id, original.creator_id);
        assert_eq!(updated.creation_date, original.creation_date);

        store.delete_event(original.id).await.unwrap();
    }
}
