use chrono::{DateTime, Utc};
use sqlx::types::Json;

use super::PgStore;
use crate::database::models::{ENTRY_COLUMNS, EntryEntity};
use crate::database::{READ_TIMEOUT, WRITE_TIMEOUT, with_timeout};
use crate::models::{Entry, EntryFields};
use crate::store::{EntryStore, IncidentAggregate, IncidentQuery, StoreResult};

const INSERT_ENTRY: &str = r#"
    INSERT INTO entries (
        entry_id, title, description, uploaded_by, content_url, content_type,
        location, address, alert_type, status, created_at, updated_at
    ) VALUES (
        $1, $2, $3, $4, $5, $6,
        ST_SetSRID(ST_MakePoint($7, $8), 4326)::geography,
        $9, $10, $11, $12, $13
    )
"#;

// Severity comes from an inner join, so entries whose alert type does not
// resolve drop out. HAVING turns "nothing matched" into no row at all.
const COUNT_INCIDENTS: &str = r#"
    SELECT COUNT(*) AS num_incidents
    FROM entries e
    INNER JOIN alert_types a
        ON a.alert_type_id = e.alert_type AND a.status = 'enabled'
    WHERE e.status = 'enabled'
      AND e.created_at >= $3
      AND a.level >= $4
      AND ST_DWithin(
          e.location,
          ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography,
          $5
      )
    HAVING COUNT(*) > 0
"#;

fn into_entries(rows: Vec<EntryEntity>) -> StoreResult<Vec<Entry>> {
    rows.into_iter().map(Entry::try_from).collect()
}

fn bind_insert<'q>(
    entry: &'q Entry,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(INSERT_ENTRY)
        .bind(&entry.entry_id)
        .bind(&entry.title)
        .bind(&entry.description)
        .bind(entry.uploaded_by.as_deref())
        .bind(&entry.content_url)
        .bind(&entry.content_type)
        .bind(entry.location.longitude())
        .bind(entry.location.latitude())
        .bind(entry.address.as_ref().map(Json))
        .bind(&entry.alert_type)
        .bind(entry.status.as_str())
        .bind(entry.created)
        .bind(entry.updated)
}

impl EntryStore for PgStore {
    async fn insert_entry(&self, entry: &Entry) -> StoreResult<()> {
        with_timeout("insert_entry", WRITE_TIMEOUT, async {
            bind_insert(entry).execute(self.pool()).await?;
            Ok(())
        })
        .await
    }

    async fn insert_entries(&self, entries: &[Entry]) -> StoreResult<u64> {
        with_timeout("insert_entries", WRITE_TIMEOUT, async {
            let mut tx = self.pool().begin().await?;
            let mut inserted = 0;
            for entry in entries {
                inserted += bind_insert(entry).execute(&mut *tx).await?.rows_affected();
            }
            tx.commit().await?;
            Ok(inserted)
        })
        .await
    }

    async fn find_entry(&self, entry_id: &str) -> StoreResult<Option<Entry>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE entry_id = $1");
        let row = with_timeout(
            "find_entry",
            READ_TIMEOUT,
            sqlx::query_as::<_, EntryEntity>(&sql)
                .bind(entry_id)
                .fetch_optional(self.pool()),
        )
        .await?;
        row.map(Entry::try_from).transpose()
    }

    async fn list_entries(&self) -> StoreResult<Vec<Entry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE status = 'enabled' ORDER BY created_at DESC"
        );
        let rows = with_timeout(
            "list_entries",
            READ_TIMEOUT,
            sqlx::query_as::<_, EntryEntity>(&sql).fetch_all(self.pool()),
        )
        .await?;
        into_entries(rows)
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        fields: &EntryFields,
        updated: DateTime<Utc>,
    ) -> StoreResult<Option<Entry>> {
        let sql = format!(
            r#"
            UPDATE entries SET
                title = $2,
                description = $3,
                content_url = $4,
                content_type = $5,
                location = ST_SetSRID(ST_MakePoint($6, $7), 4326)::geography,
                address = $8,
                alert_type = $9,
                updated_at = $10
            WHERE entry_id = $1 AND status = 'enabled'
            RETURNING {ENTRY_COLUMNS}
            "#
        );
        let row = with_timeout(
            "update_entry",
            WRITE_TIMEOUT,
            sqlx::query_as::<_, EntryEntity>(&sql)
                .bind(entry_id)
                .bind(&fields.title)
                .bind(&fields.description)
                .bind(&fields.content_url)
                .bind(&fields.content_type)
                .bind(fields.location.longitude())
                .bind(fields.location.latitude())
                .bind(fields.address.as_ref().map(Json))
                .bind(&fields.alert_type)
                .bind(updated)
                .fetch_optional(self.pool()),
        )
        .await?;
        row.map(Entry::try_from).transpose()
    }

    async fn delete_entry(&self, entry_id: &str, updated: DateTime<Utc>) -> StoreResult<bool> {
        let result = with_timeout(
            "delete_entry",
            WRITE_TIMEOUT,
            sqlx::query(
                "UPDATE entries SET status = 'deleted', updated_at = $2 \
                 WHERE entry_id = $1 AND status = 'enabled'",
            )
            .bind(entry_id)
            .bind(updated)
            .execute(self.pool()),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_incidents(&self, query: &IncidentQuery) -> StoreResult<Option<IncidentAggregate>> {
        with_timeout(
            "count_incidents",
            READ_TIMEOUT,
            sqlx::query_as::<_, IncidentAggregate>(COUNT_INCIDENTS)
                .bind(query.latitude)
                .bind(query.longitude)
                .bind(query.since)
                .bind(query.min_level)
                .bind(query.radius_meters)
                .fetch_optional(self.pool()),
        )
        .await
    }
}
