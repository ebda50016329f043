use chrono::{DateTime, Utc};

use super::PgStore;
use crate::database::models::{ALERT_TYPE_COLUMNS, AlertTypeEntity};
use crate::database::{READ_TIMEOUT, WRITE_TIMEOUT, with_timeout};
use crate::models::{AlertType, AlertTypeFields};
use crate::store::{AlertTypeStore, StoreResult};

impl AlertTypeStore for PgStore {
    async fn insert_alert_type(&self, alert_type: &AlertType) -> StoreResult<()> {
        with_timeout(
            "insert_alert_type",
            WRITE_TIMEOUT,
            sqlx::query(
                "INSERT INTO alert_types (alert_type_id, name, level, status, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(&alert_type.alert_type_id)
            .bind(&alert_type.name)
            .bind(alert_type.level)
            .bind(alert_type.status.as_str())
            .bind(alert_type.created)
            .bind(alert_type.updated)
            .execute(self.pool()),
        )
        .await?;
        Ok(())
    }

    async fn find_alert_type(&self, alert_type_id: &str) -> StoreResult<Option<AlertType>> {
        let sql = format!(
            "SELECT {ALERT_TYPE_COLUMNS} FROM alert_types \
             WHERE alert_type_id = $1 AND status = 'enabled'"
        );
        let row = with_timeout(
            "find_alert_type",
            READ_TIMEOUT,
            sqlx::query_as::<_, AlertTypeEntity>(&sql)
                .bind(alert_type_id)
                .fetch_optional(self.pool()),
        )
        .await?;
        row.map(AlertType::try_from).transpose()
    }

    async fn find_alert_type_by_name(&self, name: &str) -> StoreResult<Option<AlertType>> {
        let sql = format!(
            "SELECT {ALERT_TYPE_COLUMNS} FROM alert_types WHERE name = $1 AND status = 'enabled'"
        );
        let row = with_timeout(
            "find_alert_type_by_name",
            READ_TIMEOUT,
            sqlx::query_as::<_, AlertTypeEntity>(&sql)
                .bind(name)
                .fetch_optional(self.pool()),
        )
        .await?;
        row.map(AlertType::try_from).transpose()
    }

    async fn list_alert_types(&self, name: Option<&str>) -> StoreResult<Vec<AlertType>> {
        let sql = format!(
            "SELECT {ALERT_TYPE_COLUMNS} FROM alert_types \
             WHERE status = 'enabled' AND ($1::text IS NULL OR name = $1) \
             ORDER BY level DESC, name"
        );
        let rows = with_timeout(
            "list_alert_types",
            READ_TIMEOUT,
            sqlx::query_as::<_, AlertTypeEntity>(&sql)
                .bind(name)
                .fetch_all(self.pool()),
        )
        .await?;
        rows.into_iter().map(AlertType::try_from).collect()
    }

    async fn update_alert_type(
        &self,
        alert_type_id: &str,
        fields: &AlertTypeFields,
        updated: DateTime<Utc>,
    ) -> StoreResult<Option<AlertType>> {
        let sql = format!(
            "UPDATE alert_types SET name = $2, level = $3, updated_at = $4 \
             WHERE alert_type_id = $1 AND status = 'enabled' \
             RETURNING {ALERT_TYPE_COLUMNS}"
        );
        let row = with_timeout(
            "update_alert_type",
            WRITE_TIMEOUT,
            sqlx::query_as::<_, AlertTypeEntity>(&sql)
                .bind(alert_type_id)
                .bind(&fields.name)
                .bind(fields.level)
                .bind(updated)
                .fetch_optional(self.pool()),
        )
        .await?;
        row.map(AlertType::try_from).transpose()
    }

    async fn delete_alert_type(&self, alert_type_id: &str, updated: DateTime<Utc>) -> StoreResult<bool> {
        let result = with_timeout(
            "delete_alert_type",
            WRITE_TIMEOUT,
            sqlx::query(
                "UPDATE alert_types SET status = 'deleted', updated_at = $2 \
                 WHERE alert_type_id = $1 AND status = 'enabled'",
            )
            .bind(alert_type_id)
            .bind(updated)
            .execute(self.pool()),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
