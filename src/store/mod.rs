//! Persistence seams used by the ranking engines and the HTTP handlers.
//!
//! Each trait method is one bounded store operation. The Postgres
//! implementation lives in [`crate::database`]; tests run against the
//! in-memory store in [`memory`].

#[cfg(test)]
pub mod memory;

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use thiserror::Error;

use crate::models::{AlertType, AlertTypeFields, Entry, EntryFields, Rank, Ranking, User, UserChanges};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(sqlx::Error),
    #[error("store operation `{0}` timed out")]
    Timeout(&'static str),
    #[error("conflicting record: {0}")]
    Conflict(String),
    #[error("failed to decode stored record: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => StoreError::Decode(err.to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Filter of the location incident aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncidentQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    /// Inclusive lower bound on the entry creation time.
    pub since: DateTime<Utc>,
    pub min_level: i32,
}

/// Result row of the location incident aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct IncidentAggregate {
    pub num_incidents: i64,
}

/// Result row of the top reporter aggregation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ReporterCount {
    pub user_id: String,
    pub num_incidents: i64,
}

pub trait EntryStore: Send + Sync {
    fn insert_entry(&self, entry: &Entry) -> impl Future<Output = StoreResult<()>> + Send;

    fn insert_entries(&self, entries: &[Entry]) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Finds an entry regardless of its status.
    fn find_entry(&self, entry_id: &str) -> impl Future<Output = StoreResult<Option<Entry>>> + Send;

    /// Lists enabled entries, newest first.
    fn list_entries(&self) -> impl Future<Output = StoreResult<Vec<Entry>>> + Send;

    fn update_entry(
        &self,
        entry_id: &str,
        fields: &EntryFields,
        updated: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Option<Entry>>> + Send;

    /// Soft deletes an entry. Returns `false` when no enabled entry matched.
    fn delete_entry(
        &self,
        entry_id: &str,
        updated: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Counts enabled entries within the radius and window whose alert type
    /// resolves and meets the severity threshold. `None` when nothing matched.
    fn count_incidents(
        &self,
        query: &IncidentQuery,
    ) -> impl Future<Output = StoreResult<Option<IncidentAggregate>>> + Send;
}

pub trait AlertTypeStore: Send + Sync {
    fn insert_alert_type(&self, alert_type: &AlertType) -> impl Future<Output = StoreResult<()>> + Send;

    /// Finds an enabled alert type.
    fn find_alert_type(
        &self,
        alert_type_id: &str,
    ) -> impl Future<Output = StoreResult<Option<AlertType>>> + Send;

    fn find_alert_type_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = StoreResult<Option<AlertType>>> + Send;

    fn list_alert_types(
        &self,
        name: Option<&str>,
    ) -> impl Future<Output = StoreResult<Vec<AlertType>>> + Send;

    fn update_alert_type(
        &self,
        alert_type_id: &str,
        fields: &AlertTypeFields,
        updated: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Option<AlertType>>> + Send;

    fn delete_alert_type(
        &self,
        alert_type_id: &str,
        updated: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<bool>> + Send;
}

pub trait UserStore: Send + Sync {
    fn insert_user(&self, user: &User) -> impl Future<Output = StoreResult<()>> + Send;

    /// Finds an enabled user inside the admin or non-admin partition.
    fn find_user(
        &self,
        user_id: &str,
        is_admin: bool,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    fn find_user_by_email(
        &self,
        email: &str,
        is_admin: bool,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    fn list_users(&self, is_admin: bool) -> impl Future<Output = StoreResult<Vec<User>>> + Send;

    fn update_user(
        &self,
        user_id: &str,
        is_admin: bool,
        changes: &UserChanges,
        updated: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Soft deletes a user and drops any top alpha flag it held.
    fn delete_user(
        &self,
        user_id: &str,
        is_admin: bool,
        updated: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<bool>> + Send;

    /// The enabled user currently flagged as top alpha, lowest id first.
    fn find_top_alpha(&self) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Number of enabled entries uploaded by the user.
    fn count_active_entries(&self, user_id: &str) -> impl Future<Output = StoreResult<i64>> + Send;

    /// The enabled user with the most enabled entries, ties broken by the
    /// lowest user id. `None` when no enabled user has an enabled entry.
    fn top_reporter(&self) -> impl Future<Output = StoreResult<Option<ReporterCount>>> + Send;

    /// Persists a recomputed tier and its timestamp, leaving the top alpha
    /// fields untouched.
    fn save_rank(
        &self,
        user_id: &str,
        rank: Rank,
        last_updated: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Moves the top alpha flag to `winner` in one step.
    ///
    /// Succeeds only while the current holder still equals `expected_holder`;
    /// returns `false` otherwise and changes nothing.
    fn promote_top_alpha(
        &self,
        expected_holder: Option<&str>,
        winner: &str,
        ranking: &Ranking,
    ) -> impl Future<Output = StoreResult<bool>> + Send;
}
