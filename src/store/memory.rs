//! In-memory store used by unit tests. Mirrors the semantics of the Postgres
//! queries: radius by great-circle distance, inner join on alert types,
//! status filters and the lowest-id tie-break.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::{
    AlertTypeStore, EntryStore, IncidentAggregate, IncidentQuery, ReporterCount, StoreError,
    StoreResult, UserStore,
};
use crate::models::{
    AlertType, AlertTypeFields, Entry, EntryFields, GeoPoint, Rank, Ranking, Status, User,
    UserChanges,
};

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance in metres.
pub fn calculate_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[derive(Default)]
struct MemoryData {
    entries: Vec<Entry>,
    alert_types: Vec<AlertType>,
    users: Vec<User>,
    corrupt_aggregates: bool,
    fail_writes: bool,
    rank_writes: usize,
    pending_holder: Option<String>,
}

impl MemoryData {
    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes {
            Err(StoreError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }

    fn user_mut(&mut self, user_id: &str, is_admin: bool) -> Option<&mut User> {
        self.users.iter_mut().find(|u| {
            u.user_id == user_id && u.is_admin == is_admin && u.status.is_enabled()
        })
    }

    fn holders(&self) -> Vec<&User> {
        let mut holders: Vec<&User> = self
            .users
            .iter()
            .filter(|u| u.ranking.is_top_alpha && u.status.is_enabled())
            .collect();
        holders.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        holders
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> MutexGuard<'_, MemoryData> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes the incident aggregation fail to decode.
    pub fn corrupt_aggregates(&self) {
        self.data().corrupt_aggregates = true;
    }

    /// Makes every write fail as if the pool had timed out.
    pub fn fail_writes(&self) {
        self.data().fail_writes = true;
    }

    /// Hands the top alpha flag to `user_id` right before the next promotion
    /// compares holders, as a concurrent run would.
    pub fn take_top_alpha_before_next_promotion(&self, user_id: &str) {
        self.data().pending_holder = Some(user_id.to_string());
    }

    /// Number of successful `save_rank` calls.
    pub fn rank_writes(&self) -> usize {
        self.data().rank_writes
    }

    /// Looks a user up regardless of partition or status.
    pub fn user(&self, user_id: &str) -> Option<User> {
        self.data().users.iter().find(|u| u.user_id == user_id).cloned()
    }

    /// Ids of enabled users currently flagged as top alpha.
    pub fn top_alpha_holders(&self) -> Vec<String> {
        self.data()
            .holders()
            .into_iter()
            .map(|u| u.user_id.clone())
            .collect()
    }

    pub fn add_user(&self, user_id: &str, now: DateTime<Utc>) -> User {
        let mut user = User::new(
            user_id.to_string(),
            format!("{user_id}@mrkt.test"),
            "hash".to_string(),
            None,
            now,
        );
        user.user_id = user_id.to_string();
        self.data().users.push(user.clone());
        user
    }

    pub fn set_ranking(&self, user_id: &str, ranking: Ranking) {
        if let Some(user) = self.data().users.iter_mut().find(|u| u.user_id == user_id) {
            user.ranking = ranking;
        }
    }

    pub fn set_user_status(&self, user_id: &str, status: Status) {
        if let Some(user) = self.data().users.iter_mut().find(|u| u.user_id == user_id) {
            user.status = status;
        }
    }

    pub fn add_alert_type(&self, alert_type_id: &str, level: i32, now: DateTime<Utc>) -> AlertType {
        let mut alert_type = AlertType::new(
            AlertTypeFields {
                name: alert_type_id.to_string(),
                level,
            },
            now,
        );
        alert_type.alert_type_id = alert_type_id.to_string();
        self.data().alert_types.push(alert_type.clone());
        alert_type
    }

    pub fn add_entry(
        &self,
        uploaded_by: Option<&str>,
        alert_type: &str,
        location: GeoPoint,
        created: DateTime<Utc>,
    ) -> Entry {
        let entry = Entry::new(
            EntryFields {
                title: "incident".to_string(),
                description: "reported incident".to_string(),
                content_url: "https://cdn.mrkt.test/incident.jpg".to_string(),
                content_type: "image".to_string(),
                location,
                address: None,
                alert_type: alert_type.to_string(),
            },
            uploaded_by.map(str::to_string),
            created,
        );
        self.data().entries.push(entry.clone());
        entry
    }

    pub fn set_entry_status(&self, entry_id: &str, status: Status) {
        if let Some(entry) = self.data().entries.iter_mut().find(|e| e.entry_id == entry_id) {
            entry.status = status;
        }
    }
}

impl EntryStore for MemoryStore {
    async fn insert_entry(&self, entry: &Entry) -> StoreResult<()> {
        let mut data = self.data();
        data.check_writable()?;
        data.entries.push(entry.clone());
        Ok(())
    }

    async fn insert_entries(&self, entries: &[Entry]) -> StoreResult<u64> {
        let mut data = self.data();
        data.check_writable()?;
        data.entries.extend_from_slice(entries);
        Ok(entries.len() as u64)
    }

    async fn find_entry(&self, entry_id: &str) -> StoreResult<Option<Entry>> {
        Ok(self.data().entries.iter().find(|e| e.entry_id == entry_id).cloned())
    }

    async fn list_entries(&self) -> StoreResult<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .data()
            .entries
            .iter()
            .filter(|e| e.status.is_enabled())
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(entries)
    }

    async fn update_entry(
        &self,
        entry_id: &str,
        fields: &EntryFields,
        updated: DateTime<Utc>,
    ) -> StoreResult<Option<Entry>> {
        let mut data = self.data();
        data.check_writable()?;
        let entry = data
            .entries
            .iter_mut()
            .find(|e| e.entry_id == entry_id && e.status.is_enabled());
        Ok(entry.map(|entry| {
            entry.apply(fields.clone(), updated);
            entry.clone()
        }))
    }

    async fn delete_entry(&self, entry_id: &str, updated: DateTime<Utc>) -> StoreResult<bool> {
        let mut data = self.data();
        data.check_writable()?;
        match data
            .entries
            .iter_mut()
            .find(|e| e.entry_id == entry_id && e.status.is_enabled())
        {
            Some(entry) => {
                entry.status = Status::Deleted;
                entry.updated = updated;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count_incidents(&self, query: &IncidentQuery) -> StoreResult<Option<IncidentAggregate>> {
        let data = self.data();
        if data.corrupt_aggregates {
            return Err(StoreError::Decode(
                "column `num_incidents` is not an integer".to_string(),
            ));
        }

        let count = data
            .entries
            .iter()
            .filter(|e| e.status.is_enabled() && e.created >= query.since)
            .filter(|e| {
                calculate_distance(
                    query.latitude,
                    query.longitude,
                    e.location.latitude(),
                    e.location.longitude(),
                ) <= query.radius_meters
            })
            .filter(|e| {
                data.alert_types
                    .iter()
                    .find(|a| a.alert_type_id == e.alert_type)
                    .is_some_and(|a| a.status.is_enabled() && a.level >= query.min_level)
            })
            .count();

        Ok((count > 0).then(|| IncidentAggregate {
            num_incidents: count as i64,
        }))
    }
}

impl AlertTypeStore for MemoryStore {
    async fn insert_alert_type(&self, alert_type: &AlertType) -> StoreResult<()> {
        let mut data = self.data();
        data.check_writable()?;
        let duplicate = data
            .alert_types
            .iter()
            .any(|a| a.status.is_enabled() && a.name == alert_type.name);
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "alert type `{}` already exists",
                alert_type.name
            )));
        }
        data.alert_types.push(alert_type.clone());
        Ok(())
    }

    async fn find_alert_type(&self, alert_type_id: &str) -> StoreResult<Option<AlertType>> {
        Ok(self
            .data()
            .alert_types
            .iter()
            .find(|a| a.alert_type_id == alert_type_id && a.status.is_enabled())
            .cloned())
    }

    async fn find_alert_type_by_name(&self, name: &str) -> StoreResult<Option<AlertType>> {
        Ok(self
            .data()
            .alert_types
            .iter()
            .find(|a| a.name == name && a.status.is_enabled())
            .cloned())
    }

    async fn list_alert_types(&self, name: Option<&str>) -> StoreResult<Vec<AlertType>> {
        Ok(self
            .data()
            .alert_types
            .iter()
            .filter(|a| a.status.is_enabled())
            .filter(|a| name.is_none_or(|n| a.name == n))
            .cloned()
            .collect())
    }

    async fn update_alert_type(
        &self,
        alert_type_id: &str,
        fields: &AlertTypeFields,
        updated: DateTime<Utc>,
    ) -> StoreResult<Option<AlertType>> {
        let mut data = self.data();
        data.check_writable()?;
        let alert_type = data
            .alert_types
            .iter_mut()
            .find(|a| a.alert_type_id == alert_type_id && a.status.is_enabled());
        Ok(alert_type.map(|a| {
            a.name = fields.name.clone();
            a.level = fields.level;
            a.updated = updated;
            a.clone()
        }))
    }

    async fn delete_alert_type(&self, alert_type_id: &str, updated: DateTime<Utc>) -> StoreResult<bool> {
        let mut data = self.data();
        data.check_writable()?;
        match data
            .alert_types
            .iter_mut()
            .find(|a| a.alert_type_id == alert_type_id && a.status.is_enabled())
        {
            Some(a) => {
                a.status = Status::Deleted;
                a.updated = updated;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut data = self.data();
        data.check_writable()?;
        data.users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, user_id: &str, is_admin: bool) -> StoreResult<Option<User>> {
        Ok(self.data().user_mut(user_id, is_admin).map(|u| u.clone()))
    }

    async fn find_user_by_email(&self, email: &str, is_admin: bool) -> StoreResult<Option<User>> {
        Ok(self
            .data()
            .users
            .iter()
            .find(|u| u.email == email && u.is_admin == is_admin && u.status.is_enabled())
            .cloned())
    }

    async fn list_users(&self, is_admin: bool) -> StoreResult<Vec<User>> {
        Ok(self
            .data()
            .users
            .iter()
            .filter(|u| u.is_admin == is_admin && u.status.is_enabled())
            .cloned()
            .collect())
    }

    async fn update_user(
        &self,
        user_id: &str,
        is_admin: bool,
        changes: &UserChanges,
        updated: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        let mut data = self.data();
        data.check_writable()?;
        Ok(data.user_mut(user_id, is_admin).map(|user| {
            changes.clone().apply(user, updated);
            user.clone()
        }))
    }

    async fn delete_user(&self, user_id: &str, is_admin: bool, updated: DateTime<Utc>) -> StoreResult<bool> {
        let mut data = self.data();
        data.check_writable()?;
        match data.user_mut(user_id, is_admin) {
            Some(user) => {
                user.status = Status::Deleted;
                user.ranking.is_top_alpha = false;
                user.updated = updated;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_top_alpha(&self) -> StoreResult<Option<User>> {
        Ok(self.data().holders().first().map(|u| (*u).clone()))
    }

    async fn count_active_entries(&self, user_id: &str) -> StoreResult<i64> {
        let count = self
            .data()
            .entries
            .iter()
            .filter(|e| e.status.is_enabled() && e.uploaded_by.as_deref() == Some(user_id))
            .count();
        Ok(count as i64)
    }

    async fn top_reporter(&self) -> StoreResult<Option<ReporterCount>> {
        let data = self.data();
        let mut counts: Vec<ReporterCount> = data
            .users
            .iter()
            .filter(|u| u.status.is_enabled())
            .map(|u| ReporterCount {
                user_id: u.user_id.clone(),
                num_incidents: data
                    .entries
                    .iter()
                    .filter(|e| {
                        e.status.is_enabled()
                            && e.uploaded_by.as_deref() == Some(u.user_id.as_str())
                    })
                    .count() as i64,
            })
            .filter(|c| c.num_incidents > 0)
            .collect();
        counts.sort_by(|a, b| {
            b.num_incidents
                .cmp(&a.num_incidents)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(counts.into_iter().next())
    }

    async fn save_rank(&self, user_id: &str, rank: Rank, last_updated: DateTime<Utc>) -> StoreResult<()> {
        let mut data = self.data();
        data.check_writable()?;
        if let Some(user) = data.users.iter_mut().find(|u| u.user_id == user_id) {
            user.ranking.rank = rank;
            user.ranking.last_updated = Some(last_updated);
        }
        data.rank_writes += 1;
        Ok(())
    }

    async fn promote_top_alpha(
        &self,
        expected_holder: Option<&str>,
        winner: &str,
        ranking: &Ranking,
    ) -> StoreResult<bool> {
        let mut data = self.data();
        data.check_writable()?;

        if let Some(holder) = data.pending_holder.take() {
            for user in data.users.iter_mut() {
                user.ranking.is_top_alpha = user.user_id == holder;
            }
        }

        let current = data.holders().first().map(|u| u.user_id.clone());
        if current.as_deref() != expected_holder {
            return Ok(false);
        }
        let winner_exists = data
            .users
            .iter()
            .any(|u| u.user_id == winner && u.status.is_enabled());
        if !winner_exists {
            return Ok(false);
        }

        for user in data.users.iter_mut() {
            if user.user_id == winner {
                user.ranking = ranking.clone();
            } else {
                user.ranking.is_top_alpha = false;
            }
        }
        Ok(true)
    }
}
