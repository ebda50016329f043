use axum::extract::{Extension, Json, Path, State};
use chrono::Utc;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{Entry, EntryFields},
    result::ApiResponse,
    store::{AlertTypeStore, EntryStore},
    utils::{Claims, success_to_api_response},
};

use crate::routes::location::invalidate_rankings;

use super::model::{BulkInsertResponse, DeletedEntryResponse, EntryRequest};

const RESOURCE: &str = "entry";

/// Entries must reference an active alert type when written.
pub(crate) async fn check_alert_type<S: AlertTypeStore>(store: &S, fields: &EntryFields) -> AppResult<()> {
    if store.find_alert_type(&fields.alert_type).await?.is_none() {
        return Err(AppError::Validation(format!(
            "alertType `{}` is not an active alert type",
            fields.alert_type
        )));
    }
    Ok(())
}

/// Only the uploader or an admin may change an entry.
pub(crate) fn authorize_owner(claims: &Claims, entry: &Entry) -> AppResult<()> {
    if claims.is_admin || entry.uploaded_by.as_deref() == Some(claims.sub.as_str()) {
        Ok(())
    } else {
        Err(AppError::AccessDenied)
    }
}

async fn find_active<S: EntryStore>(store: &S, entry_id: &str) -> AppResult<Entry> {
    store
        .find_entry(entry_id)
        .await?
        .filter(|entry| entry.status.is_enabled())
        .ok_or(AppError::NotFound(RESOURCE))
}

#[axum::debug_handler]
pub async fn list_entries(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<Entry>>>> {
    let entries = state.store.list_entries().await?;
    Ok(success_to_api_response(entries))
}

#[axum::debug_handler]
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Entry>>> {
    let entry = find_active(&state.store, &id).await?;
    Ok(success_to_api_response(entry))
}

#[axum::debug_handler]
pub async fn create_entry(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<EntryRequest>,
) -> AppResult<Json<ApiResponse<Entry>>> {
    let anonymous = req.anonymous;
    let mut fields = req.validate()?;
    check_alert_type(&state.store, &fields).await?;
    fields.address = state.geocoder.address_for(&fields.location).await;

    let uploaded_by = (!anonymous).then(|| claims.sub.clone());
    let entry = Entry::new(fields, uploaded_by, Utc::now());
    state.store.insert_entry(&entry).await?;
    invalidate_rankings(&state).await;

    tracing::info!("Entry {} created by {}", entry.entry_id, claims.sub);
    Ok(success_to_api_response(entry))
}

#[axum::debug_handler]
pub async fn update_entry(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<EntryRequest>,
) -> AppResult<Json<ApiResponse<Entry>>> {
    let current = find_active(&state.store, &id).await?;
    authorize_owner(&claims, &current)?;

    let mut fields = req.validate()?;
    check_alert_type(&state.store, &fields).await?;
    fields.address = if fields.location == current.location {
        current.address
    } else {
        state.geocoder.address_for(&fields.location).await
    };

    let entry = state
        .store
        .update_entry(&id, &fields, Utc::now())
        .await?
        .ok_or(AppError::NotFound(RESOURCE))?;
    invalidate_rankings(&state).await;
    Ok(success_to_api_response(entry))
}

#[axum::debug_handler]
pub async fn delete_entry(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<DeletedEntryResponse>>> {
    let current = find_active(&state.store, &id).await?;
    authorize_owner(&claims, &current)?;

    if !state.store.delete_entry(&id, Utc::now()).await? {
        return Err(AppError::NotFound(RESOURCE));
    }
    invalidate_rankings(&state).await;
    tracing::info!("Entry {} deleted by {}", id, claims.sub);
    Ok(success_to_api_response(DeletedEntryResponse { id }))
}

fn at_index(index: usize, err: AppError) -> AppError {
    match err {
        AppError::Validation(msg) => AppError::Validation(format!("entry {index}: {msg}")),
        other => other,
    }
}

/// Seed import. Entries are stored anonymously with fresh ids and timestamps;
/// the whole batch is rejected if any entry is invalid.
#[axum::debug_handler]
pub async fn bulk_create_entries(
    State(state): State<AppState>,
    Json(reqs): Json<Vec<EntryRequest>>,
) -> AppResult<Json<ApiResponse<BulkInsertResponse>>> {
    if reqs.is_empty() {
        return Err(AppError::Validation("at least one entry is required".to_string()));
    }

    let now = Utc::now();
    let mut entries = Vec::with_capacity(reqs.len());
    for (index, req) in reqs.into_iter().enumerate() {
        let mut fields = req.validate().map_err(|e| at_index(index, e))?;
        check_alert_type(&state.store, &fields)
            .await
            .map_err(|e| at_index(index, e))?;
        fields.address = state.geocoder.address_for(&fields.location).await;
        entries.push(Entry::new(fields, None, now));
    }

    let inserted = state.store.insert_entries(&entries).await?;
    invalidate_rankings(&state).await;
    tracing::info!("Imported {} entries", inserted);
    Ok(success_to_api_response(BulkInsertResponse { inserted }))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::GeoPoint;
    use crate::store::memory::MemoryStore;

    fn claims(sub: &str, is_admin: bool) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: format!("{sub}@mrkt.test"),
            username: sub.to_string(),
            is_admin,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn only_uploader_or_admin_may_change_an_entry() {
        let store = MemoryStore::new();
        let entry = store.add_entry(Some("ada"), "robbery", GeoPoint::new(6.5, 3.4), Utc::now());
        let anonymous = store.add_entry(None, "robbery", GeoPoint::new(6.5, 3.4), Utc::now());

        assert!(authorize_owner(&claims("ada", false), &entry).is_ok());
        assert!(authorize_owner(&claims("root", true), &entry).is_ok());
        assert!(matches!(
            authorize_owner(&claims("bolu", false), &entry),
            Err(AppError::AccessDenied)
        ));
        assert!(authorize_owner(&claims("ada", false), &anonymous).is_err());
    }

    #[tokio::test]
    async fn writes_need_an_active_alert_type() {
        let store = MemoryStore::new();
        store.add_alert_type("robbery", 4, Utc::now());
        let entry = store.add_entry(None, "robbery", GeoPoint::new(6.5, 3.4), Utc::now());
        let mut fields = EntryFields {
            title: entry.title,
            description: entry.description,
            content_url: entry.content_url,
            content_type: entry.content_type,
            location: entry.location,
            address: None,
            alert_type: "robbery".to_string(),
        };

        assert!(check_alert_type(&store, &fields).await.is_ok());

        fields.alert_type = "no-such-type".to_string();
        assert!(matches!(
            check_alert_type(&store, &fields).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn deleted_entries_are_not_found() {
        let store = MemoryStore::new();
        let entry = store.add_entry(None, "robbery", GeoPoint::new(6.5, 3.4), Utc::now());
        store.delete_entry(&entry.entry_id, Utc::now()).await.unwrap();

        let err = find_active(&store, &entry.entry_id).await.unwrap_err();

        assert_eq!(err.to_string(), "This entry was not found.");
    }
}
