use axum::extract::{Json, Path, Query, State};
use chrono::Utc;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{AlertType, AlertTypeFields},
    result::ApiResponse,
    store::{AlertTypeStore, StoreError},
    utils::success_to_api_response,
};

use crate::routes::location::invalidate_rankings;

use super::model::{AlertTypeQuery, AlertTypeRequest, DeletedResponse};

const RESOURCE: &str = "alert type";

fn name_taken(name: &str) -> AppError {
    AppError::Conflict(format!("An alert type named `{name}` already exists"))
}

/// Active names are unique; `keep` is the id allowed to hold the name already.
pub(crate) async fn ensure_name_free<S: AlertTypeStore>(
    store: &S,
    fields: &AlertTypeFields,
    keep: Option<&str>,
) -> AppResult<()> {
    match store.find_alert_type_by_name(&fields.name).await? {
        Some(existing) if Some(existing.alert_type_id.as_str()) != keep => {
            Err(name_taken(&fields.name))
        }
        _ => Ok(()),
    }
}

pub(crate) async fn create<S: AlertTypeStore>(store: &S, fields: AlertTypeFields) -> AppResult<AlertType> {
    ensure_name_free(store, &fields, None).await?;

    let alert_type = AlertType::new(fields, Utc::now());
    store
        .insert_alert_type(&alert_type)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => name_taken(&alert_type.name),
            other => other.into(),
        })?;
    Ok(alert_type)
}

#[axum::debug_handler]
pub async fn list_alert_types(
    State(state): State<AppState>,
    Query(query): Query<AlertTypeQuery>,
) -> AppResult<Json<ApiResponse<Vec<AlertType>>>> {
    let alert_types = state.store.list_alert_types(query.name.as_deref()).await?;
    Ok(success_to_api_response(alert_types))
}

#[axum::debug_handler]
pub async fn get_alert_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<AlertType>>> {
    let alert_type = state
        .store
        .find_alert_type(&id)
        .await?
        .ok_or(AppError::NotFound(RESOURCE))?;
    Ok(success_to_api_response(alert_type))
}

#[axum::debug_handler]
pub async fn create_alert_type(
    State(state): State<AppState>,
    Json(req): Json<AlertTypeRequest>,
) -> AppResult<Json<ApiResponse<AlertType>>> {
    let alert_type = create(&state.store, req.validate()?).await?;
    tracing::info!("Alert type {} ({}) created", alert_type.name, alert_type.alert_type_id);
    Ok(success_to_api_response(alert_type))
}

#[axum::debug_handler]
pub async fn update_alert_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AlertTypeRequest>,
) -> AppResult<Json<ApiResponse<AlertType>>> {
    let fields = req.validate()?;
    ensure_name_free(&state.store, &fields, Some(&id)).await?;

    let alert_type = state
        .store
        .update_alert_type(&id, &fields, Utc::now())
        .await?
        .ok_or(AppError::NotFound(RESOURCE))?;
    invalidate_rankings(&state).await;
    Ok(success_to_api_response(alert_type))
}

#[axum::debug_handler]
pub async fn delete_alert_type(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<DeletedResponse>>> {
    if !state.store.delete_alert_type(&id, Utc::now()).await? {
        return Err(AppError::NotFound(RESOURCE));
    }
    invalidate_rankings(&state).await;
    tracing::info!("Alert type {} deleted", id);
    Ok(success_to_api_response(DeletedResponse { id }))
}
