use axum::extract::{Json, Path, Query, State};
use chrono::Utc;

use crate::{
    AppState,
    error::{AppError, AppResult, USER_EXISTS},
    models::{AdminRole, User},
    result::ApiResponse,
    routes::{
        require, validate_email, validate_password,
        user::{
            handler::{authenticate, register},
            model::{LoginRequest, TokenResponse, UserView},
        },
    },
    store::{StoreError, UserStore},
    utils::{hash_password, success_to_api_response},
};

use super::model::{
    CreateUserRequest, DeletedUserResponse, PartitionQuery, RecomputeResponse, UpdateUserRequest,
};

const RESOURCE: &str = "user";

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let token = authenticate(&state, req, true).await?;
    Ok(success_to_api_response(token))
}

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    Query(partition): Query<PartitionQuery>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<Json<ApiResponse<UserView>>> {
    require("username", &req.username)?;
    validate_email(req.email.trim())?;
    validate_password(&req.password)?;

    let admin_role = partition
        .is_admin
        .then(|| req.admin_role.unwrap_or(AdminRole::Standard));
    let password_hash = hash_password(&req.password).map_err(AppError::internal)?;
    let user = User::new(
        req.username.trim().to_string(),
        req.email.trim().to_string(),
        password_hash,
        admin_role,
        Utc::now(),
    );

    let user = register(&state, user).await?;
    tracing::info!("Account {} created (admin: {})", user.user_id, user.is_admin);
    Ok(success_to_api_response(user.into()))
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    Query(partition): Query<PartitionQuery>,
) -> AppResult<Json<ApiResponse<Vec<UserView>>>> {
    let users = state.store.list_users(partition.is_admin).await?;
    Ok(success_to_api_response(users.into_iter().map(UserView::from).collect()))
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(partition): Query<PartitionQuery>,
) -> AppResult<Json<ApiResponse<UserView>>> {
    let user = state
        .store
        .find_user(&id, partition.is_admin)
        .await?
        .ok_or(AppError::NotFound(RESOURCE))?;
    Ok(success_to_api_response(user.into()))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(partition): Query<PartitionQuery>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<ApiResponse<UserView>>> {
    let changes = req.into_changes()?;

    if let Some(email) = &changes.email {
        let holder = state.store.find_user_by_email(email, partition.is_admin).await?;
        if holder.is_some_and(|holder| holder.user_id != id) {
            return Err(AppError::Conflict(USER_EXISTS.to_string()));
        }
    }

    let user = state
        .store
        .update_user(&id, partition.is_admin, &changes, Utc::now())
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => AppError::Conflict(USER_EXISTS.to_string()),
            other => other.into(),
        })?
        .ok_or(AppError::NotFound(RESOURCE))?;
    Ok(success_to_api_response(user.into()))
}

#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(partition): Query<PartitionQuery>,
) -> AppResult<Json<ApiResponse<DeletedUserResponse>>> {
    if !state
        .store
        .delete_user(&id, partition.is_admin, Utc::now())
        .await?
    {
        return Err(AppError::NotFound(RESOURCE));
    }
    tracing::info!("Account {} deleted", id);
    Ok(success_to_api_response(DeletedUserResponse { id }))
}

/// Runs the top alpha selection now instead of waiting for the schedule.
#[axum::debug_handler]
pub async fn recompute_ranking(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<RecomputeResponse>>> {
    let outcome = state.user_ranking.recompute_top_alpha().await?;
    Ok(success_to_api_response(outcome.into()))
}
