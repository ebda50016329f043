use axum::extract::{Extension, Json, State};
use chrono::Utc;

use crate::{
    AppState,
    error::{AppError, AppResult, USER_EXISTS},
    models::User,
    ranking::RankingError,
    result::ApiResponse,
    routes::{require, validate_email, validate_password},
    store::{StoreError, UserStore},
    utils::{Claims, generate_token, hash_password, success_to_api_response, verify_password},
};

use super::model::{LoginRequest, SignUpRequest, TokenResponse, UserView};

/// Issues a token for the account behind `email` in the given partition.
pub(crate) async fn authenticate(
    state: &AppState,
    req: LoginRequest,
    is_admin: bool,
) -> AppResult<TokenResponse> {
    require("email", &req.email)?;
    require("password", &req.password)?;

    let user = state
        .store
        .find_user_by_email(req.email.trim(), is_admin)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&req.password, &user.password_hash).map_err(AppError::internal)? {
        return Err(AppError::InvalidCredentials);
    }

    let (token, expires_at) = generate_token(&user, &state.config).map_err(AppError::internal)?;
    tracing::debug!("Issued token for {}", user.user_id);
    Ok(TokenResponse { token, expires_at })
}

/// Stores a new account, refusing emails already active in its partition.
pub(crate) async fn register(state: &AppState, user: User) -> AppResult<User> {
    if state
        .store
        .find_user_by_email(&user.email, user.is_admin)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(USER_EXISTS.to_string()));
    }

    state.store.insert_user(&user).await.map_err(|e| match e {
        StoreError::Conflict(_) => AppError::Conflict(USER_EXISTS.to_string()),
        other => other.into(),
    })?;
    Ok(user)
}

#[axum::debug_handler]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    require("username", &req.username)?;
    validate_email(req.email.trim())?;
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password).map_err(AppError::internal)?;
    let user = User::new(
        req.username.trim().to_string(),
        req.email.trim().to_string(),
        password_hash,
        None,
        Utc::now(),
    );
    let user = register(&state, user).await?;
    tracing::info!("User {} signed up", user.user_id);

    let (token, expires_at) = generate_token(&user, &state.config).map_err(AppError::internal)?;
    Ok(success_to_api_response(TokenResponse { token, expires_at }))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<TokenResponse>>> {
    let token = authenticate(&state, req, false).await?;
    Ok(success_to_api_response(token))
}

/// Profile of the caller, with a ranking refreshed at most once a day.
#[axum::debug_handler]
pub async fn me(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<UserView>>> {
    let user = state
        .store
        .find_user(&claims.sub, false)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    let ranking = match state.user_ranking.get_user_ranking(&user).await {
        Ok(ranking) => ranking,
        Err(RankingError::NoTopAlpha) => {
            tracing::debug!("No top alpha yet, serving stored ranking of {}", user.user_id);
            user.ranking.clone()
        }
        Err(e) => return Err(e.into()),
    };

    Ok(success_to_api_response(UserView::with_ranking(user, ranking)))
}
