use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    AppState,
    error::AppError,
    utils::{Claims, decode_token, verify_token},
};

fn authorization(req: &Request) -> Result<&str, AppError> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or(AppError::AccessDenied)
}

async fn authorize(
    mut req: Request,
    next: Next,
    verify: impl FnOnce(&str) -> Option<Claims>,
) -> Result<Response, AppError> {
    let claims = verify(authorization(&req)?).ok_or(AppError::AccessDenied)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Admits tokens issued to regular users.
pub async fn user_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(req, next, |token| verify_token(token, &state.config, false)).await
}

/// Admits tokens issued to admins.
pub async fn admin_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(req, next, |token| verify_token(token, &state.config, true)).await
}

/// Admits any valid token; handlers decide by `Claims::is_admin`.
pub async fn member_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(req, next, |token| decode_token(token, &state.config).ok()).await
}
