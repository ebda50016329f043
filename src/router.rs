use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use crate::{
    AppState,
    middleware::{admin_auth, member_auth, user_auth},
    routes::{admin, alert_type, entry, location, user},
};

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users/sign-up", post(user::sign_up))
        .route("/users/login", post(user::login))
        .route("/admin/login", post(admin::login))
        .route("/alert-types", get(alert_type::list_alert_types))
        .route("/alert-types/{id}", get(alert_type::get_alert_type))
        .route("/entries", get(entry::list_entries))
        .route("/entries/{id}", get(entry::get_entry))
        .route("/location/ranking", get(location::location_ranking))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(user::me))
        .route("/entries", post(entry::create_entry))
        .route_layer(from_fn_with_state(state.clone(), user_auth))
}

// uploader or admin, checked in the handlers
fn member_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/entries/{id}",
            put(entry::update_entry).delete(entry::delete_entry),
        )
        .route_layer(from_fn_with_state(state.clone(), member_auth))
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/users", post(admin::create_user).get(admin::list_users))
        .route(
            "/admin/users/{id}",
            get(admin::get_user)
                .put(admin::update_user)
                .delete(admin::delete_user),
        )
        .route("/admin/alert-types", post(alert_type::create_alert_type))
        .route(
            "/admin/alert-types/{id}",
            put(alert_type::update_alert_type).delete(alert_type::delete_alert_type),
        )
        .route("/admin/entries/bulk", post(entry::bulk_create_entries))
        .route("/admin/ranking/recompute", post(admin::recompute_ranking))
        .route_layer(from_fn_with_state(state.clone(), admin_auth))
}

/// All API routes under the configured base URI.
pub fn create_router(state: &AppState) -> Router<AppState> {
    let api = Router::new()
        .merge(public_routes())
        .merge(user_routes(state))
        .merge(member_routes(state))
        .merge(admin_routes(state));

    let base = state.config.api_base_uri.trim_matches('/');
    if base.is_empty() {
        api
    } else {
        Router::new().nest(&format!("/{base}"), api)
    }
}
