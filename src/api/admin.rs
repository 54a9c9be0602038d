// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only API endpoints for account management.
//!
//! Every handler takes [`AdminOnly`], so the service filter must have run
//! and the verified role must be `ADMIN`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    auth::{AdminOnly, Identity},
    error::ApiError,
    models::{UpdateRoleRequest, UserCountResponse},
    state::AppState,
};

/// List every account ordered by customer id.
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All accounts", body = [Identity]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn list_users(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<Vec<Identity>> {
    tracing::debug!(admin = %admin.username, "listing accounts");
    Json(state.store.read().await.list())
}

#[utoipa::path(
    get,
    path = "/admin/users/count",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UserCountResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn count_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<UserCountResponse> {
    Json(UserCountResponse {
        count: state.store.read().await.count(),
    })
}

#[utoipa::path(
    get,
    path = "/admin/users/by-name/{username}",
    params(("username" = String, Path, description = "Account username")),
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Identity),
        (status = 404, description = "No such account")
    )
)]
pub async fn get_user_by_name(
    AdminOnly(_admin): AdminOnly,
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Identity>, ApiError> {
    state
        .store
        .read()
        .await
        .by_username(&username)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("User with username {username} does not exist")))
}

#[utoipa::path(
    get,
    path = "/admin/users/{customer_id}",
    params(("customer_id" = u32, Path, description = "Customer id")),
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Identity),
        (status = 404, description = "No such account")
    )
)]
pub async fn get_user(
    AdminOnly(_admin): AdminOnly,
    Path(customer_id): Path<u32>,
    State(state): State<AppState>,
) -> Result<Json<Identity>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.by_customer_id(customer_id)?))
}

#[utoipa::path(
    delete,
    path = "/admin/users/{customer_id}",
    params(("customer_id" = u32, Path, description = "Customer id")),
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 204),
        (status = 404, description = "No such account")
    )
)]
pub async fn delete_user(
    AdminOnly(admin): AdminOnly,
    Path(customer_id): Path<u32>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state.store.write().await.delete(customer_id)?;
    tracing::info!(admin = %admin.username, customer_id, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Change an account's role. Existing tokens keep their old role until expiry.
#[utoipa::path(
    put,
    path = "/admin/users/{customer_id}/role",
    params(("customer_id" = u32, Path, description = "Customer id")),
    request_body = UpdateRoleRequest,
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, body = Identity),
        (status = 404, description = "No such account")
    )
)]
pub async fn update_user_role(
    AdminOnly(admin): AdminOnly,
    Path(customer_id): Path<u32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<Identity>, ApiError> {
    let identity = state
        .store
        .write()
        .await
        .update_role(customer_id, request.role)?;
    tracing::info!(
        admin = %admin.username,
        customer_id,
        role = %identity.role,
        "account role changed"
    );
    Ok(Json(identity))
}
