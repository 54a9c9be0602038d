// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{Auth, Role, SecurityContext},
    error::ApiError,
    state::AppState,
};

/// Response for GET /user/me
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserMeResponse {
    pub customer_id: u32,
    pub username: String,
    /// Role as verified from the token
    pub role: Role,
}

/// Get the current authenticated user's information.
///
/// Identity comes from the verified token; the stored record supplies the
/// customer id.
#[utoipa::path(
    get,
    path = "/user/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserMeResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn get_current_user(
    Auth(ctx): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserMeResponse>, ApiError> {
    let SecurityContext { username, role } = ctx;
    let customer_id = state
        .store
        .read()
        .await
        .by_username(&username)
        .map(|identity| identity.customer_id)
        .ok_or_else(|| ApiError::not_found(format!("User {username} does not exist")))?;

    Ok(Json(UserMeResponse {
        customer_id,
        username,
        role,
    }))
}
