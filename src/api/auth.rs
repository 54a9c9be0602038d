// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and registration.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    auth::{AuthError, Identity, Role},
    error::ApiError,
    models::{AuthResponse, Credential, RegisterRequest},
    state::AppState,
};

/// Exchange credentials for a signed token.
///
/// Every credential failure looks the same to the caller.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = Credential,
    tag = "Auth",
    responses(
        (status = 200, description = "Token issued", body = AuthResponse),
        (status = 401, description = "Unknown user or wrong password"),
        (status = 500, description = "Identity lookup unavailable")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(credential): Json<Credential>,
) -> Result<Json<AuthResponse>, AuthError> {
    let username = credential.username.clone();
    state
        .authenticator
        .login(credential)
        .await
        .map(Json)
        .inspect_err(|e| tracing::info!(%username, reason = e.reason(), "login refused"))
}

/// Create a listener account. New accounts always get the `USER` role.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, description = "Account created", body = Identity),
        (status = 400, description = "Username or password missing"),
        (status = 409, description = "Username already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = request.username.trim().to_string();
    if username.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let identity = state
        .create_identity(username, request.password, Role::User)
        .await?;
    tracing::info!(username = %identity.username, customer_id = identity.customer_id, "account registered");
    Ok((StatusCode::CREATED, Json(identity)))
}
