// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity service HTTP API.
//!
//! Public: `/auth/login`, `/auth/register`, `/health`, `/health/live`.
//! Everything else runs behind [`service_auth`] and reads the caller from the
//! [`SecurityContext`](crate::auth::SecurityContext) it installs.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{service_auth, Identity, Role, SecurityContext},
    models::{AuthResponse, Credential, RegisterRequest, UpdateRoleRequest, UserCountResponse},
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness));

    let protected = Router::new()
        .route("/user/me", get(users::get_current_user))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/count", get(admin::count_users))
        .route("/admin/users/by-name/{username}", get(admin::get_user_by_name))
        .route(
            "/admin/users/{customer_id}",
            get(admin::get_user).delete(admin::delete_user),
        )
        .route(
            "/admin/users/{customer_id}/role",
            put(admin::update_user_role),
        )
        .route_layer(from_fn_with_state(state.codec.clone(), service_auth));

    Router::new()
        .merge(public)
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Bearer token security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login,
        auth::register,
        users::get_current_user,
        admin::list_users,
        admin::count_users,
        admin::get_user_by_name,
        admin::get_user,
        admin::delete_user,
        admin::update_user_role,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            Credential,
            AuthResponse,
            RegisterRequest,
            Identity,
            Role,
            SecurityContext,
            UpdateRoleRequest,
            UserCountResponse,
            users::UserMeResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and registration"),
        (name = "Users", description = "Current caller"),
        (name = "Admin", description = "Account management"),
        (name = "Health", description = "Probes")
    )
)]
struct ApiDoc;
