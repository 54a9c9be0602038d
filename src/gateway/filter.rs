// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Edge filters.
//!
//! [`request_auth`] only verifies the token. [`role_auth`] also applies the
//! configured [`RuleSet`] and lets public paths through without a token.
//! Verified requests carry `X-Username`/`X-Role` taken from the claims; public
//! ones carry neither, so a client can never smuggle its own hints past the edge.
//!
//! [`role_auth`] matches on the [`canonical_path`]. A path with dot segments
//! is answered with 400 before any rule is consulted.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{path::canonical_path, rules::RuleSet};
use crate::{
    auth::{bearer_token, AuthError, TokenCodec, VerifiedClaims, X_ROLE, X_USERNAME},
    error::ApiError,
};

/// Everything the edge needs per request. Immutable after startup.
#[derive(Debug, Clone)]
pub struct EdgeState {
    pub codec: Arc<TokenCodec>,
    pub rules: Arc<RuleSet>,
    pub public_paths: Arc<[String]>,
}

impl EdgeState {
    pub fn new(codec: Arc<TokenCodec>, rules: RuleSet, public_paths: Vec<String>) -> Self {
        Self {
            codec,
            rules: Arc::new(rules),
            public_paths: public_paths.into(),
        }
    }

    /// Whether `path` equals a public path or sits beneath one.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|public| {
            path.strip_prefix(public.as_str()).is_some_and(|rest| {
                rest.is_empty() || public.ends_with('/') || rest.starts_with('/')
            })
        })
    }
}

/// Token-only edge filter.
pub async fn request_auth(
    State(codec): State<Arc<TokenCodec>>,
    mut request: Request,
    next: Next,
) -> Response {
    let outcome = verify(&codec, request.headers())
        .and_then(|claims| inject_identity(request.headers_mut(), &claims));
    match outcome {
        Ok(()) => next.run(request).await,
        Err(e) => reject(&request, e),
    }
}

/// Token plus path rule edge filter.
pub async fn role_auth(State(edge): State<EdgeState>, mut request: Request, next: Next) -> Response {
    let Some(path) = canonical_path(request.uri().path()) else {
        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            "ambiguous path rejected at edge"
        );
        return ApiError::bad_request("Invalid request path").into_response();
    };

    if edge.is_public(&path) {
        strip_identity(request.headers_mut());
        return next.run(request).await;
    }

    let outcome = verify(&edge.codec, request.headers()).and_then(|claims| {
        edge.rules.authorize(&claims.role, &path)?;
        inject_identity(request.headers_mut(), &claims)
    });
    match outcome {
        Ok(()) => next.run(request).await,
        Err(e) => reject(&request, e),
    }
}

fn verify(codec: &TokenCodec, headers: &HeaderMap) -> Result<VerifiedClaims, AuthError> {
    let token = bearer_token(headers)?;
    Ok(codec.verify_now(token)?)
}

fn inject_identity(headers: &mut HeaderMap, claims: &VerifiedClaims) -> Result<(), AuthError> {
    let username = HeaderValue::from_str(&claims.subject).map_err(|_| AuthError::Malformed)?;
    let role = HeaderValue::from_str(&claims.role).map_err(|_| AuthError::Malformed)?;
    headers.insert(X_USERNAME, username);
    headers.insert(X_ROLE, role);
    Ok(())
}

fn strip_identity(headers: &mut HeaderMap) {
    headers.remove(X_USERNAME);
    headers.remove(X_ROLE);
}

fn reject(request: &Request, err: AuthError) -> Response {
    tracing::debug!(
        method = %request.method(),
        path = %request.uri().path(),
        reason = err.reason(),
        "request rejected at edge"
    );
    err.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::DEFAULT_TOKEN_TTL;
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request, StatusCode},
        middleware::from_fn_with_state,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const KEY: &[u8] = b"edge-filter-test-signing-key-32b";

    fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(KEY, DEFAULT_TOKEN_TTL).unwrap())
    }

    fn edge(codec: Arc<TokenCodec>) -> EdgeState {
        EdgeState::new(
            codec,
            RuleSet::parse("/admin/=ADMIN;/user/=USER").unwrap(),
            vec!["/auth/login".into(), "/health".into()],
        )
    }

    /// Downstream stand-in that echoes the identity hints it received.
    fn downstream(calls: Arc<AtomicUsize>) -> Router {
        Router::new().fallback(move |headers: HeaderMap| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                let hint = |name: &str| {
                    headers
                        .get(name)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned)
                };
                Json(json!({ "username": hint(X_USERNAME), "role": hint(X_ROLE) }))
            }
        })
    }

    fn role_app(edge: EdgeState, calls: Arc<AtomicUsize>) -> Router {
        downstream(calls).layer(from_fn_with_state(edge, role_auth))
    }

    fn request(path: &str, authorization: Option<String>) -> Request<Body> {
        let mut builder = Request::builder().uri(path);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_header_is_401_and_never_forwarded() {
        let calls = Arc::new(AtomicUsize::new(0));
        let response = role_app(edge(codec()), calls.clone())
            .oneshot(request("/admin/x", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn user_on_admin_path_is_403() {
        let codec = codec();
        let token = codec.issue_now("bob", "USER").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let response = role_app(edge(codec), calls.clone())
            .oneshot(request("/admin/x", Some(format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn admin_on_admin_path_is_forwarded_with_hints() {
        let codec = codec();
        let token = codec.issue_now("alice", "ADMIN").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let response = role_app(edge(codec), calls.clone())
            .oneshot(request("/admin/x", Some(format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            json_body(response).await,
            json!({ "username": "alice", "role": "ADMIN" })
        );
    }

    #[tokio::test]
    async fn client_supplied_hints_are_replaced() {
        let codec = codec();
        let token = codec.issue_now("bob", "USER").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let mut req = request("/user/library", Some(format!("Bearer {token}")));
        req.headers_mut().insert(X_USERNAME, HeaderValue::from_static("alice"));
        req.headers_mut().append(X_ROLE, HeaderValue::from_static("ADMIN"));

        let response = role_app(edge(codec), calls.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "username": "bob", "role": "USER" })
        );
    }

    #[tokio::test]
    async fn unlisted_path_is_forwarded_for_any_verified_caller() {
        let codec = codec();
        let token = codec.issue_now("bob", "USER").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let response = role_app(edge(codec), calls.clone())
            .oneshot(request("/catalogue/42", Some(format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scheme_must_match_exactly() {
        let codec = codec();
        let token = codec.issue_now("alice", "ADMIN").unwrap();

        for value in [
            format!("bearer {token}"),
            format!("Bearer  {token}"),
            format!("Token {token}"),
            token.clone(),
        ] {
            let calls = Arc::new(AtomicUsize::new(0));
            let response = role_app(edge(codec.clone()), calls.clone())
                .oneshot(request("/admin/x", Some(value.clone())))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{value}");
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn expired_token_is_401() {
        let codec = codec();
        let issued = chrono::Utc::now().timestamp() - 2 * DEFAULT_TOKEN_TTL.as_secs() as i64;
        let token = codec.issue("alice", "ADMIN", issued).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let response = role_app(edge(codec), calls.clone())
            .oneshot(request("/admin/x", Some(format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn public_paths_skip_auth_and_drop_hints() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut req = request("/auth/login", None);
        req.headers_mut().insert(X_USERNAME, HeaderValue::from_static("alice"));
        req.headers_mut().insert(X_ROLE, HeaderValue::from_static("ADMIN"));

        let response = role_app(edge(codec()), calls.clone()).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            json_body(response).await,
            json!({ "username": null, "role": null })
        );
    }

    #[tokio::test]
    async fn dot_segments_are_400_and_never_forwarded() {
        let codec = codec();
        let user = codec.issue_now("bob", "USER").unwrap();

        for (path, token) in [
            ("/user/../admin/x", Some(&user)),
            ("/user/%2e%2e/admin/x", Some(&user)),
            ("/user/.%2E/admin/x", Some(&user)),
            ("/health/../admin/x", None),
            ("/auth/login/%2e%2e/%2e%2e/admin/x", None),
        ] {
            let calls = Arc::new(AtomicUsize::new(0));
            let response = role_app(edge(codec.clone()), calls.clone())
                .oneshot(request(path, token.map(|t| format!("Bearer {t}"))))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
            assert_eq!(calls.load(Ordering::SeqCst), 0, "{path}");
        }
    }

    #[tokio::test]
    async fn rules_match_the_decoded_path() {
        let codec = codec();
        let token = codec.issue_now("bob", "USER").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let response = role_app(edge(codec), calls.clone())
            .oneshot(request("/%61dmin/x", Some(format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn encoded_public_path_is_still_public() {
        let calls = Arc::new(AtomicUsize::new(0));
        let response = role_app(edge(codec()), calls.clone())
            .oneshot(request("/auth/%6cogin", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn public_path_matching_respects_segments() {
        let edge = edge(codec());
        assert!(edge.is_public("/health"));
        assert!(edge.is_public("/health/live"));
        assert!(!edge.is_public("/healthz"));
        assert!(!edge.is_public("/auth/login-as-admin"));
    }

    #[tokio::test]
    async fn request_auth_verifies_without_rules() {
        let codec = codec();
        let token = codec.issue_now("bob", "USER").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let app = downstream(calls.clone()).layer(from_fn_with_state(codec, request_auth));

        let response = app
            .clone()
            .oneshot(request("/admin/x", Some(format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "username": "bob", "role": "USER" })
        );

        let response = app.oneshot(request("/admin/x", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
