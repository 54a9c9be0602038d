// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Upstream forwarding for requests the edge filters have accepted.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap},
    response::Response,
};
use reqwest::Client;
use url::Url;

use super::path::canonical_path;
use crate::error::ApiError;

/// Largest request body relayed upstream.
pub const MAX_FORWARD_BODY: usize = 2 * 1024 * 1024;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection-scoped headers that must not be relayed.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// HTTP client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct Forwarder {
    http: Client,
    upstream: Url,
}

impl Forwarder {
    pub fn new(upstream: Url) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| ApiError::internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, upstream })
    }

    pub fn upstream(&self) -> &Url {
        &self.upstream
    }

    /// Upstream URL for `path` and `query`, keeping any base path prefix.
    pub fn target(&self, path: &str, query: Option<&str>) -> Url {
        let mut url = self.upstream.clone();
        let base = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{base}{path}"));
        url.set_query(query);
        url
    }

    /// Relay `request` upstream. Paths that [`canonical_path`] refuses are
    /// never sent, since [`Forwarder::target`] would resolve their dot segments.
    pub async fn forward(&self, request: Request) -> Result<Response, ApiError> {
        let (parts, body) = request.into_parts();
        if canonical_path(parts.uri.path()).is_none() {
            return Err(ApiError::bad_request("Invalid request path"));
        }
        let target = self.target(parts.uri.path(), parts.uri.query());
        let body = to_bytes(body, MAX_FORWARD_BODY)
            .await
            .map_err(|e| ApiError::bad_request(format!("request body rejected: {e}")))?;

        let mut headers = relayable(&parts.headers);
        headers.remove(header::HOST);

        let upstream = self
            .http
            .request(parts.method.clone(), target.clone())
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(%target, error = %e, "upstream request failed");
                ApiError::bad_gateway("Upstream service unavailable")
            })?;

        let status = upstream.status();
        let headers = relayable(upstream.headers());
        let bytes = upstream.bytes().await.map_err(|e| {
            tracing::warn!(%target, error = %e, "upstream response body failed");
            ApiError::bad_gateway("Upstream service unavailable")
        })?;

        tracing::debug!(method = %parts.method, %target, %status, "forwarded");

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

fn relayable(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    for name in HOP_BY_HOP {
        out.remove(*name);
    }
    out
}

/// Axum handler that relays everything to the configured upstream.
pub async fn forward(
    State(forwarder): State<Forwarder>,
    request: Request,
) -> Result<Response, ApiError> {
    forwarder.forward(request).await
}
