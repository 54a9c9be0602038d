// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Audiobook Auth - Session Tokens and Request Filters
//!
//! Signed session tokens shared by the audiobook platform's services, the
//! edge gateway that checks them before forwarding, and the per-service
//! filter every backend runs again on its own.
//!
//! ## Modules
//!
//! - `auth` - Token codec, authenticator, service filter and extractors
//! - `gateway` - Edge filters, path rules and upstream forwarding
//! - `api` - Identity service HTTP handlers (Axum)
//! - `store` - In-memory identity store
//! - `config` - Environment configuration
//! - `telemetry` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod state;
pub mod store;
pub mod telemetry;
