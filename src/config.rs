// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`Settings`] value both
//! binaries build once at startup. Nothing here is reloaded afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TOKEN_SIGNING_KEY` | Base64 HMAC key (>= 32 bytes decoded) | Required unless `TOKEN_SIGNING_KEY_FILE` |
//! | `TOKEN_SIGNING_KEY_FILE` | File containing the base64 key | Optional |
//! | `TOKEN_TTL_SECONDS` | Token lifetime | `1800` |
//! | `IDENTITY_LOOKUP_TIMEOUT_MS` | Login lookup deadline | `2000` |
//! | `AUTH_RULES` | `prefix=ROLE[,ROLE];...` | `/admin/=ADMIN;/user/=USER` |
//! | `GATEWAY_PUBLIC_PATHS` | Comma separated prefixes exempt from edge auth | `/auth/login,/auth/register,/health` |
//! | `UPSTREAM_URL` | Gateway forward target | Required for the gateway |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SEED_ADMIN_USERNAME` / `SEED_ADMIN_PASSWORD` | Bootstrap admin account | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Every service that verifies tokens must be given the same key material.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::auth::{TokenCodec, TokenError, DEFAULT_LOOKUP_TIMEOUT, DEFAULT_TOKEN_TTL};
use crate::gateway::RuleSet;
use crate::telemetry::LogFormat;

pub const TOKEN_SIGNING_KEY_ENV: &str = "TOKEN_SIGNING_KEY";
pub const TOKEN_SIGNING_KEY_FILE_ENV: &str = "TOKEN_SIGNING_KEY_FILE";
pub const TOKEN_TTL_SECONDS_ENV: &str = "TOKEN_TTL_SECONDS";
pub const IDENTITY_LOOKUP_TIMEOUT_MS_ENV: &str = "IDENTITY_LOOKUP_TIMEOUT_MS";
pub const AUTH_RULES_ENV: &str = "AUTH_RULES";
pub const GATEWAY_PUBLIC_PATHS_ENV: &str = "GATEWAY_PUBLIC_PATHS";
pub const UPSTREAM_URL_ENV: &str = "UPSTREAM_URL";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SEED_ADMIN_USERNAME_ENV: &str = "SEED_ADMIN_USERNAME";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Rules applied when `AUTH_RULES` is unset.
pub const DEFAULT_AUTH_RULES: &str = "/admin/=ADMIN;/user/=USER";

/// Paths the gateway forwards without a token when `GATEWAY_PUBLIC_PATHS` is unset.
pub const DEFAULT_PUBLIC_PATHS: &str = "/auth/login,/auth/register,/health";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
    #[error("cannot read signing key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("signing key rejected: {0}")]
    Key(#[from] TokenError),
}

/// Bootstrap administrator account.
#[derive(Clone)]
pub struct SeedAdmin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Process configuration, immutable after startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub codec: TokenCodec,
    pub lookup_timeout: Duration,
    pub rules: RuleSet,
    pub public_paths: Vec<String>,
    pub upstream_url: Option<Url>,
    pub bind_addr: SocketAddr,
    pub seed_admin: Option<SeedAdmin>,
    pub log_format: LogFormat,
}

impl Settings {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ttl = match var(TOKEN_TTL_SECONDS_ENV) {
            Some(raw) => Duration::from_secs(parse_positive(TOKEN_TTL_SECONDS_ENV, &raw)?),
            None => DEFAULT_TOKEN_TTL,
        };
        let codec = TokenCodec::from_base64(&signing_key(&var)?, ttl)?;

        let lookup_timeout = match var(IDENTITY_LOOKUP_TIMEOUT_MS_ENV) {
            Some(raw) => Duration::from_millis(parse_positive(IDENTITY_LOOKUP_TIMEOUT_MS_ENV, &raw)?),
            None => DEFAULT_LOOKUP_TIMEOUT,
        };

        let rules_raw = var(AUTH_RULES_ENV).unwrap_or_else(|| DEFAULT_AUTH_RULES.to_string());
        let rules = RuleSet::parse(&rules_raw).map_err(|e| ConfigError::Invalid {
            var: AUTH_RULES_ENV,
            reason: e.to_string(),
        })?;

        let public_paths = var(GATEWAY_PUBLIC_PATHS_ENV)
            .unwrap_or_else(|| DEFAULT_PUBLIC_PATHS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        let upstream_url = var(UPSTREAM_URL_ENV)
            .map(|raw| parse_upstream(&raw))
            .transpose()?;

        let host = var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match var(PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: PORT_ENV,
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };
        let bind_addr = format!("{host}:{port}")
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: HOST_ENV,
                reason: e.to_string(),
            })?;

        let seed_admin = match (var(SEED_ADMIN_USERNAME_ENV), var(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(username), Some(password)) => Some(SeedAdmin { username, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(SEED_ADMIN_PASSWORD_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(SEED_ADMIN_USERNAME_ENV)),
        };

        let log_format = var(LOG_FORMAT_ENV)
            .map(|raw| LogFormat::from_env_value(&raw))
            .unwrap_or_default();

        Ok(Self {
            codec,
            lookup_timeout,
            rules,
            public_paths,
            upstream_url,
            bind_addr,
            seed_admin,
            log_format,
        })
    }
}

fn signing_key<F>(var: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = var(TOKEN_SIGNING_KEY_ENV) {
        return Ok(key);
    }
    let path = var(TOKEN_SIGNING_KEY_FILE_ENV)
        .map(PathBuf::from)
        .ok_or(ConfigError::Missing(TOKEN_SIGNING_KEY_ENV))?;
    std::fs::read_to_string(&path).map_err(|source| ConfigError::KeyFile { path, source })
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(value) => Ok(value),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

fn parse_upstream(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        var: UPSTREAM_URL_ENV,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            var: UPSTREAM_URL_ENV,
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use std::collections::HashMap;

    // base64 of "0123456789abcdef0123456789abcdef"
    const KEY_B64: &str = "MDEyMzQ1Njc4OWFiY2RlZjAxMjM0NTY3ODlhYmNkZWY=";

    fn load(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn defaults_apply_with_only_a_key() {
        let settings = load(&[(TOKEN_SIGNING_KEY_ENV, KEY_B64)]).unwrap();
        assert_eq!(settings.codec.ttl(), Duration::from_secs(1800));
        assert_eq!(settings.lookup_timeout, Duration::from_secs(2));
        assert_eq!(settings.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(
            settings.public_paths,
            vec!["/auth/login", "/auth/register", "/health"]
        );
        assert!(settings.upstream_url.is_none());
        assert!(settings.seed_admin.is_none());
        assert_eq!(settings.log_format, LogFormat::Pretty);
        assert_eq!(
            settings.rules.matching("/admin/x").map(|r| r.allowed_roles.as_slice()),
            Some(&[Role::Admin][..])
        );
    }

    #[test]
    fn signing_key_is_required() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing(TOKEN_SIGNING_KEY_ENV))));
    }

    #[test]
    fn short_or_garbled_keys_fail() {
        assert!(matches!(
            load(&[(TOKEN_SIGNING_KEY_ENV, "c2hvcnQ=")]),
            Err(ConfigError::Key(TokenError::KeyTooShort(5)))
        ));
        assert!(matches!(
            load(&[(TOKEN_SIGNING_KEY_ENV, "not base64!")]),
            Err(ConfigError::Key(TokenError::KeyEncoding))
        ));
    }

    #[test]
    fn missing_key_file_is_reported() {
        let err = load(&[(TOKEN_SIGNING_KEY_FILE_ENV, "/nonexistent/audiobook/key")]).unwrap_err();
        assert!(matches!(err, ConfigError::KeyFile { .. }));
    }

    #[test]
    fn overrides_are_parsed() {
        let settings = load(&[
            (TOKEN_SIGNING_KEY_ENV, KEY_B64),
            (TOKEN_TTL_SECONDS_ENV, "60"),
            (IDENTITY_LOOKUP_TIMEOUT_MS_ENV, "250"),
            (AUTH_RULES_ENV, "/reports/=ADMIN"),
            (GATEWAY_PUBLIC_PATHS_ENV, "/auth/login, /catalogue/"),
            (UPSTREAM_URL_ENV, "http://identity:8081"),
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9000"),
            (SEED_ADMIN_USERNAME_ENV, "root"),
            (SEED_ADMIN_PASSWORD_ENV, "changeme"),
            (LOG_FORMAT_ENV, "json"),
        ])
        .unwrap();

        assert_eq!(settings.codec.ttl(), Duration::from_secs(60));
        assert_eq!(settings.lookup_timeout, Duration::from_millis(250));
        assert!(settings.rules.matching("/admin/x").is_none());
        assert_eq!(settings.public_paths, vec!["/auth/login", "/catalogue/"]);
        assert_eq!(
            settings.upstream_url.unwrap().as_str(),
            "http://identity:8081/"
        );
        assert_eq!(settings.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(settings.seed_admin.unwrap().username, "root");
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (var, value) in [
            (TOKEN_TTL_SECONDS_ENV, "0"),
            (TOKEN_TTL_SECONDS_ENV, "soon"),
            (PORT_ENV, "99999"),
            (UPSTREAM_URL_ENV, "ftp://files"),
            (AUTH_RULES_ENV, "/admin/"),
        ] {
            let result = load(&[(TOKEN_SIGNING_KEY_ENV, KEY_B64), (var, value)]);
            assert!(
                matches!(result, Err(ConfigError::Invalid { .. })),
                "{var}={value} was accepted"
            );
        }
    }

    #[test]
    fn half_configured_seed_admin_is_rejected() {
        let result = load(&[
            (TOKEN_SIGNING_KEY_ENV, KEY_B64),
            (SEED_ADMIN_USERNAME_ENV, "root"),
        ]);
        assert!(matches!(result, Err(ConfigError::Missing(SEED_ADMIN_PASSWORD_ENV))));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let settings = load(&[
            (TOKEN_SIGNING_KEY_ENV, KEY_B64),
            (SEED_ADMIN_USERNAME_ENV, "root"),
            (SEED_ADMIN_PASSWORD_ENV, "changeme"),
        ])
        .unwrap();
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("changeme"));
        assert!(!rendered.contains(KEY_B64));
    }
}
