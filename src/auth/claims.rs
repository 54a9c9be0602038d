// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the per-request security context.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{roles::Role, AuthError};

/// Signed payload of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - the username
    pub sub: String,

    /// Role name as issued (`USER` / `ADMIN`)
    pub role: String,

    /// Issued at (seconds since epoch)
    pub iat: i64,

    /// Expiration (seconds since epoch)
    pub exp: i64,
}

/// Claims that survived verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub subject: String,
    pub role: String,
}

impl From<TokenClaims> for VerifiedClaims {
    fn from(claims: TokenClaims) -> Self {
        Self {
            subject: claims.sub,
            role: claims.role,
        }
    }
}

/// Verified identity of the caller for the current request.
///
/// Built by the service filter from its own token verification and stored in
/// the request's extensions. It is never derived from `X-Username`/`X-Role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SecurityContext {
    /// Username (token subject)
    pub username: String,

    /// Caller's role
    pub role: Role,
}

impl SecurityContext {
    /// Create from verified claims.
    ///
    /// A role that is neither `USER` nor `ADMIN` was not issued by us and is
    /// rejected as malformed.
    pub fn from_claims(claims: VerifiedClaims) -> Result<Self, AuthError> {
        let role = claims.role.parse::<Role>().map_err(|_| AuthError::Malformed)?;
        Ok(Self {
            username: claims.subject,
            role,
        })
    }

    /// Check if the caller has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    /// Check if the caller is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verified(role: &str) -> VerifiedClaims {
        VerifiedClaims {
            subject: "alice".to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn from_claims_extracts_username_and_role() {
        let ctx = SecurityContext::from_claims(verified("ADMIN")).unwrap();
        assert_eq!(ctx.username, "alice");
        assert_eq!(ctx.role, Role::Admin);
        assert!(ctx.is_admin());
    }

    #[test]
    fn from_claims_accepts_any_case() {
        let ctx = SecurityContext::from_claims(verified("user")).unwrap();
        assert_eq!(ctx.role, Role::User);
    }

    #[test]
    fn from_claims_rejects_unknown_role() {
        let result = SecurityContext::from_claims(verified("SUPERUSER"));
        assert_eq!(result, Err(AuthError::Malformed));
    }

    #[test]
    fn has_role_checks_privilege() {
        let admin = SecurityContext::from_claims(verified("ADMIN")).unwrap();
        let user = SecurityContext::from_claims(verified("USER")).unwrap();
        assert!(admin.has_role(Role::User));
        assert!(!user.has_role(Role::Admin));
    }
}
