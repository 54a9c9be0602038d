// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path-scoped role rules for the edge.
//!
//! Rules are written as `prefix=ROLE[,ROLE];prefix=ROLE...`, for example
//! `/admin/=ADMIN;/user/=USER`. The longest matching prefix decides; when two
//! rules share a prefix the one configured first wins. Paths no rule matches
//! are allowed.

use std::str::FromStr;

use crate::auth::{AuthError, Role, UnknownRole};

/// One `{prefix, allowed roles}` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRule {
    pub path_prefix: String,
    pub allowed_roles: Vec<Role>,
}

impl AuthorizationRule {
    pub fn new(path_prefix: impl Into<String>, allowed_roles: impl Into<Vec<Role>>) -> Self {
        Self {
            path_prefix: path_prefix.into(),
            allowed_roles: allowed_roles.into(),
        }
    }

    /// Whether `role` satisfies this rule. Admin satisfies user rules.
    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles.iter().any(|&allowed| role.has_privilege(allowed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleParseError {
    #[error("rule `{0}` is missing `=`")]
    MissingSeparator(String),
    #[error("rule `{0}` has an empty path prefix")]
    EmptyPrefix(String),
    #[error("rule for `{0}` lists no roles")]
    NoRoles(String),
    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),
}

/// Ordered, immutable rule list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<AuthorizationRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<AuthorizationRule>) -> Self {
        Self { rules }
    }

    /// Parse the `AUTH_RULES` format. Blank input yields an empty set.
    pub fn parse(raw: &str) -> Result<Self, RuleParseError> {
        let mut rules = Vec::new();
        for entry in raw.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (prefix, roles) = entry
                .split_once('=')
                .ok_or_else(|| RuleParseError::MissingSeparator(entry.to_string()))?;
            let prefix = prefix.trim();
            if prefix.is_empty() {
                return Err(RuleParseError::EmptyPrefix(entry.to_string()));
            }
            let allowed_roles = roles
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(Role::from_str)
                .collect::<Result<Vec<_>, _>>()?;
            if allowed_roles.is_empty() {
                return Err(RuleParseError::NoRoles(prefix.to_string()));
            }
            rules.push(AuthorizationRule::new(prefix, allowed_roles));
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[AuthorizationRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Longest-prefix match; ties go to the earliest rule.
    pub fn matching(&self, path: &str) -> Option<&AuthorizationRule> {
        let mut best: Option<&AuthorizationRule> = None;
        for rule in &self.rules {
            if !path.starts_with(&rule.path_prefix) {
                continue;
            }
            if best.map_or(true, |b| rule.path_prefix.len() > b.path_prefix.len()) {
                best = Some(rule);
            }
        }
        best
    }

    /// Decide whether a caller holding the raw `role` claim may reach `path`.
    ///
    /// An unrecognised role is refused wherever a rule applies.
    pub fn authorize(&self, role: &str, path: &str) -> Result<(), AuthError> {
        let Some(rule) = self.matching(path) else {
            return Ok(());
        };
        match Role::from_str(role) {
            Ok(role) if rule.permits(role) => Ok(()),
            _ => Err(AuthError::InsufficientRole),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> RuleSet {
        RuleSet::parse("/admin/=ADMIN;/user/=USER").unwrap()
    }

    #[test]
    fn admin_paths_reject_users() {
        let rules = defaults();
        assert_eq!(
            rules.authorize("USER", "/admin/x"),
            Err(AuthError::InsufficientRole)
        );
        assert_eq!(rules.authorize("ADMIN", "/admin/x"), Ok(()));
    }

    #[test]
    fn admin_satisfies_user_rules() {
        let rules = defaults();
        assert_eq!(rules.authorize("USER", "/user/library"), Ok(()));
        assert_eq!(rules.authorize("ADMIN", "/user/library"), Ok(()));
    }

    #[test]
    fn role_comparison_ignores_case() {
        let rules = defaults();
        assert_eq!(rules.authorize("admin", "/admin/x"), Ok(()));
        assert_eq!(rules.authorize("User", "/user/x"), Ok(()));
    }

    #[test]
    fn unlisted_paths_are_allowed() {
        let rules = defaults();
        assert_eq!(rules.authorize("USER", "/catalogue/42"), Ok(()));
        assert_eq!(rules.authorize("LIBRARIAN", "/catalogue/42"), Ok(()));
    }

    #[test]
    fn unknown_role_is_refused_under_a_rule() {
        assert_eq!(
            defaults().authorize("LIBRARIAN", "/user/x"),
            Err(AuthError::InsufficientRole)
        );
    }

    #[test]
    fn longest_prefix_wins() {
        let rules = RuleSet::parse("/admin/=ADMIN;/admin/public/=USER").unwrap();
        assert_eq!(rules.authorize("USER", "/admin/public/news"), Ok(()));
        assert_eq!(
            rules.authorize("USER", "/admin/private"),
            Err(AuthError::InsufficientRole)
        );
    }

    #[test]
    fn first_rule_wins_on_equal_prefix() {
        let rules = RuleSet::parse("/shared/=ADMIN;/shared/=USER").unwrap();
        let rule = rules.matching("/shared/a").unwrap();
        assert_eq!(rule.allowed_roles, vec![Role::Admin]);
    }

    #[test]
    fn multi_role_rule() {
        let rules = RuleSet::parse("/reports/=USER,ADMIN").unwrap();
        assert_eq!(
            rules.rules()[0],
            AuthorizationRule::new("/reports/", vec![Role::User, Role::Admin])
        );
        assert_eq!(rules.authorize("USER", "/reports/daily"), Ok(()));
    }

    #[test]
    fn parse_tolerates_whitespace_and_blanks() {
        let rules = RuleSet::parse(" /admin/ = ADMIN ; ; ").unwrap();
        assert_eq!(rules.rules().len(), 1);
        assert_eq!(rules.rules()[0].path_prefix, "/admin/");
        assert!(RuleSet::parse("").unwrap().is_empty());
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            RuleSet::parse("/admin/"),
            Err(RuleParseError::MissingSeparator("/admin/".into()))
        );
        assert_eq!(
            RuleSet::parse("=ADMIN"),
            Err(RuleParseError::EmptyPrefix("=ADMIN".into()))
        );
        assert_eq!(
            RuleSet::parse("/admin/="),
            Err(RuleParseError::NoRoles("/admin/".into()))
        );
        assert!(matches!(
            RuleSet::parse("/admin/=ROOT"),
            Err(RuleParseError::UnknownRole(_))
        ));
    }
}
