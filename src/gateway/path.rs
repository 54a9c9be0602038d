// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request path canonicalisation.
//!
//! Rules and public paths are matched against the decoded path, and the
//! upstream URL builder resolves `.`/`..` segments. Paths that could resolve
//! to something other than what was matched are refused outright.

use percent_encoding::percent_decode_str;

/// Percent-decoded `raw`, or `None` if an upstream could read it as a
/// different resource.
///
/// Refused: dot segments (plain, `%2e`-encoded or carrying `;params`),
/// backslashes, empty segments and invalid UTF-8.
pub fn canonical_path(raw: &str) -> Option<String> {
    let decoded = percent_decode_str(raw).decode_utf8().ok()?;
    if !decoded.starts_with('/') || decoded.contains('\\') || decoded.contains("//") {
        return None;
    }
    let dotted = decoded.split('/').any(|segment| {
        let name = segment.split(';').next().unwrap_or(segment);
        name == "." || name == ".."
    });
    (!dotted).then(|| decoded.into_owned())
}
