//! Shared-secret bearer authentication for admin routes.
//!
//! The presented token and the configured secret are never logged, echoed or
//! folded into error messages; a failed check is a bare `false`.

use std::fmt;

use http::header::AUTHORIZATION;
use http::HeaderMap;
use tracing::debug;

/// Secrets shorter than this are treated as unconfigured.
pub const MIN_SECRET_LEN: usize = 16;

/// Configured admin secret. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminSecret(String);

impl AdminSecret {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// Long enough to be compared against at all.
    pub fn is_usable(&self) -> bool {
        self.0.chars().count() >= MIN_SECRET_LEN
    }

    fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminSecret(***)")
    }
}

/// Compare `presented` against `reference` without leaking where they differ.
///
/// Always walks every byte of `presented`, reading `reference` cyclically so
/// a length mismatch never cuts the loop short. The length check is folded in
/// with non-short-circuiting `&`.
pub fn constant_time_eq(presented: &str, reference: &str) -> bool {
    let a = presented.as_bytes();
    let b = reference.as_bytes();
    let same_len = a.len() == b.len();

    let mut diff: u8 = 0;
    for (i, &x) in a.iter().enumerate() {
        let y = if b.is_empty() { 0 } else { b[i % b.len()] };
        diff |= x ^ y;
    }
    let diff = std::hint::black_box(diff);

    same_len & (diff == 0)
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme name is matched case-insensitively; any other scheme, a missing
/// or non-UTF-8 header, or an empty token yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Check a request's bearer token against the configured admin secret.
///
/// Fails closed when no usable secret is configured, without running the
/// comparison.
pub fn check_bearer_auth(headers: &HeaderMap, secret: Option<&AdminSecret>) -> bool {
    let Some(secret) = secret.filter(|s| s.is_usable()) else {
        debug!("admin secret missing or too short; denying");
        return false;
    };
    let Some(token) = bearer_token(headers) else {
        debug!("no bearer credential presented");
        return false;
    };
    constant_time_eq(token, secret.expose())
}
