//! Slug policies and generation.
//!
//! Two policies with deliberately different strictness:
//! - [`validate_assigned_slug`] governs anything about to be *stored*, whether
//!   user-chosen or generated. It refuses route names and other reserved words.
//! - [`validate_lookup_slug`] governs slugs arriving in read/delete requests.
//!   It accepts any key that could legally have been stored, including under
//!   older, looser rules, and never consults the reserved set.

use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::base36::encode_padded;
use crate::sanitize::sanitize;
use crate::{CoreError, Slug, SlugError};

pub const ASSIGNED_MIN_LEN: usize = 2;
pub const ASSIGNED_MAX_LEN: usize = 32;
pub const LOOKUP_MIN_LEN: usize = 1;
pub const LOOKUP_MAX_LEN: usize = 64;

/// Upper bound on candidates tried by [`generate_unique_slug`].
pub const MAX_GENERATION_ATTEMPTS: usize = 100;

/// Words that can never be assigned as a slug: routes, framework files,
/// auth-flow words and dotfiles.
///
/// Entries containing `.` fail the slug pattern before this table is
/// consulted; they only surface through [`is_reserved`].
pub const RESERVED_SLUGS: &[&str] = &[
    // routes
    "about",
    "admin",
    "api",
    "app",
    "assets",
    "delete",
    "docs",
    "health",
    "healthz",
    "help",
    "links",
    "list",
    "lookup",
    "metrics",
    "new",
    "qr",
    "ready",
    "shorten",
    "static",
    "stats",
    "status",
    // framework files
    "apple-touch-icon.png",
    "favicon.ico",
    "humans.txt",
    "index",
    "index.html",
    "manifest.json",
    "robots.txt",
    "security.txt",
    "sitemap.xml",
    "sw.js",
    // auth flow
    "auth",
    "callback",
    "login",
    "logout",
    "oauth",
    "register",
    "signin",
    "signout",
    "signup",
    "token",
    // dotfiles
    ".env",
    ".git",
    ".htaccess",
    ".well-known",
];

/// True if `s` is in [`RESERVED_SLUGS`].
pub fn is_reserved(s: &str) -> bool {
    RESERVED_SLUGS.contains(&s)
}

fn contains_traversal(s: &str) -> bool {
    s.contains("..") || s.contains('/') || s.contains('\\')
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
}

/// Validate a slug that is about to be assigned to a new link.
///
/// Sanitize, trim, lowercase, NFKC; then 2-32 characters of `[a-z0-9_-]`
/// starting with a letter or digit, no path-like content, not reserved.
pub fn validate_assigned_slug(raw: &str) -> Result<Slug, SlugError> {
    let candidate: String = sanitize(raw).trim().to_lowercase().nfkc().collect();
    check_assigned(&candidate)
        .map(|()| Slug::from_validated(candidate))
        .inspect_err(|e| debug!(reason = %e, "assigned slug rejected"))
}

fn check_assigned(s: &str) -> Result<(), SlugError> {
    let len = s.chars().count();
    if len < ASSIGNED_MIN_LEN {
        return Err(SlugError::TooShort {
            min: ASSIGNED_MIN_LEN,
        });
    }
    if len > ASSIGNED_MAX_LEN {
        return Err(SlugError::TooLong {
            max: ASSIGNED_MAX_LEN,
        });
    }
    if contains_traversal(s) {
        return Err(SlugError::Traversal);
    }
    let mut chars = s.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if !first_ok || !chars.all(is_slug_char) {
        return Err(SlugError::InvalidCharacters);
    }
    if is_reserved(s) {
        return Err(SlugError::Reserved);
    }
    Ok(())
}

/// Validate a slug used to look up, redirect or delete an existing link.
///
/// Sanitize, trim, lowercase (no NFKC); then 1-64 characters of `[a-z0-9_-]`
/// with no `..`.
pub fn validate_lookup_slug(raw: &str) -> Result<Slug, SlugError> {
    let candidate = sanitize(raw).trim().to_lowercase();
    check_lookup(&candidate)
        .map(|()| Slug::from_validated(candidate))
        .inspect_err(|e| debug!(reason = %e, "lookup slug rejected"))
}

fn check_lookup(s: &str) -> Result<(), SlugError> {
    let len = s.chars().count();
    if len < LOOKUP_MIN_LEN {
        return Err(SlugError::TooShort {
            min: LOOKUP_MIN_LEN,
        });
    }
    if len > LOOKUP_MAX_LEN {
        return Err(SlugError::TooLong {
            max: LOOKUP_MAX_LEN,
        });
    }
    if s.contains("..") {
        return Err(SlugError::Traversal);
    }
    if !s.chars().all(is_slug_char) {
        return Err(SlugError::InvalidCharacters);
    }
    Ok(())
}

/// Slug generator interface; deterministic by input id in some strategies.
pub trait SlugGenerator: Send + Sync {
    /// Produce a raw candidate for `next_id`. Candidates still go through
    /// [`validate_assigned_slug`] before use.
    fn next_code(&self, next_id: u64) -> String;
}

/// Base36 counter encoder. Deterministic w.r.t. `next_id`; left-pads with
/// '0' to `min_width`.
#[derive(Clone, Copy, Debug)]
pub struct Base36SlugGenerator {
    min_width: usize,
}

impl Base36SlugGenerator {
    pub fn new(min_width: usize) -> Self {
        Self { min_width }
    }
}

impl SlugGenerator for Base36SlugGenerator {
    fn next_code(&self, next_id: u64) -> String {
        encode_padded(next_id, self.min_width)
    }
}

/// Draw candidates until one passes the assignment policy and `taken`
/// reports it free.
///
/// `next_id` supplies fresh ids (a store counter, usually); `taken` is the
/// caller's collision check against the key-value store. Store errors from
/// `taken` are returned as-is.
pub fn generate_unique_slug<G, I, F>(
    generator: &G,
    mut next_id: I,
    mut taken: F,
) -> Result<Slug, CoreError>
where
    G: SlugGenerator + ?Sized,
    I: FnMut() -> Result<u64, CoreError>,
    F: FnMut(&Slug) -> Result<bool, CoreError>,
{
    for _ in 0..MAX_GENERATION_ATTEMPTS {
        let code = generator.next_code(next_id()?);
        let Ok(slug) = validate_assigned_slug(&code) else {
            continue;
        };
        if !taken(&slug)? {
            return Ok(slug);
        }
        debug!("generated slug collided, retrying");
    }
    Err(CoreError::SlugSpaceExhausted)
}
