//! Domain library for the URL Shortener.
//!
//! Holds the input-validation layer that every shorten, lookup and admin
//! handler runs before touching the key-value store: text sanitizing, SSRF
//! address classification, URL canonicalization and slug policy. Everything
//! here is a pure function of its input; keep IO concerns out of this crate.

use serde::Serialize;

pub mod address;
pub mod base36;
pub mod sanitize;
pub mod slug;
pub mod validate;

pub use slug::{validate_assigned_slug, validate_lookup_slug};
pub use validate::validate_url;

/// A URL-safe slug identifying a short link.
///
/// Only produced by the slug policies in [`slug`], so holding one means the
/// value has already been sanitized and checked.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub(crate) fn from_validated(s: String) -> Self {
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure classes shared by every validator in the workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input is not the expected shape (e.g. a JSON number where a string was expected).
    Type,
    /// Length, charset or pattern rule failed.
    Format,
    /// Well-formed value rejected by a domain rule.
    Policy,
    /// Body too large, unreadable or undecodable.
    Resource,
    /// Missing or mismatched credential.
    Authorization,
}

/// Reasons a candidate redirect target is refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    #[error("url must be a string")]
    NotAString,
    #[error("url is required")]
    Empty,
    #[error("url must be at most {} characters", validate::MAX_URL_LEN)]
    TooLong,
    #[error("url must start with http:// or https://")]
    MissingScheme,
    #[error("only http and https urls are allowed")]
    SchemeNotAllowed,
    #[error("url could not be parsed")]
    Unparseable,
    #[error("urls with embedded credentials are not allowed")]
    EmbeddedCredentials,
    #[error("url must include a host")]
    MissingHost,
    #[error("url host must be a fully qualified domain name")]
    SingleLabelHost,
    #[error("url points to a private, local or reserved address")]
    BlockedAddress,
}

impl UrlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UrlError::NotAString => ErrorKind::Type,
            UrlError::Empty
            | UrlError::TooLong
            | UrlError::MissingScheme
            | UrlError::Unparseable
            | UrlError::MissingHost
            | UrlError::SingleLabelHost => ErrorKind::Format,
            UrlError::SchemeNotAllowed
            | UrlError::EmbeddedCredentials
            | UrlError::BlockedAddress => ErrorKind::Policy,
        }
    }
}

/// Reasons a slug is refused by either slug policy.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SlugError {
    #[error("slug must be a string")]
    NotAString,
    #[error("slug must be at least {min} characters")]
    TooShort { min: usize },
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug may only contain lowercase letters, digits, hyphens and underscores")]
    InvalidCharacters,
    #[error("slug must not contain path separators or '..'")]
    Traversal,
    #[error("slug is reserved")]
    Reserved,
}

impl SlugError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SlugError::NotAString => ErrorKind::Type,
            SlugError::TooShort { .. }
            | SlugError::TooLong { .. }
            | SlugError::InvalidCharacters => ErrorKind::Format,
            SlugError::Traversal | SlugError::Reserved => ErrorKind::Policy,
        }
    }
}

/// Core domain errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] UrlError),
    #[error("invalid slug: {0}")]
    InvalidSlug(#[from] SlugError),
    #[error("failed to generate unique slug")]
    SlugSpaceExhausted,
    #[error("repository error: {0}")]
    Repository(String),
}

impl CoreError {
    /// Classification for the validation failures; `None` for server-side faults.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CoreError::InvalidUrl(e) => Some(e.kind()),
            CoreError::InvalidSlug(e) => Some(e.kind()),
            CoreError::SlugSpaceExhausted | CoreError::Repository(_) => None,
        }
    }
}

/// Return a short about/version line for binaries to print.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{} - link validation core", pkg, ver)
}
