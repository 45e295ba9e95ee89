//! Typed extraction of validated fields from an ingested JSON body.

use serde_json::Value;

use domain::{validate_assigned_slug, validate_lookup_slug, validate_url, Slug, SlugError, UrlError};

/// Validate a JSON value as a redirect target. Non-strings are a type error;
/// an absent field counts as empty.
pub fn validate_url_value(value: Option<&Value>) -> Result<String, UrlError> {
    match value {
        Some(Value::String(s)) => validate_url(s),
        Some(_) => Err(UrlError::NotAString),
        None => Err(UrlError::Empty),
    }
}

/// Validate an optional user-chosen slug. `None` and JSON `null` mean "generate one".
pub fn validate_assigned_slug_value(value: Option<&Value>) -> Result<Option<Slug>, SlugError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => validate_assigned_slug(s).map(Some),
        Some(_) => Err(SlugError::NotAString),
    }
}

/// Validate a slug supplied to a lookup or delete request; it must be present.
pub fn validate_lookup_slug_value(value: Option<&Value>) -> Result<Slug, SlugError> {
    match value {
        Some(Value::String(s)) => validate_lookup_slug(s),
        Some(_) => Err(SlugError::NotAString),
        None => Err(SlugError::TooShort {
            min: domain::slug::LOOKUP_MIN_LEN,
        }),
    }
}
