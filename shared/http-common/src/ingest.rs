//! Bounded JSON request-body ingestion.
//!
//! Bodies are pulled chunk by chunk and abandoned as soon as the running total
//! crosses the cap, whatever `Content-Length` claimed. Only flat JSON objects
//! are accepted; field extraction is left to the caller.

use futures_util::{Stream, StreamExt};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::HeaderMap;
use serde_json::{Map, Value};
use tracing::debug;

use domain::ErrorKind;

/// Default body cap for JSON endpoints, in bytes.
pub const MAX_BODY_BYTES: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("content type must be application/json")]
    UnsupportedContentType,
    #[error("content-length header is invalid")]
    InvalidContentLength,
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("request body could not be read")]
    Unreadable,
    #[error("request body is not valid utf-8")]
    InvalidUtf8,
    #[error("request body is not valid json")]
    InvalidJson,
    #[error("request body must be a json object")]
    NotAnObject,
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::UnsupportedContentType | IngestError::InvalidContentLength => {
                ErrorKind::Format
            }
            IngestError::NotAnObject => ErrorKind::Type,
            IngestError::TooLarge { .. }
            | IngestError::Unreadable
            | IngestError::InvalidUtf8
            | IngestError::InvalidJson => ErrorKind::Resource,
        }
    }
}

/// A decoded request body and the number of bytes it occupied on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedBody {
    pub fields: Map<String, Value>,
    pub size: usize,
}

impl IngestedBody {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// True when the media type (parameters ignored) is `application/json`.
pub fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
}

/// Read and decode a JSON object body under a byte cap.
///
/// `content_length` is the declared length, if any; it is only used to fail
/// early. The stream is never polled again once the cap has been crossed.
pub async fn ingest_json_body<S, B, E>(
    content_type: Option<&str>,
    content_length: Option<u64>,
    mut body: S,
    cap: usize,
) -> Result<IngestedBody, IngestError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    if !content_type.is_some_and(is_json_content_type) {
        return Err(IngestError::UnsupportedContentType);
    }

    let too_large = IngestError::TooLarge { limit: cap };
    if let Some(declared) = content_length {
        if declared > cap as u64 {
            debug!(declared, cap, "declared body length over cap");
            return Err(too_large);
        }
    }

    let initial = content_length.map_or(0, |n| n as usize);
    let mut buf: Vec<u8> = Vec::with_capacity(initial);
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| {
            debug!(error = %e, "body read failed");
            IngestError::Unreadable
        })?;
        let bytes = chunk.as_ref();
        if buf.len() + bytes.len() > cap {
            debug!(read = buf.len() + bytes.len(), cap, "body over cap; aborting read");
            return Err(too_large);
        }
        buf.extend_from_slice(bytes);
    }

    let size = buf.len();
    let text = String::from_utf8(buf).map_err(|_| IngestError::InvalidUtf8)?;
    let value: Value = serde_json::from_str(&text).map_err(|e| {
        debug!(line = e.line(), column = e.column(), "body is not valid json");
        IngestError::InvalidJson
    })?;
    match value {
        Value::Object(fields) => Ok(IngestedBody { fields, size }),
        _ => Err(IngestError::NotAnObject),
    }
}

/// [`ingest_json_body`] with `Content-Type` and `Content-Length` taken from
/// request headers. A present but unparseable `Content-Length` is refused.
pub async fn ingest_request<S, B, E>(
    headers: &HeaderMap,
    body: S,
    cap: usize,
) -> Result<IngestedBody, IngestError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let content_length = match headers.get(CONTENT_LENGTH) {
        None => None,
        Some(v) => Some(
            v.to_str()
                .ok()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .ok_or(IngestError::InvalidContentLength)?,
        ),
    };
    ingest_json_body(content_type, content_length, body, cap).await
}
