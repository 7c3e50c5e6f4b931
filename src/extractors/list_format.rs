//! Pick the list representation from the `Accept` header.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

const NDJSON_MEDIA_TYPES: [&str; 2] = ["application/x-ndjson", "application/ndjson"];

/// JSON array unless the client asks for newline-delimited JSON.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListFormat {
    Json,
    Ndjson,
}

impl ListFormat {
    pub fn from_accept(accept: Option<&str>) -> Self {
        let wants_ndjson = accept
            .map(|value| {
                value
                    .split(',')
                    .filter_map(|part| part.split(';').next())
                    .map(str::trim)
                    .any(|media| NDJSON_MEDIA_TYPES.iter().any(|t| media.eq_ignore_ascii_case(t)))
            })
            .unwrap_or(false);
        if wants_ndjson {
            ListFormat::Ndjson
        } else {
            ListFormat::Json
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ListFormat
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok());
        Ok(ListFormat::from_accept(accept))
    }
}
