//! Response shaping helpers: entity alert headers, created/ok responses, NDJSON bodies.

use crate::error::AlertKey;
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::convert::Infallible;

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Entity lifecycle events announced through the `X-{app}-alert` header.
#[derive(Clone, Copy, Debug)]
pub enum AlertAction {
    Created,
    Updated,
    Deleted,
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) {
    match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
        (Ok(name), Ok(value)) => {
            headers.insert(name, value);
        }
        _ => tracing::warn!(header = %name, "skipping header that is not representable"),
    }
}

fn alert_headers(app_name: &str, message: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, &format!("X-{}-alert", app_name), message);
    insert_header(&mut headers, &format!("X-{}-params", app_name), param);
    headers
}

pub fn entity_alert_headers(app_name: &str, action: AlertAction, entity_name: &str, id: i64) -> HeaderMap {
    let message = match action {
        AlertAction::Created => format!("A new {} is created with identifier {}", entity_name, id),
        AlertAction::Updated => format!("A {} is updated with identifier {}", entity_name, id),
        AlertAction::Deleted => format!("A {} is deleted with identifier {}", entity_name, id),
    };
    alert_headers(app_name, &message, &id.to_string())
}

pub fn failure_alert_headers(app_name: &str, entity_name: &str, key: AlertKey) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, &format!("X-{}-error", app_name), &format!("error.{}", key));
    insert_header(&mut headers, &format!("X-{}-params", app_name), entity_name);
    headers
}

/// 201 with `Location` and the persisted body.
pub fn created(location: &str, headers: HeaderMap, body: Value) -> Response {
    let mut res = (StatusCode::CREATED, headers, Json(body)).into_response();
    match HeaderValue::from_str(location) {
        Ok(v) => {
            res.headers_mut().insert(header::LOCATION, v);
        }
        Err(_) => tracing::warn!(location, "location is not a valid header value"),
    }
    res
}

pub fn ok(headers: HeaderMap, body: Value) -> Response {
    (StatusCode::OK, headers, Json(body)).into_response()
}

/// Streams every document as one serialized JSON line.
pub fn ndjson(headers: HeaderMap, docs: Vec<Value>) -> Response {
    let lines = docs.into_iter().map(|doc| Ok::<_, Infallible>(format!("{}\n", doc)));
    let body = Body::from_stream(futures::stream::iter(lines));
    let mut res = (StatusCode::OK, headers, body).into_response();
    res.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(NDJSON_CONTENT_TYPE));
    res
}

pub fn total_count_header(total: u64) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, TOTAL_COUNT_HEADER, &total.to_string());
    headers
}
