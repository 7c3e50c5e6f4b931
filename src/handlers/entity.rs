//! Entity CRUD handlers: create, read, update, partial update, delete, list.
//!
//! Every handler resolves the entity from the `:resource` path segment, so one
//! set of handlers serves all collections.

use crate::config::EntitySchema;
use crate::error::{Alert, AlertKey, AppError};
use crate::extractors::ListFormat;
use crate::record::Record;
use crate::response::{self, AlertAction};
use crate::service::{CrudService, RequestValidator};
use crate::state::AppState;
use crate::store::Pageable;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", raw)))
}

fn decode_body(schema: &EntitySchema, body: Result<Json<Value>, JsonRejection>) -> Result<Record, AppError> {
    let Json(value) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    Record::from_json(schema, value)
}

fn alert(state: &AppState, schema: &EntitySchema, key: AlertKey) -> AppError {
    AppError::BadRequestAlert(Alert {
        app_name: state.app_name.to_string(),
        entity_name: schema.entity_name,
        key,
        message: key.message(&schema.display_name()),
    })
}

/// Identity rules shared by full and partial updates: the body must carry
/// the path id and the row must exist.
async fn check_identity(state: &AppState, service: &CrudService, path_id: i64, record: &Record) -> Result<(), AppError> {
    let schema = service.schema();
    let Some(body_id) = record.id else {
        return Err(alert(state, schema, AlertKey::IdNull));
    };
    if body_id != path_id {
        return Err(alert(state, schema, AlertKey::IdInvalid));
    }
    if !service.store().exists_by_id(path_id).await? {
        return Err(alert(state, schema, AlertKey::IdNotFound));
    }
    Ok(())
}

fn alert_headers(state: &AppState, schema: &EntitySchema, action: AlertAction, id: i64) -> HeaderMap {
    response::entity_alert_headers(&state.app_name, action, schema.entity_name, id)
}

pub async fn create(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let service = state.service(&resource)?;
    let schema = service.schema();
    let record = decode_body(schema, body)?;
    tracing::debug!(entity = schema.name, "REST request to save");
    RequestValidator::validate(&record, schema)?;
    if record.id.is_some() {
        return Err(alert(&state, schema, AlertKey::IdExists));
    }

    let saved = service.save(record).await?;
    let id = saved.id.ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
    Ok(response::created(
        &schema.location(id),
        alert_headers(&state, schema, AlertAction::Created, id),
        saved.to_json(schema),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let service = state.service(&resource)?;
    let schema = service.schema();
    let id = parse_id(&id)?;
    let record = decode_body(schema, body)?;
    tracing::debug!(entity = schema.name, id, "REST request to update");
    RequestValidator::validate(&record, schema)?;
    check_identity(&state, service, id, &record).await?;

    match service.update(record).await? {
        Some(updated) => Ok(response::ok(
            alert_headers(&state, schema, AlertAction::Updated, id),
            updated.to_json(schema),
        )),
        None => Err(AppError::NotFound(format!("{} {}", schema.display_name(), id))),
    }
}

/// Merge-patch: only non-null properties are applied; no required-field check.
pub async fn partial_update(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let service = state.service(&resource)?;
    let schema = service.schema();
    let id = parse_id(&id)?;
    let patch = decode_body(schema, body)?;
    tracing::debug!(entity = schema.name, id, "REST request to partially update");
    check_identity(&state, service, id, &patch).await?;

    match service.partial_update(patch).await? {
        Some(updated) => Ok(response::ok(
            alert_headers(&state, schema, AlertAction::Updated, id),
            updated.to_json(schema),
        )),
        None => Err(AppError::NotFound(format!("{} {}", schema.display_name(), id))),
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    format: ListFormat,
) -> Result<Response, AppError> {
    let service = state.service(&resource)?;
    let schema = service.schema();
    let pageable = Pageable::from_query(schema, &params)?;
    tracing::debug!(entity = schema.name, ?format, "REST request to get all");

    let records = service.find_all(pageable.as_ref()).await?;
    let headers = match &pageable {
        Some(p) if p.size.is_some() => response::total_count_header(service.count_all().await?),
        _ => HeaderMap::new(),
    };
    let docs: Vec<Value> = records.iter().map(|r| r.to_json(schema)).collect();
    Ok(match format {
        ListFormat::Json => response::ok(headers, Value::Array(docs)),
        ListFormat::Ndjson => response::ndjson(headers, docs),
    })
}

pub async fn read(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let service = state.service(&resource)?;
    let schema = service.schema();
    let id = parse_id(&id)?;
    tracing::debug!(entity = schema.name, id, "REST request to get");
    Ok(match service.find_one(id).await? {
        Some(record) => response::ok(HeaderMap::new(), record.to_json(schema)),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

/// Always 204, whether or not the row existed.
pub async fn delete(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let service = state.service(&resource)?;
    let schema = service.schema();
    let id = parse_id(&id)?;
    tracing::debug!(entity = schema.name, id, "REST request to delete");
    service.delete(id).await?;
    Ok((StatusCode::NO_CONTENT, alert_headers(&state, schema, AlertAction::Deleted, id)).into_response())
}
