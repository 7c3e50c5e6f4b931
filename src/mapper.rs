//! Row to record conversion driven by the entity descriptor.
//!
//! Every declared column is read as `{prefix}_{column}` (the aliases produced by
//! the SQL builder) and coerced to the field's semantic type.

use crate::config::{EntitySchema, FieldType};
use crate::error::MappingError;
use crate::record::{epoch_seconds, parse_timestamp, FieldValue, Record};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;

/// Column alias used for `column` under `prefix`.
pub fn alias(prefix: &str, column: &str) -> String {
    format!("{}_{}", prefix, column)
}

/// Typed, nullable access to the columns of one raw row.
pub trait RowSource {
    fn integer(&self, column: &str) -> Result<Option<i64>, MappingError>;
    fn text(&self, column: &str) -> Result<Option<String>, MappingError>;
    fn timestamp(&self, column: &str) -> Result<Option<DateTime<Utc>>, MappingError>;
}

pub fn map_row<R>(schema: &EntitySchema, row: &R, prefix: &str) -> Result<Record, MappingError>
where
    R: RowSource + ?Sized,
{
    let mut record = Record::new();
    record.id = row.integer(&alias(prefix, schema.id_column))?;
    for field in schema.fields {
        let column = alias(prefix, field.column);
        let value = match field.kind {
            FieldType::Integer => row.integer(&column)?.map(FieldValue::Integer),
            FieldType::Text => row.text(&column)?.map(FieldValue::Text),
            FieldType::Timestamp => row.timestamp(&column)?.map(FieldValue::Timestamp),
        };
        record.set(field.column, value);
    }
    Ok(record)
}

fn decode_error(column: &str, expected: &'static str, err: sqlx::Error) -> MappingError {
    match err {
        sqlx::Error::ColumnNotFound(_) => MappingError::MissingColumn(column.to_string()),
        _ => MappingError::IncompatibleType {
            column: column.to_string(),
            expected,
        },
    }
}

impl RowSource for PgRow {
    fn integer(&self, column: &str) -> Result<Option<i64>, MappingError> {
        match self.try_get::<Option<i64>, _>(column) {
            Ok(v) => Ok(v),
            Err(sqlx::Error::ColumnNotFound(_)) => Err(MappingError::MissingColumn(column.to_string())),
            Err(_) => self
                .try_get::<Option<i32>, _>(column)
                .map(|v| v.map(i64::from))
                .map_err(|e| decode_error(column, "integer", e)),
        }
    }

    fn text(&self, column: &str) -> Result<Option<String>, MappingError> {
        self.try_get::<Option<String>, _>(column)
            .map_err(|e| decode_error(column, "text", e))
    }

    fn timestamp(&self, column: &str) -> Result<Option<DateTime<Utc>>, MappingError> {
        if let Ok(v) = self.try_get::<Option<DateTime<Utc>>, _>(column) {
            return Ok(v);
        }
        if let Ok(v) = self.try_get::<Option<NaiveDateTime>, _>(column) {
            return Ok(v.map(|naive| naive.and_utc()));
        }
        if let Ok(v) = self.try_get::<Option<i64>, _>(column) {
            return match v {
                None => Ok(None),
                Some(secs) => epoch_seconds(secs as f64).map(Some).ok_or_else(|| incompatible(column)),
            };
        }
        match self.try_get::<Option<String>, _>(column) {
            Ok(None) => Ok(None),
            Ok(Some(s)) => parse_timestamp(&s).map(Some).ok_or_else(|| incompatible(column)),
            Err(e) => Err(decode_error(column, "timestamp", e)),
        }
    }
}

fn incompatible(column: &str) -> MappingError {
    MappingError::IncompatibleType {
        column: column.to_string(),
        expected: "timestamp",
    }
}
