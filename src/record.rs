//! Generic entity record: optional identity plus typed values keyed by column.

use crate::config::{EntitySchema, FieldType};
use crate::error::{AppError, FieldViolation};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A JSON value that cannot be coerced to the declared field type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeMismatch;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldType {
        match self {
            FieldValue::Integer(_) => FieldType::Integer,
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Timestamp(_) => FieldType::Timestamp,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Integer(n) => Value::from(*n),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Timestamp(t) => Value::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }

    /// Coerce a JSON value to `kind`. `Ok(None)` for JSON null.
    ///
    /// Timestamps accept RFC 3339 strings with any offset or numeric epoch seconds.
    pub fn from_json(kind: FieldType, value: &Value) -> Result<Option<Self>, TypeMismatch> {
        if value.is_null() {
            return Ok(None);
        }
        let coerced = match kind {
            FieldType::Integer => value.as_i64().map(FieldValue::Integer),
            FieldType::Text => value.as_str().map(|s| FieldValue::Text(s.to_string())),
            FieldType::Timestamp => match value {
                Value::String(s) => parse_timestamp(s).map(FieldValue::Timestamp),
                Value::Number(n) => n.as_f64().and_then(epoch_seconds).map(FieldValue::Timestamp),
                _ => None,
            },
        };
        coerced.map(Some).ok_or(TypeMismatch)
    }
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim()).ok().map(|t| t.with_timezone(&Utc))
}

pub fn epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round() as u32;
    Utc.timestamp_opt(whole as i64, nanos.min(999_999_999)).single()
}

/// One entity instance. Values absent from `values` are null.
#[derive(Clone, Debug, Default)]
pub struct Record {
    pub id: Option<i64>,
    values: BTreeMap<&'static str, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    pub fn with_id(id: i64) -> Self {
        Record {
            id: Some(id),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.values.get(column)
    }

    pub fn set(&mut self, column: &'static str, value: Option<FieldValue>) {
        match value {
            Some(v) => {
                self.values.insert(column, v);
            }
            None => {
                self.values.remove(column);
            }
        }
    }

    /// Builder form of [`Record::set`] for a non-null value.
    pub fn value(mut self, column: &'static str, value: FieldValue) -> Self {
        self.values.insert(column, value);
        self
    }

    /// Overwrite every value that is non-null in `patch`; everything else is kept.
    pub fn merge_from(&mut self, patch: &Record) {
        for (column, value) in &patch.values {
            self.values.insert(*column, value.clone());
        }
    }

    /// Decode a JSON object against the schema. Unknown properties are ignored;
    /// values of the wrong type are reported per field.
    pub fn from_json(schema: &EntitySchema, body: Value) -> Result<Self, AppError> {
        let Value::Object(map) = body else {
            return Err(AppError::BadRequest("body must be a JSON object".into()));
        };
        let mut violations = Vec::new();
        let mut record = Record::new();

        match map.get(schema.id_column) {
            None | Some(Value::Null) => {}
            Some(v) => match v.as_i64() {
                Some(id) => record.id = Some(id),
                None => violations.push(FieldViolation {
                    field: schema.id_column.to_string(),
                    message: "must be an integer".into(),
                }),
            },
        }

        for field in schema.fields {
            let name = field.json_name();
            let Some(raw) = map.get(&name) else { continue };
            match FieldValue::from_json(field.kind, raw) {
                Ok(value) => {
                    if let (Some(FieldValue::Text(s)), Some(max)) = (&value, field.kind.max_length()) {
                        if s.chars().count() > max {
                            violations.push(FieldViolation {
                                field: name,
                                message: format!("size must be between 0 and {}", max),
                            });
                            continue;
                        }
                    }
                    record.set(field.column, value)
                }
                Err(TypeMismatch) => violations.push(FieldViolation {
                    field: name,
                    message: format!("must be {}", field.kind.describe()),
                }),
            }
        }

        if violations.is_empty() {
            Ok(record)
        } else {
            Err(AppError::Validation(violations))
        }
    }

    /// Encode with every declared field present, nulls included.
    pub fn to_json(&self, schema: &EntitySchema) -> Value {
        let mut map = Map::new();
        map.insert(schema.id_column.to_string(), self.id.map(Value::from).unwrap_or(Value::Null));
        for field in schema.fields {
            let value = self.get(field.column).map(FieldValue::to_json).unwrap_or(Value::Null);
            map.insert(field.json_name(), value);
        }
        Value::Object(map)
    }
}

/// Identity equality: both identities set and equal, otherwise the same instance.
pub fn same_identity(a: &Record, b: &Record) -> bool {
    match (a.id, b.id) {
        (Some(x), Some(y)) => x == y,
        _ => std::ptr::eq(a, b),
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        same_identity(self, other)
    }
}
