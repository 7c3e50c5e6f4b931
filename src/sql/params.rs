//! Typed bind values for PostgreSQL queries built from records.

use crate::config::FieldType;
use crate::record::FieldValue;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// A value bound to a placeholder. Nulls keep their column type so the
/// server does not have to infer it.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null(FieldType),
    Integer(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl PgBindValue {
    pub fn from_field(kind: FieldType, value: Option<&FieldValue>) -> Self {
        match value {
            None => PgBindValue::Null(kind),
            Some(FieldValue::Integer(n)) => PgBindValue::Integer(*n),
            Some(FieldValue::Text(s)) => PgBindValue::Text(s.clone()),
            Some(FieldValue::Timestamp(t)) => PgBindValue::Timestamp(*t),
        }
    }
}

/// Bind `params` in placeholder order.
pub fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[PgBindValue],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        query = match p {
            PgBindValue::Null(FieldType::Integer) => query.bind(None::<i64>),
            PgBindValue::Null(FieldType::Text) => query.bind(None::<String>),
            PgBindValue::Null(FieldType::Timestamp) => query.bind(None::<DateTime<Utc>>),
            PgBindValue::Integer(n) => query.bind(*n),
            PgBindValue::Text(s) => query.bind(s.clone()),
            PgBindValue::Timestamp(t) => query.bind(*t),
        };
    }
    query
}
