//! PostgreSQL-backed store: one instance per entity table.

use super::{EntityStore, Pageable};
use crate::config::EntitySchema;
use crate::error::{AppError, StorageError};
use crate::mapper::map_row;
use crate::record::Record;
use crate::sql::{self, bind_all, QueryBuf, ENTITY_ALIAS};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    db_schema: String,
    entity: &'static EntitySchema,
}

impl PgStore {
    pub fn new(pool: PgPool, db_schema: impl Into<String>, entity: &'static EntitySchema) -> Self {
        PgStore {
            pool,
            db_schema: db_schema.into(),
            entity,
        }
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<PgRow>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn fetch_one(&self, q: &QueryBuf) -> Result<PgRow, AppError> {
        self.fetch_optional(q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    fn decode(&self, row: &PgRow) -> Result<Record, AppError> {
        Ok(map_row(self.entity, row, ENTITY_ALIAS)?)
    }
}

#[async_trait]
impl EntityStore for PgStore {
    fn schema(&self) -> &'static EntitySchema {
        self.entity
    }

    async fn find_all(&self, pageable: Option<&Pageable>) -> Result<Vec<Record>, AppError> {
        let q = sql::select_list(self.entity, &self.db_schema, pageable);
        tracing::debug!(sql = %q.sql, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|row| self.decode(row)).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Record>, AppError> {
        let q = sql::select_by_id(self.entity, &self.db_schema, id);
        self.fetch_optional(&q)
            .await?
            .map(|row| self.decode(&row))
            .transpose()
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError> {
        let q = sql::exists_by_id(self.entity, &self.db_schema, id);
        let row = self.fetch_one(&q).await?;
        Ok(row.try_get::<bool, _>(0)?)
    }

    async fn save(&self, record: Record) -> Result<Record, AppError> {
        match record.id {
            None => {
                let q = sql::insert(self.entity, &self.db_schema, &record);
                let row = self.fetch_one(&q).await?;
                self.decode(&row)
            }
            Some(id) => {
                let q = sql::update(self.entity, &self.db_schema, id, &record);
                match self.fetch_optional(&q).await? {
                    Some(row) => self.decode(&row),
                    None => Err(StorageError::StaleRow {
                        table: self.entity.table,
                        id,
                    }
                    .into()),
                }
            }
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        let q = sql::delete(self.entity, &self.db_schema, id);
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let done = bind_all(sqlx::query(&q.sql), &q.params)
            .execute(&self.pool)
            .await?;
        tracing::debug!(table = self.entity.table, id, rows = done.rows_affected(), "deleted");
        Ok(())
    }

    async fn count(&self) -> Result<u64, AppError> {
        let q = sql::count(self.entity, &self.db_schema);
        let row = self.fetch_one(&q).await?;
        let n: i64 = row.try_get(0)?;
        Ok(u64::try_from(n).unwrap_or(0))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
