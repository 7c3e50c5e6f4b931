//! Generic CRUD orchestration over one entity store.

use crate::config::EntitySchema;
use crate::error::{AppError, StorageError};
use crate::record::Record;
use crate::store::{EntityStore, Pageable};
use std::sync::Arc;

#[derive(Clone)]
pub struct CrudService {
    store: Arc<dyn EntityStore>,
}

impl CrudService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        CrudService { store }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.store.schema()
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Insert when the record has no identity, update otherwise.
    pub async fn save(&self, record: Record) -> Result<Record, AppError> {
        tracing::debug!(entity = self.schema().name, id = ?record.id, "save");
        self.store.save(record).await
    }

    /// Full replace. `None` when the row vanished after the caller checked it.
    pub async fn update(&self, record: Record) -> Result<Option<Record>, AppError> {
        tracing::debug!(entity = self.schema().name, id = ?record.id, "update");
        stale_as_none(self.store.save(record).await)
    }

    /// Overwrite the stored row's fields with every non-null value of `patch`.
    pub async fn partial_update(&self, patch: Record) -> Result<Option<Record>, AppError> {
        tracing::debug!(entity = self.schema().name, id = ?patch.id, "partial update");
        let Some(id) = patch.id else {
            return Ok(None);
        };
        let Some(mut existing) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };
        existing.merge_from(&patch);
        stale_as_none(self.store.save(existing).await)
    }

    pub async fn find_all(&self, pageable: Option<&Pageable>) -> Result<Vec<Record>, AppError> {
        tracing::debug!(entity = self.schema().name, ?pageable, "find all");
        self.store.find_all(pageable).await
    }

    pub async fn find_one(&self, id: i64) -> Result<Option<Record>, AppError> {
        tracing::debug!(entity = self.schema().name, id, "find one");
        self.store.find_by_id(id).await
    }

    pub async fn count_all(&self) -> Result<u64, AppError> {
        self.store.count().await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        tracing::debug!(entity = self.schema().name, id, "delete");
        self.store.delete_by_id(id).await
    }
}

fn stale_as_none(result: Result<Record, AppError>) -> Result<Option<Record>, AppError> {
    match result {
        Ok(record) => Ok(Some(record)),
        Err(AppError::Storage(StorageError::StaleRow { table, id })) => {
            tracing::debug!(table, id, "row disappeared before write");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ROLE_AUTHORITY, SCHEDULE};
    use crate::record::FieldValue;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    fn service(schema: &'static EntitySchema) -> CrudService {
        CrudService::new(Arc::new(MemoryStore::new(schema)))
    }

    #[tokio::test]
    async fn partial_update_merges_non_null_values() {
        let service = service(&ROLE_AUTHORITY);
        let saved = service
            .save(
                Record::new()
                    .value("user_id", FieldValue::Integer(1))
                    .value("role_id", FieldValue::Integer(1)),
            )
            .await
            .unwrap();

        let patch = Record::with_id(saved.id.unwrap()).value("user_id", FieldValue::Integer(2));
        let merged = service.partial_update(patch).await.unwrap().unwrap();
        assert_eq!(merged.get("user_id"), Some(&FieldValue::Integer(2)));
        assert_eq!(merged.get("role_id"), Some(&FieldValue::Integer(1)));

        let stored = service.find_one(saved.id.unwrap()).await.unwrap().unwrap();
        assert_eq!(stored.get("user_id"), Some(&FieldValue::Integer(2)));
    }

    #[tokio::test]
    async fn partial_update_of_missing_row_is_none() {
        let service = service(&SCHEDULE);
        let patch = Record::with_id(9).value("hours", FieldValue::Integer(4));
        assert!(service.partial_update(patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_of_vanished_row_is_none() {
        let service = service(&ROLE_AUTHORITY);
        let record = Record::with_id(3)
            .value("user_id", FieldValue::Integer(1))
            .value("role_id", FieldValue::Integer(1));
        assert!(service.update(record).await.unwrap().is_none());
        assert_eq!(service.count_all().await.unwrap(), 0);
    }

    struct BrokenStore;

    #[async_trait]
    impl EntityStore for BrokenStore {
        fn schema(&self) -> &'static EntitySchema {
            &SCHEDULE
        }
        async fn find_all(&self, _: Option<&Pageable>) -> Result<Vec<Record>, AppError> {
            Err(StorageError::Poisoned.into())
        }
        async fn find_by_id(&self, _: i64) -> Result<Option<Record>, AppError> {
            Err(StorageError::Poisoned.into())
        }
        async fn exists_by_id(&self, _: i64) -> Result<bool, AppError> {
            Err(StorageError::Poisoned.into())
        }
        async fn save(&self, _: Record) -> Result<Record, AppError> {
            Err(StorageError::Poisoned.into())
        }
        async fn delete_by_id(&self, _: i64) -> Result<(), AppError> {
            Err(StorageError::Poisoned.into())
        }
        async fn count(&self) -> Result<u64, AppError> {
            Err(StorageError::Poisoned.into())
        }
    }

    #[tokio::test]
    async fn storage_failures_propagate() {
        let service = CrudService::new(Arc::new(BrokenStore));
        let err = service.update(Record::with_id(1)).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::Poisoned)));
    }
}
