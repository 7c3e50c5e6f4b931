//! Per-entity persistence contract and its implementations.

mod memory;
mod pageable;
mod postgres;

pub use memory::MemoryStore;
pub use pageable::{Direction, Pageable, SortOrder, MAX_PAGE_SIZE};
pub use postgres::PgStore;

use crate::config::EntitySchema;
use crate::error::AppError;
use crate::record::Record;
use async_trait::async_trait;

/// Table access for one entity. `save` inserts when the record has no
/// identity and updates by identity otherwise.
#[async_trait]
pub trait EntityStore: Send + Sync {
    fn schema(&self) -> &'static EntitySchema;

    async fn find_all(&self, pageable: Option<&Pageable>) -> Result<Vec<Record>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Record>, AppError>;

    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError>;

    async fn save(&self, record: Record) -> Result<Record, AppError>;

    /// Deleting an absent row is not an error.
    async fn delete_by_id(&self, id: i64) -> Result<(), AppError>;

    async fn count(&self) -> Result<u64, AppError>;

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
