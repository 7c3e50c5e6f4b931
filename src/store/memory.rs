//! In-process store with database-like semantics: sequential identities,
//! NOT NULL on required columns, stable ordering and paging.

use super::{Direction, EntityStore, Pageable, SortOrder};
use crate::config::EntitySchema;
use crate::error::{AppError, MappingError, StorageError};
use crate::record::{FieldValue, Record};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::RwLock;

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Record>,
}

pub struct MemoryStore {
    entity: &'static EntitySchema,
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new(entity: &'static EntitySchema) -> Self {
        MemoryStore {
            entity,
            table: RwLock::new(Table {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    /// Apply the column constraints the generated DDL declares.
    fn check_constraints(&self, record: &Record) -> Result<(), AppError> {
        for field in self.entity.fields {
            match record.get(field.column) {
                None if field.required => {
                    return Err(StorageError::NullConstraint {
                        table: self.entity.table,
                        column: field.column,
                    }
                    .into())
                }
                Some(value) if value.kind() != field.kind => {
                    return Err(MappingError::IncompatibleType {
                        column: field.column.to_string(),
                        expected: field.kind.describe(),
                    }
                    .into())
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn sort_key<'a>(&self, record: &'a Record, column: &str) -> Option<SortValue<'a>> {
        if column == self.entity.id_column {
            record.id.map(SortValue::Id)
        } else {
            record.get(column).map(SortValue::Field)
        }
    }

    fn compare(&self, a: &Record, b: &Record, orders: &[SortOrder]) -> Ordering {
        for order in orders {
            let ord = nulls_last(self.sort_key(a, order.column), self.sort_key(b, order.column));
            let ord = match order.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.id.cmp(&b.id)
    }
}

enum SortValue<'a> {
    Id(i64),
    Field(&'a FieldValue),
}

impl SortValue<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Id(a), SortValue::Id(b)) => a.cmp(b),
            (SortValue::Field(a), SortValue::Field(b)) => match (a, b) {
                (FieldValue::Integer(x), FieldValue::Integer(y)) => x.cmp(y),
                (FieldValue::Text(x), FieldValue::Text(y)) => x.cmp(y),
                (FieldValue::Timestamp(x), FieldValue::Timestamp(y)) => x.cmp(y),
                _ => Ordering::Equal,
            },
            _ => Ordering::Equal,
        }
    }
}

/// Ascending order with nulls after values, as PostgreSQL sorts by default.
fn nulls_last(a: Option<SortValue<'_>>, b: Option<SortValue<'_>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    fn schema(&self) -> &'static EntitySchema {
        self.entity
    }

    async fn find_all(&self, pageable: Option<&Pageable>) -> Result<Vec<Record>, AppError> {
        let table = self.table.read().map_err(|_| StorageError::Poisoned)?;
        let mut rows: Vec<Record> = table.rows.values().cloned().collect();
        let Some(p) = pageable else {
            return Ok(rows);
        };
        let orders = p.orders(self.entity);
        rows.sort_by(|a, b| self.compare(a, b, &orders));
        let offset = usize::try_from(p.offset()).unwrap_or(usize::MAX);
        let rows = rows.into_iter().skip(offset);
        Ok(match p.size {
            Some(size) => rows.take(usize::try_from(size).unwrap_or(usize::MAX)).collect(),
            None => rows.collect(),
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Record>, AppError> {
        let table = self.table.read().map_err(|_| StorageError::Poisoned)?;
        Ok(table.rows.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, AppError> {
        let table = self.table.read().map_err(|_| StorageError::Poisoned)?;
        Ok(table.rows.contains_key(&id))
    }

    async fn save(&self, mut record: Record) -> Result<Record, AppError> {
        self.check_constraints(&record)?;
        let mut table = self.table.write().map_err(|_| StorageError::Poisoned)?;
        let id = match record.id {
            Some(id) if table.rows.contains_key(&id) => id,
            Some(id) => {
                return Err(StorageError::StaleRow {
                    table: self.entity.table,
                    id,
                }
                .into())
            }
            None => {
                let id = table.next_id;
                table.next_id += 1;
                id
            }
        };
        record.id = Some(id);
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        let mut table = self.table.write().map_err(|_| StorageError::Poisoned)?;
        table.rows.remove(&id);
        Ok(())
    }

    async fn count(&self) -> Result<u64, AppError> {
        let table = self.table.read().map_err(|_| StorageError::Poisoned)?;
        Ok(table.rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ROLES, ROLE_AUTHORITY};

    fn role(name: &str) -> Record {
        Record::new().value("role_name", FieldValue::Text(name.to_string()))
    }

    #[tokio::test]
    async fn assigns_sequential_identities() {
        let store = MemoryStore::new(&ROLES);
        let a = store.save(role("admin")).await.unwrap();
        let b = store.save(role("staff")).await.unwrap();
        assert_eq!(a.id, Some(1));
        assert_eq!(b.id, Some(2));
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn rejects_null_in_required_column() {
        let store = MemoryStore::new(&ROLE_AUTHORITY);
        let err = store
            .save(Record::new().value("user_id", FieldValue::Integer(1)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Storage(StorageError::NullConstraint { column: "role_id", .. })
        ));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_stale() {
        let store = MemoryStore::new(&ROLES);
        let mut record = role("admin");
        record.id = Some(42);
        let err = store.save(record).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(StorageError::StaleRow { id: 42, .. })));
    }

    #[tokio::test]
    async fn sorts_and_pages() {
        let store = MemoryStore::new(&ROLES);
        for name in ["b", "c", "a"] {
            store.save(role(name)).await.unwrap();
        }
        let pageable = Pageable {
            page: 0,
            size: Some(2),
            sort: vec![SortOrder { column: "role_name", direction: Direction::Desc }],
        };
        let rows = store.find_all(Some(&pageable)).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.get("role_name").cloned()).collect();
        assert_eq!(
            names,
            vec![Some(FieldValue::Text("c".into())), Some(FieldValue::Text("b".into()))]
        );

        let second = Pageable { page: 1, ..pageable };
        assert_eq!(store.find_all(Some(&second)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new(&ROLES);
        let saved = store.save(role("admin")).await.unwrap();
        let id = saved.id.unwrap();
        store.delete_by_id(id).await.unwrap();
        store.delete_by_id(id).await.unwrap();
        assert!(!store.exists_by_id(id).await.unwrap());
    }
}
