//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from an entity descriptor.
//!
//! Selected columns are aliased `{ENTITY_ALIAS}_{column}` so rows can be fed
//! straight to the mapper.

use crate::config::EntitySchema;
use crate::mapper::alias;
use crate::record::Record;
use crate::sql::PgBindValue;
use crate::store::Pageable;

/// Table alias and column prefix used by every generated SELECT.
pub const ENTITY_ALIAS: &str = "e";

/// Quote identifier for PostgreSQL (safe: only from descriptors).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: PgBindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

/// `e."col" AS "e_col"` for the identity and every field.
fn select_column_list(entity: &EntitySchema, qualifier: Option<&str>) -> String {
    std::iter::once(entity.id_column)
        .chain(entity.fields.iter().map(|f| f.column))
        .map(|c| {
            let source = match qualifier {
                Some(q) => format!("{}.{}", q, quoted(c)),
                None => quoted(c),
            };
            format!("{} AS {}", source, quoted(&alias(ENTITY_ALIAS, c)))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn select_from(entity: &EntitySchema, db_schema: &str) -> String {
    format!(
        "SELECT {} FROM {} {}",
        select_column_list(entity, Some(ENTITY_ALIAS)),
        qualified_table(db_schema, entity.table),
        ENTITY_ALIAS
    )
}

/// SELECT all rows; ordered and windowed when a pageable is given.
pub fn select_list(entity: &EntitySchema, db_schema: &str, pageable: Option<&Pageable>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sql = select_from(entity, db_schema);
    if let Some(p) = pageable {
        let orders = p
            .orders(entity)
            .iter()
            .map(|o| format!("{}.{} {}", ENTITY_ALIAS, quoted(o.column), o.direction.as_sql()))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" ORDER BY {}", orders));
        if let Some(size) = p.size {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", size, p.offset()));
        }
    }
    q.sql = sql;
    q
}

/// SELECT by primary key.
pub fn select_by_id(entity: &EntitySchema, db_schema: &str, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::Integer(id));
    q.sql = format!(
        "{} WHERE {}.{} = ${}",
        select_from(entity, db_schema),
        ENTITY_ALIAS,
        quoted(entity.id_column),
        n
    );
    q
}

pub fn exists_by_id(entity: &EntitySchema, db_schema: &str, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::Integer(id));
    q.sql = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE {} = ${})",
        qualified_table(db_schema, entity.table),
        quoted(entity.id_column),
        n
    );
    q
}

pub fn count(entity: &EntitySchema, db_schema: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) FROM {}", qualified_table(db_schema, entity.table));
    q
}

/// INSERT every declared field (nulls bound with their type); identity is left to the database.
pub fn insert(entity: &EntitySchema, db_schema: &str, record: &Record) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::with_capacity(entity.fields.len());
    let mut placeholders = Vec::with_capacity(entity.fields.len());
    for f in entity.fields {
        let n = q.push_param(PgBindValue::from_field(f.kind, record.get(f.column)));
        cols.push(quoted(f.column));
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(db_schema, entity.table),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(entity, None)
    );
    q
}

/// UPDATE by id: full replace of every declared field.
pub fn update(entity: &EntitySchema, db_schema: &str, id: i64, record: &Record) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(entity.fields.len());
    for f in entity.fields {
        let n = q.push_param(PgBindValue::from_field(f.kind, record.get(f.column)));
        sets.push(format!("{} = ${}", quoted(f.column), n));
    }
    let id_param = q.push_param(PgBindValue::Integer(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        qualified_table(db_schema, entity.table),
        sets.join(", "),
        quoted(entity.id_column),
        id_param,
        select_column_list(entity, None)
    );
    q
}

/// DELETE by id.
pub fn delete(entity: &EntitySchema, db_schema: &str, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(PgBindValue::Integer(id));
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${}",
        qualified_table(db_schema, entity.table),
        quoted(entity.id_column),
        n
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldType;
    use crate::entities::{ROLES, ROLE_AUTHORITY};
    use crate::record::FieldValue;
    use crate::store::{Direction, SortOrder};

    #[test]
    fn select_aliases_every_column() {
        let q = select_by_id(&ROLES, "public", 3);
        assert_eq!(
            q.sql,
            r#"SELECT e."id" AS "e_id", e."role_name" AS "e_role_name" FROM "public"."roles" e WHERE e."id" = $1"#
        );
        assert_eq!(q.params, vec![PgBindValue::Integer(3)]);
    }

    #[test]
    fn list_without_pageable_has_no_window() {
        let q = select_list(&ROLES, "public", None);
        assert!(!q.sql.contains("ORDER BY"));
        assert!(!q.sql.contains("LIMIT"));
    }

    #[test]
    fn list_applies_sort_and_window() {
        let pageable = Pageable {
            page: 1,
            size: Some(20),
            sort: vec![SortOrder { column: "role_name", direction: Direction::Desc }],
        };
        let q = select_list(&ROLES, "app", Some(&pageable));
        assert!(q.sql.ends_with(r#"FROM "app"."roles" e ORDER BY e."role_name" DESC LIMIT 20 OFFSET 20"#));
    }

    #[test]
    fn insert_binds_nulls_with_their_type() {
        let record = Record::new().value("user_id", FieldValue::Integer(1));
        let q = insert(&ROLE_AUTHORITY, "public", &record);
        assert!(q.sql.starts_with(r#"INSERT INTO "public"."role_authority" ("user_id", "role_id") VALUES ($1, $2) RETURNING "id" AS "e_id""#));
        assert_eq!(
            q.params,
            vec![PgBindValue::Integer(1), PgBindValue::Null(FieldType::Integer)]
        );
    }

    #[test]
    fn update_puts_identity_last() {
        let record = Record::with_id(4)
            .value("user_id", FieldValue::Integer(2))
            .value("role_id", FieldValue::Integer(1));
        let q = update(&ROLE_AUTHORITY, "public", 4, &record);
        assert!(q.sql.starts_with(r#"UPDATE "public"."role_authority" SET "user_id" = $1, "role_id" = $2 WHERE "id" = $3"#));
        assert_eq!(q.params.last(), Some(&PgBindValue::Integer(4)));
    }

    #[test]
    fn delete_and_exists_filter_by_identity() {
        assert_eq!(delete(&ROLES, "public", 8).sql, r#"DELETE FROM "public"."roles" WHERE "id" = $1"#);
        assert_eq!(
            exists_by_id(&ROLES, "public", 8).sql,
            r#"SELECT EXISTS (SELECT 1 FROM "public"."roles" WHERE "id" = $1)"#
        );
    }

    #[test]
    fn quotes_embedded_quotes() {
        assert_eq!(qualified_table("a\"b", "t"), r#""a""b"."t""#);
    }
}
