//! Create the schema and one table per entity. Idempotent: every statement
//! uses IF NOT EXISTS, so existing tables are left as they are.

use crate::config::{EntitySchema, ResolvedModel};
use crate::error::AppError;
use crate::sql::{qualified_table, quoted};
use sqlx::PgPool;

/// `CREATE TABLE IF NOT EXISTS` for one entity: BIGSERIAL identity, required columns NOT NULL.
pub fn create_table_sql(entity: &EntitySchema, db_schema: &str) -> String {
    let mut col_defs = vec![format!("{} BIGSERIAL PRIMARY KEY", quoted(entity.id_column))];
    for f in entity.fields {
        let mut def = format!("{} {}", quoted(f.column), f.kind.sql_type());
        if f.required {
            def.push_str(" NOT NULL");
        }
        col_defs.push(def);
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        qualified_table(db_schema, entity.table),
        col_defs.join(", ")
    )
}

/// Statements in execution order: schema first, then tables.
pub fn migration_statements(model: &ResolvedModel, db_schema: &str) -> Vec<String> {
    std::iter::once(format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(db_schema)))
        .chain(model.entities.iter().map(|e| create_table_sql(e, db_schema)))
        .collect()
}

pub async fn apply_migrations(pool: &PgPool, db_schema: &str, model: &ResolvedModel) -> Result<(), AppError> {
    for sql in migration_statements(model, db_schema) {
        tracing::debug!(sql = %sql, "migration");
        sqlx::query(&sql).execute(pool).await?;
    }
    tracing::info!(schema = db_schema, tables = model.entities.len(), "migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{self, SCHEDULE};

    #[test]
    fn schedule_table_ddl() {
        assert_eq!(
            create_table_sql(&SCHEDULE, "public"),
            r#"CREATE TABLE IF NOT EXISTS "public"."schedule" ("id" BIGSERIAL PRIMARY KEY, "user_id" BIGINT NOT NULL, "work_date" TIMESTAMPTZ NOT NULL, "hours" BIGINT NOT NULL)"#
        );
    }

    #[test]
    fn schema_is_created_before_tables() {
        let model = entities::model().unwrap();
        let statements = migration_statements(&model, "staff");
        assert_eq!(statements.len(), 8);
        assert_eq!(statements[0], r#"CREATE SCHEMA IF NOT EXISTS "staff""#);
        assert!(statements[1..].iter().all(|s| s.starts_with(r#"CREATE TABLE IF NOT EXISTS "staff"."#)));
    }
}
