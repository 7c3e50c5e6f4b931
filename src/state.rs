//! Shared application state for all routes: the resolved model plus one
//! service per entity, all behind `Arc` and never mutated after startup.

use crate::config::{EntitySchema, ResolvedModel};
use crate::error::AppError;
use crate::service::CrudService;
use crate::store::{EntityStore, MemoryStore, PgStore};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Prefix of the `X-{app}-*` alert headers.
    pub app_name: Arc<str>,
    pub model: Arc<ResolvedModel>,
    services: Arc<HashMap<&'static str, CrudService>>,
}

impl AppState {
    /// Build one service per entity around the store `make_store` returns.
    pub fn new<F>(app_name: impl Into<Arc<str>>, model: ResolvedModel, make_store: F) -> Self
    where
        F: Fn(&'static EntitySchema) -> Arc<dyn EntityStore>,
    {
        let services = model
            .entities
            .iter()
            .map(|schema| (schema.path_segment, CrudService::new(make_store(schema))))
            .collect();
        AppState {
            app_name: app_name.into(),
            model: Arc::new(model),
            services: Arc::new(services),
        }
    }

    pub fn postgres(app_name: impl Into<Arc<str>>, model: ResolvedModel, pool: PgPool, db_schema: &str) -> Self {
        AppState::new(app_name, model, |schema| {
            Arc::new(PgStore::new(pool.clone(), db_schema, schema)) as Arc<dyn EntityStore>
        })
    }

    /// Database-less state; every entity gets its own empty in-memory table.
    pub fn in_memory(app_name: impl Into<Arc<str>>, model: ResolvedModel) -> Self {
        AppState::new(app_name, model, |schema| Arc::new(MemoryStore::new(schema)) as Arc<dyn EntityStore>)
    }

    /// Service for the REST collection `path`; unknown collections are 404.
    pub fn service(&self, path: &str) -> Result<&CrudService, AppError> {
        self.model
            .entity_by_path(path)
            .and_then(|schema| self.services.get(schema.path_segment))
            .ok_or_else(|| AppError::NotFound(format!("resource '{}'", path)))
    }

    /// Readiness: every store must answer.
    pub async fn ping(&self) -> Result<(), AppError> {
        for service in self.services.values() {
            service.store().ping().await?;
        }
        Ok(())
    }
}
