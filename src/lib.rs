//! Stuff scheduling: descriptor-driven REST CRUD backend on PostgreSQL.

pub mod case;
pub mod config;
pub mod entities;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod mapper;
pub mod migration;
pub mod record;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{EntitySchema, ResolvedModel, Settings};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use record::{FieldValue, Record};
pub use routes::{app, common_routes, entity_routes};
pub use service::CrudService;
pub use state::AppState;
pub use store::{EntityStore, MemoryStore, PgStore};
