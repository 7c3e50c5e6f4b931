//! Runtime settings read from the process environment.

use crate::error::ConfigError;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/stuff_scheduling";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_APP_NAME: &str = "stuffSchedulingApp";

/// Where entity rows live. `Memory` runs without a database and loses all
/// data on exit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    /// PostgreSQL schema holding the entity tables.
    pub db_schema: String,
    /// Application name used in `X-{app}-*` alert headers.
    pub app_name: String,
    pub run_migrations: bool,
    pub store: StoreBackend,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: 5,
            db_schema: "public".into(),
            app_name: DEFAULT_APP_NAME.into(),
            run_migrations: true,
            store: StoreBackend::Postgres,
        }
    }
}

impl Settings {
    /// `DATABASE_URL`, `BIND_ADDR`, `DB_MAX_CONNECTIONS`, `DB_SCHEMA`, `APP_NAME`, `RUN_MIGRATIONS`, `STORE_BACKEND`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let text = |key: &str, default: String| lookup(key).filter(|v| !v.trim().is_empty()).unwrap_or(default);

        let db_schema = text("DB_SCHEMA", defaults.db_schema);
        if !db_schema.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::Invalid {
                key: "DB_SCHEMA",
                value: db_schema,
            });
        }

        Ok(Settings {
            database_url: text("DATABASE_URL", defaults.database_url),
            bind_addr: text("BIND_ADDR", defaults.bind_addr),
            max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
            db_schema,
            app_name: text("APP_NAME", defaults.app_name),
            run_migrations: parsed(&lookup, "RUN_MIGRATIONS", defaults.run_migrations)?,
            store: parsed(&lookup, "STORE_BACKEND", defaults.store)?,
        })
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn falls_back_to_defaults() {
        let settings = Settings::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn reads_overrides() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("DB_MAX_CONNECTIONS", "12"),
            ("APP_NAME", "schedulingApp"),
            ("RUN_MIGRATIONS", "false"),
        ]))
        .unwrap();
        assert_eq!(settings.max_connections, 12);
        assert_eq!(settings.app_name, "schedulingApp");
        assert!(!settings.run_migrations);
    }

    #[test]
    fn selects_store_backend() {
        let settings = Settings::from_lookup(lookup_from(&[("STORE_BACKEND", "Memory")])).unwrap();
        assert_eq!(settings.store, StoreBackend::Memory);
        let err = Settings::from_lookup(lookup_from(&[("STORE_BACKEND", "sqlite")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORE_BACKEND", .. }));
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = Settings::from_lookup(lookup_from(&[("DB_MAX_CONNECTIONS", "many")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", .. }));
    }

    #[test]
    fn rejects_unsafe_schema_names() {
        let err = Settings::from_lookup(lookup_from(&[("DB_SCHEMA", "public; drop")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DB_SCHEMA", .. }));
    }
}
