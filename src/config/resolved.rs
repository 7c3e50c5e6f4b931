//! Resolved entity model: descriptors validated and indexed by path segment for runtime use.

use crate::config::{validate, EntitySchema};
use crate::error::ConfigError;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct ResolvedModel {
    pub entities: Vec<&'static EntitySchema>,
    entity_by_path: HashMap<&'static str, &'static EntitySchema>,
}

impl ResolvedModel {
    pub fn resolve(entities: &[&'static EntitySchema]) -> Result<Self, ConfigError> {
        validate(entities)?;
        let entity_by_path = entities.iter().map(|e| (e.path_segment, *e)).collect();
        Ok(ResolvedModel {
            entities: entities.to_vec(),
            entity_by_path,
        })
    }

    pub fn entity_by_path(&self, path: &str) -> Option<&'static EntitySchema> {
        self.entity_by_path.get(path).copied()
    }
}
