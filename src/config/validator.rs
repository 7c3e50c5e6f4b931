//! Descriptor validation: unique routes and tables, well-formed column lists.

use crate::config::EntitySchema;
use crate::error::ConfigError;
use std::collections::HashSet;

pub fn validate(entities: &[&EntitySchema]) -> Result<(), ConfigError> {
    let mut path_segments = HashSet::new();
    let mut tables = HashSet::new();

    for e in entities {
        if !path_segments.insert(e.path_segment) {
            return Err(ConfigError::DuplicatePathSegment(e.path_segment.to_string()));
        }
        if !tables.insert(e.table) {
            return Err(ConfigError::DuplicateTable(e.table.to_string()));
        }
        if e.fields.is_empty() {
            return Err(ConfigError::NoFields(e.name.to_string()));
        }
        let mut columns = HashSet::new();
        for f in e.fields {
            if f.column == e.id_column {
                return Err(ConfigError::IdentityAsField {
                    entity: e.name.to_string(),
                    column: f.column.to_string(),
                });
            }
            if !columns.insert(f.column) {
                return Err(ConfigError::DuplicateColumn {
                    entity: e.name.to_string(),
                    column: f.column.to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldDef, FieldType};

    static ROLES: EntitySchema = EntitySchema {
        name: "Roles",
        entity_name: "testRoles",
        table: "roles",
        path_segment: "roles",
        id_column: "id",
        fields: &[FieldDef::required("role_name", FieldType::Text)],
    };

    static ROLES_AGAIN: EntitySchema = EntitySchema {
        name: "RolesAgain",
        entity_name: "testRolesAgain",
        table: "roles_again",
        path_segment: "roles",
        id_column: "id",
        fields: &[FieldDef::required("role_name", FieldType::Text)],
    };

    static SELF_ID: EntitySchema = EntitySchema {
        name: "Broken",
        entity_name: "testBroken",
        table: "broken",
        path_segment: "broken",
        id_column: "id",
        fields: &[FieldDef::required("id", FieldType::Integer)],
    };

    static TWICE: EntitySchema = EntitySchema {
        name: "Twice",
        entity_name: "testTwice",
        table: "twice",
        path_segment: "twice",
        id_column: "id",
        fields: &[
            FieldDef::required("name", FieldType::Text),
            FieldDef::required("name", FieldType::Text),
        ],
    };

    #[test]
    fn rejects_duplicate_path_segments() {
        let err = validate(&[&ROLES, &ROLES_AGAIN]).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePathSegment(p) if p == "roles"));
    }

    #[test]
    fn rejects_identity_declared_as_field() {
        assert!(matches!(validate(&[&SELF_ID]), Err(ConfigError::IdentityAsField { .. })));
    }

    #[test]
    fn rejects_duplicate_columns() {
        assert!(matches!(validate(&[&TWICE]), Err(ConfigError::DuplicateColumn { .. })));
    }

    #[test]
    fn accepts_well_formed_model() {
        assert!(validate(&[&ROLES]).is_ok());
    }
}
