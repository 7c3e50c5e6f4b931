//! Entity schema descriptors: the static description every generic layer is driven by.

use crate::case::{to_camel_case, to_snake_case};

/// Semantic type of a column. Drives JSON decoding, SQL binding and row mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    Text,
    /// Timezone-aware instant, stored as `timestamptz`.
    Timestamp,
}

impl FieldType {
    pub fn sql_type(self) -> &'static str {
        match self {
            FieldType::Integer => "BIGINT",
            FieldType::Text => "VARCHAR(255)",
            FieldType::Timestamp => "TIMESTAMPTZ",
        }
    }

    /// Character limit the column declares, if any.
    pub fn max_length(self) -> Option<usize> {
        match self {
            FieldType::Text => Some(255),
            FieldType::Integer | FieldType::Timestamp => None,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            FieldType::Integer => "an integer",
            FieldType::Text => "a string",
            FieldType::Timestamp => "a timestamp",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FieldDef {
    /// snake_case column name; the JSON property is its camelCase form.
    pub column: &'static str,
    pub kind: FieldType,
    pub required: bool,
}

impl FieldDef {
    pub const fn required(column: &'static str, kind: FieldType) -> Self {
        FieldDef { column, kind, required: true }
    }

    pub fn json_name(&self) -> String {
        to_camel_case(self.column)
    }
}

#[derive(Debug)]
pub struct EntitySchema {
    /// Human name, e.g. "Schedule".
    pub name: &'static str,
    /// Name reported in alert headers and error details.
    pub entity_name: &'static str,
    pub table: &'static str,
    /// REST collection segment under `/api`.
    pub path_segment: &'static str,
    pub id_column: &'static str,
    pub fields: &'static [FieldDef],
}

impl EntitySchema {
    pub fn field(&self, column: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.column == column)
    }

    /// Resolve a client supplied property (camelCase or snake_case) to a column.
    /// Returns the identity column for `id`.
    pub fn column_for(&self, name: &str) -> Option<&'static str> {
        let snake = to_snake_case(name);
        if snake == self.id_column {
            return Some(self.id_column);
        }
        self.field(&snake).map(|f| f.column)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn location(&self, id: i64) -> String {
        format!("/api/{}/{}", self.path_segment, id)
    }

    /// Lower-case name used in human messages, e.g. "schedule".
    pub fn display_name(&self) -> String {
        to_snake_case(self.name).replace('_', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SAMPLE: EntitySchema = EntitySchema {
        name: "RoleAuthority",
        entity_name: "sampleRoleAuthority",
        table: "role_authority",
        path_segment: "role-authorities",
        id_column: "id",
        fields: &[
            FieldDef::required("user_id", FieldType::Integer),
            FieldDef::required("role_id", FieldType::Integer),
        ],
    };

    #[test]
    fn resolves_columns_from_either_case() {
        assert_eq!(SAMPLE.column_for("roleId"), Some("role_id"));
        assert_eq!(SAMPLE.column_for("user_id"), Some("user_id"));
        assert_eq!(SAMPLE.column_for("id"), Some("id"));
        assert_eq!(SAMPLE.column_for("password"), None);
    }

    #[test]
    fn builds_location_and_display_name() {
        assert_eq!(SAMPLE.location(4), "/api/role-authorities/4");
        assert_eq!(SAMPLE.display_name(), "role authority");
        assert_eq!(SAMPLE.fields[0].json_name(), "userId");
    }
}
