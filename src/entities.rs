//! Descriptors of the staff-scheduling entities served by the API.

use crate::config::{EntitySchema, FieldDef, FieldType, ResolvedModel};
use crate::error::ConfigError;

use FieldType::{Integer, Text, Timestamp};

pub static USERS: EntitySchema = EntitySchema {
    name: "Users",
    entity_name: "stuffSchedulingUsers",
    table: "users",
    path_segment: "users",
    id_column: "id",
    fields: &[
        FieldDef::required("email", Text),
        FieldDef::required("name", Text),
        FieldDef::required("surname", Text),
        FieldDef::required("password", Text),
    ],
};

pub static ROLES: EntitySchema = EntitySchema {
    name: "Roles",
    entity_name: "stuffSchedulingRoles",
    table: "roles",
    path_segment: "roles",
    id_column: "id",
    fields: &[FieldDef::required("role_name", Text)],
};

pub static SCHEDULE: EntitySchema = EntitySchema {
    name: "Schedule",
    entity_name: "stuffSchedulingSchedule",
    table: "schedule",
    path_segment: "schedules",
    id_column: "id",
    fields: &[
        FieldDef::required("user_id", Integer),
        FieldDef::required("work_date", Timestamp),
        FieldDef::required("hours", Integer),
    ],
};

pub static SCHEDULE_USER: EntitySchema = EntitySchema {
    name: "ScheduleUser",
    entity_name: "stuffSchedulingScheduleUser",
    table: "schedule_user",
    path_segment: "schedule-users",
    id_column: "id",
    fields: &[
        FieldDef::required("email", Text),
        FieldDef::required("login", Text),
        FieldDef::required("firstname", Text),
        FieldDef::required("lastname", Text),
        FieldDef::required("password", Text),
    ],
};

pub static USER_AUTHORITY: EntitySchema = EntitySchema {
    name: "UserAuthority",
    entity_name: "stuffSchedulingUserAuthority",
    table: "user_authority",
    path_segment: "user-authorities",
    id_column: "id",
    fields: &[
        FieldDef::required("user_id", Integer),
        FieldDef::required("role_id", Integer),
    ],
};

pub static ROLE_AUTHORITY: EntitySchema = EntitySchema {
    name: "RoleAuthority",
    entity_name: "stuffSchedulingRoleAuthority",
    table: "role_authority",
    path_segment: "role-authorities",
    id_column: "id",
    fields: &[
        FieldDef::required("user_id", Integer),
        FieldDef::required("role_id", Integer),
    ],
};

pub static SCHEDULE_AUTHORITY: EntitySchema = EntitySchema {
    name: "ScheduleAuthority",
    entity_name: "stuffSchedulingScheduleAuthority",
    table: "schedule_authority",
    path_segment: "schedule-authorities",
    id_column: "id",
    fields: &[FieldDef::required("name", Text)],
};

pub static ALL: [&EntitySchema; 7] = [
    &USERS,
    &ROLES,
    &SCHEDULE,
    &SCHEDULE_USER,
    &USER_AUTHORITY,
    &ROLE_AUTHORITY,
    &SCHEDULE_AUTHORITY,
];

/// The resolved model of every entity above.
pub fn model() -> Result<ResolvedModel, ConfigError> {
    ResolvedModel::resolve(&ALL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_resolves_every_entity() {
        let model = model().unwrap();
        assert_eq!(model.entities.len(), 7);
        assert_eq!(model.entity_by_path("schedules").map(|e| e.table), Some("schedule"));
        assert_eq!(model.entity_by_path("role-authorities").map(|e| e.name), Some("RoleAuthority"));
        assert!(model.entity_by_path("schedule").is_none());
    }

    #[test]
    fn every_field_is_required() {
        for entity in ALL {
            assert!(entity.fields.iter().all(|f| f.required), "{}", entity.name);
        }
    }
}
