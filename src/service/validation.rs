//! Request validation against the entity descriptor.

use crate::config::EntitySchema;
use crate::error::{AppError, FieldViolation};
use crate::record::Record;

pub struct RequestValidator;

impl RequestValidator {
    /// Every required field must be non-null. All violations are reported at once.
    pub fn validate(record: &Record, schema: &EntitySchema) -> Result<(), AppError> {
        let violations: Vec<FieldViolation> = schema
            .required_fields()
            .filter(|f| record.get(f.column).is_none())
            .map(|f| FieldViolation {
                field: f.json_name(),
                message: "must not be null".into(),
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{SCHEDULE, USERS};
    use crate::record::FieldValue;

    #[test]
    fn reports_every_missing_field() {
        let record = Record::new().value("email", FieldValue::Text("a@b.c".into()));
        let AppError::Validation(violations) = RequestValidator::validate(&record, &USERS).unwrap_err() else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "surname", "password"]);
        assert!(violations.iter().all(|v| v.message == "must not be null"));
    }

    #[test]
    fn schedule_requires_hours() {
        let record = Record::new()
            .value("user_id", FieldValue::Integer(1))
            .value("work_date", FieldValue::Timestamp(chrono::Utc::now()));
        let AppError::Validation(violations) = RequestValidator::validate(&record, &SCHEDULE).unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(
            violations,
            vec![FieldViolation { field: "hours".into(), message: "must not be null".into() }]
        );
    }
}
