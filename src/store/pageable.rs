//! Paging and sorting parameters for list queries.

use crate::config::EntitySchema;
use crate::error::AppError;

pub const MAX_PAGE_SIZE: u64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortOrder {
    pub column: &'static str,
    pub direction: Direction,
}

/// Zero-based page window plus sort orders. Without `size` every row from
/// the start is returned, only sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pageable {
    pub page: u64,
    pub size: Option<u64>,
    pub sort: Vec<SortOrder>,
}

impl Pageable {
    /// Parse `page`, `size` and repeatable `sort=prop[,prop...][,asc|desc]`.
    /// Returns `None` when none of them is present.
    pub fn from_query(schema: &EntitySchema, params: &[(String, String)]) -> Result<Option<Self>, AppError> {
        let mut pageable = Pageable::default();
        let mut seen = false;

        for (key, value) in params {
            match key.as_str() {
                "page" => {
                    seen = true;
                    pageable.page = value
                        .trim()
                        .parse()
                        .map_err(|_| AppError::BadRequest(format!("invalid page '{}'", value)))?;
                }
                "size" => {
                    seen = true;
                    let size: u64 = value
                        .trim()
                        .parse()
                        .map_err(|_| AppError::BadRequest(format!("invalid size '{}'", value)))?;
                    if size == 0 {
                        return Err(AppError::BadRequest("size must be at least 1".into()));
                    }
                    pageable.size = Some(size.min(MAX_PAGE_SIZE));
                }
                "sort" => {
                    seen = true;
                    pageable.sort.extend(parse_sort(schema, value)?);
                }
                _ => {}
            }
        }

        if let Some(size) = pageable.size {
            let offset = pageable.page.checked_mul(size).filter(|o| i64::try_from(*o).is_ok());
            if offset.is_none() {
                return Err(AppError::BadRequest(format!("page {} is out of range", pageable.page)));
            }
        }

        Ok(seen.then_some(pageable))
    }

    pub fn offset(&self) -> u64 {
        self.size.map(|s| self.page.saturating_mul(s)).unwrap_or(0)
    }

    /// Sort orders to apply; identity ascending when none were requested.
    pub fn orders(&self, schema: &EntitySchema) -> Vec<SortOrder> {
        if self.sort.is_empty() {
            vec![SortOrder {
                column: schema.id_column,
                direction: Direction::Asc,
            }]
        } else {
            self.sort.clone()
        }
    }
}

fn parse_sort(schema: &EntitySchema, raw: &str) -> Result<Vec<SortOrder>, AppError> {
    let mut parts: Vec<&str> = raw.split(',').map(str::trim).filter(|p| !p.is_empty()).collect();
    let direction = match parts.last().map(|p| p.to_ascii_lowercase()) {
        Some(d) if d == "asc" => {
            parts.pop();
            Direction::Asc
        }
        Some(d) if d == "desc" => {
            parts.pop();
            Direction::Desc
        }
        _ => Direction::Asc,
    };
    if parts.is_empty() {
        return Err(AppError::BadRequest(format!("invalid sort '{}'", raw)));
    }
    parts
        .into_iter()
        .map(|property| {
            schema
                .column_for(property)
                .map(|column| SortOrder { column, direction })
                .ok_or_else(|| AppError::BadRequest(format!("cannot sort by '{}'", property)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ROLE_AUTHORITY, SCHEDULE};

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn absent_parameters_mean_no_pageable() {
        assert_eq!(Pageable::from_query(&SCHEDULE, &params(&[("other", "1")])).unwrap(), None);
    }

    #[test]
    fn parses_page_size_and_sorts() {
        let pageable = Pageable::from_query(
            &SCHEDULE,
            &params(&[("page", "2"), ("size", "5"), ("sort", "id,desc"), ("sort", "workDate")]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(pageable.offset(), 10);
        assert_eq!(pageable.size, Some(5));
        assert_eq!(
            pageable.sort,
            vec![
                SortOrder { column: "id", direction: Direction::Desc },
                SortOrder { column: "work_date", direction: Direction::Asc },
            ]
        );
    }

    #[test]
    fn caps_page_size() {
        let pageable = Pageable::from_query(&SCHEDULE, &params(&[("size", "50000")])).unwrap().unwrap();
        assert_eq!(pageable.size, Some(MAX_PAGE_SIZE));
    }

    #[test]
    fn rejects_unknown_sort_property() {
        let err = Pageable::from_query(&ROLE_AUTHORITY, &params(&[("sort", "password,asc")])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn rejects_offset_beyond_bigint() {
        let err = Pageable::from_query(
            &ROLE_AUTHORITY,
            &params(&[("page", "100000000000000000"), ("size", "1000")]),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let last = Pageable::from_query(&ROLE_AUTHORITY, &params(&[("page", "9223372036854775"), ("size", "1000")]))
            .unwrap()
            .unwrap();
        assert!(i64::try_from(last.offset()).is_ok());
    }

    #[test]
    fn defaults_to_identity_order() {
        let orders = Pageable::default().orders(&SCHEDULE);
        assert_eq!(orders, vec![SortOrder { column: "id", direction: Direction::Asc }]);
    }
}
