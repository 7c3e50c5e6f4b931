//! Case conversion between JSON property names (camelCase) and column names (snake_case).

/// Convert a single identifier from snake_case to camelCase.
/// e.g. "user_id" -> "userId", "work_date" -> "workDate"
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a single identifier from camelCase to snake_case.
/// e.g. "roleId" -> "role_id", "roleName" -> "role_name"
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_both_ways() {
        assert_eq!(to_camel_case("work_date"), "workDate");
        assert_eq!(to_camel_case("firstname"), "firstname");
        assert_eq!(to_snake_case("roleName"), "role_name");
        assert_eq!(to_snake_case("id"), "id");
    }
}
