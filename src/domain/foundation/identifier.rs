//! SQL identifier validation for names interpolated into DDL.
//!
//! Schema and table names cannot be bound as query parameters, so anything
//! that ends up formatted into SQL text must pass this check first.

use super::ValidationError;

/// Validates a possibly schema-qualified SQL identifier (`name` or
/// `schema.name`), each part matching `[A-Za-z_][A-Za-z0-9_]*` and at most
/// 63 bytes long.
pub fn validate_identifier(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::empty_field(field));
    }

    let parts: Vec<&str> = value.split('.').collect();
    if parts.len() > 2 {
        return Err(ValidationError::invalid_format(
            field,
            "at most one schema qualifier is allowed",
        ));
    }

    for part in parts {
        if !is_plain_identifier(part) {
            return Err(ValidationError::invalid_format(
                field,
                format!("'{}' is not a valid SQL identifier", part),
            ));
        }
    }

    Ok(())
}

fn is_plain_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    part.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
