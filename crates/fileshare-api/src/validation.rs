use crate::error::AppError;

/// Validate that a string's length in characters falls within the given range (inclusive).
pub fn validate_string_length(
    value: &str,
    min: usize,
    max: usize,
    field_name: &str,
) -> Result<(), AppError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(AppError::BadRequest(format!(
            "{field_name} must be {min}-{max} characters"
        )));
    }
    Ok(())
}

/// Validate that a string's length in bytes falls within the given range (inclusive).
pub fn validate_byte_length(
    value: &str,
    min: usize,
    max: usize,
    field_name: &str,
) -> Result<(), AppError> {
    let len = value.len();
    if len < min || len > max {
        return Err(AppError::BadRequest(format!(
            "{field_name} must be {min}-{max} bytes"
        )));
    }
    Ok(())
}
