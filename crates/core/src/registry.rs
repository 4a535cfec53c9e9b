//! Agent identity validation.

use crate::error::CoreError;

/// Maximum length of any identity field.
pub const MAX_FIELD_LEN: usize = 255;

/// Check one identity field is present and bounded.
pub fn validate_identity_field(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(())
}
