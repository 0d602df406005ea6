use super::ApiError;

pub const MAX_BIO_CHARS: usize = 500;

/// Rejects non-positive path ids before they reach the store.
pub fn validate_id(resource: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {resource} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_bio(bio: &str) -> Result<&str, ApiError> {
    let trimmed = bio.trim();
    if trimmed.chars().count() > MAX_BIO_CHARS {
        return Err(ApiError::validation(format!(
            "Bio must be {MAX_BIO_CHARS} characters or less"
        )));
    }
    Ok(trimmed)
}
