use crate::error::ApiError;

pub fn validate_duration(value: u32) -> Result<u32, ApiError> {
    if (1..=480).contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::BadRequest(
            "duration_minutes must be between 1 and 480".into(),
        ))
    }
}
