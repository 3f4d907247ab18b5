use validator::Validate;

use crate::error::ApiError;

/// Run derive-based validation on a request DTO, mapping the first failure
/// into a domain-style 400 response.
pub fn validate_request<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload.validate().map_err(|errors| {
        let message = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for field '{field}'"),
                })
            })
            .next()
            .unwrap_or_else(|| "Invalid request".to_string());
        ApiError::Validation(message)
    })
}

/// Validate a mission completion percentage.
///
/// The client should only ever send 0..=100; anything else is rejected
/// before it reaches the store.
pub fn validate_completion_percentage(value: i32) -> Result<(), ApiError> {
    if !(0..=100).contains(&value) {
        return Err(ApiError::Validation(format!(
            "completionPercentage must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Validate that a score or duration field is not negative.
pub fn validate_non_negative(field: &str, value: i32) -> Result<(), ApiError> {
    if value < 0 {
        return Err(ApiError::Validation(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_completion_percentage() {
        assert!(validate_completion_percentage(0).is_ok());
        assert!(validate_completion_percentage(50).is_ok());
        assert!(validate_completion_percentage(100).is_ok());

        assert!(validate_completion_percentage(-1).is_err());
        assert!(validate_completion_percentage(101).is_err());
    }

    #[test]
    fn test_validate_non_negative() {
        assert!(validate_non_negative("score", 0).is_ok());
        assert!(validate_non_negative("score", 42).is_ok());
        assert!(validate_non_negative("timeSpent", -5).is_err());
    }

    #[test]
    fn test_validate_request_surfaces_field_message() {
        #[derive(Validate)]
        struct Dto {
            #[validate(length(min = 3, message = "Username must be 3 to 30 characters"))]
            username: String,
        }

        let dto = Dto {
            username: "ab".to_string(),
        };
        match validate_request(&dto) {
            Err(ApiError::Validation(msg)) => {
                assert_eq!(msg, "Username must be 3 to 30 characters");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
