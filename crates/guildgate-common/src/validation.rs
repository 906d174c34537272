//! Input validation utilities.
//!
//! Centralized validation helpers used across API routes and config loading.

use validator::Validate;

use crate::error::GateError;

/// Validate a request body, returning a GateError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), GateError> {
    body.validate().map_err(|e| GateError::Validation {
        message: format_validation_errors(&e),
    })
}

/// Format validation errors into a human-readable string.
///
/// Fields are sorted so the message is stable across runs.
pub fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct WindowQuery {
        #[validate(range(min = 1, max = 3600, message = "seconds must be 1-3600"))]
        seconds: u32,
        #[validate(length(max = 4))]
        label: String,
    }

    #[test]
    fn test_valid_body_passes() {
        let q = WindowQuery {
            seconds: 60,
            label: "tps".into(),
        };
        assert!(validate_request(&q).is_ok());
    }

    #[test]
    fn test_messages_are_joined_in_field_order() {
        let q = WindowQuery {
            seconds: 0,
            label: "liveness".into(),
        };
        let err = validate_request(&q).unwrap_err();
        match err {
            GateError::Validation { message } => {
                assert_eq!(message, "Invalid value for 'label'; seconds must be 1-3600");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
