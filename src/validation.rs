// Validation utilities module
// Provides custom validation functions for domain-specific rules

use validator::{ValidationError, ValidationErrors};

/// Rejects values that are empty once surrounding whitespace is removed
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        Err(error)
    } else {
        Ok(())
    }
}

/// Flattens field errors into one readable line, ordered by field name
///
/// e.g. `email: must be a valid email address; password: must be at least 6 characters`
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);

    fields
        .into_iter()
        .map(|(field, field_errors)| {
            let reasons = field_errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {}", field, reasons)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("word").is_ok());
        assert!(validate_not_blank("  padded ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
    }

    #[test]
    fn test_describe_orders_fields_and_uses_messages() {
        let mut errors = ValidationErrors::new();
        let mut with_message = ValidationError::new("length");
        with_message.message = Some("must be at least 6 characters".into());
        errors.add("password", with_message);
        errors.add("email", ValidationError::new("email"));

        assert_eq!(
            describe(&errors),
            "email: email; password: must be at least 6 characters"
        );
    }
}
