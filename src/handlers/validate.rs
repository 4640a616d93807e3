use std::collections::HashMap;

use crate::error::ApiError;

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Collects per-field problems and turns them into one `ValidationError`.
#[derive(Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn not_blank(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.0.insert(field.to_string(), "must not be blank".to_string());
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if let Err(msg) = validate_email_format(value) {
            self.0.insert(field.to_string(), msg);
        }
        self
    }

    pub fn min_len(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.0
                .insert(field.to_string(), format!("must be at least {} characters", min));
        }
        self
    }

    pub fn finish(&mut self, message: &str) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(message, Some(std::mem::take(&mut self.0))))
        }
    }
}

/// Basic email validation for registration and login.
pub fn validate_email_format(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format".to_string());
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err("Invalid email format".to_string());
    }

    if domain.starts_with('.') || domain.ends_with('.') || email.chars().any(char::is_whitespace) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(validate_email_format("ana@forum.dev").is_ok());
        assert!(validate_email_format("ana.silva+forum@mail.example.com").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "ana", "@forum.dev", "ana@", "ana@forum", "ana@@forum.dev", "ana @forum.dev", "ana@.dev"] {
            assert!(validate_email_format(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn field_errors_collect_all_problems() {
        let err = FieldErrors::new()
            .not_blank("titulo", "  ")
            .not_blank("curso", "Rust")
            .min_len("senha", "123", MIN_PASSWORD_LENGTH)
            .finish("Invalid input")
            .unwrap_err();

        match err {
            ApiError::ValidationError { field_errors: Some(fields), .. } => {
                assert!(fields.contains_key("titulo"));
                assert!(fields.contains_key("senha"));
                assert!(!fields.contains_key("curso"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
