//! Form validation glue.
//!
//! Forms derive `validator::Validate`; this module turns the validator's error
//! tree into [`FieldErrors`] so every entry point (CLI, library callers) sees the
//! same `ValidationFailed` shape before anything touches the network.

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::{BackofficeError, FieldErrors, Result};

/// Run a form's validator rules and any extra checks, failing with every
/// message collected.
pub fn validate_form<F: Validate>(form: &F, extra: impl FnOnce(&mut FieldErrors)) -> Result<()> {
    let mut errors = match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => field_errors(&e),
    };
    extra(&mut errors);
    errors.into_result()
}

/// Flatten validator errors into per-field messages.
///
/// Nested struct and list errors are keyed by dotted path. A field that
/// failed a `required` rule reports only that.
pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut out = FieldErrors::new();
    collect(errors, None, &mut out);
    out
}

fn collect(errors: &ValidationErrors, prefix: Option<&str>, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{field}"),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                let required = list.iter().any(|e| e.code == "required");
                for error in list.iter().filter(|e| !required || e.code == "required") {
                    let message = match &error.message {
                        Some(message) => message.to_string(),
                        None => default_message(&path, &error.code),
                    };
                    out.add(path.clone(), message);
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&path), out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, Some(&format!("{path}[{index}]")), out);
                }
            }
        }
    }
}

fn default_message(field: &str, code: &str) -> String {
    match code {
        "required" => format!("{field} is required"),
        "email" => format!("{field} must be a valid email address"),
        other => format!("{field} is invalid ({other})"),
    }
}

/// `validator` custom rule: reject blank or whitespace-only strings.
pub fn not_blank(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("required"));
    }
    Ok(())
}

/// Shorthand for a single-field validation failure.
pub fn invalid(field: &str, message: impl Into<String>) -> BackofficeError {
    let mut errors = FieldErrors::new();
    errors.add(field, message);
    BackofficeError::ValidationFailed(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(custom(function = "not_blank", message = "Name is required"))]
        name: String,
        #[validate(email)]
        email: String,
        #[validate(custom(function = "not_blank"))]
        code: String,
    }

    #[derive(Validate)]
    struct Titled {
        #[validate(
            length(min = 3, message = "Title must be at least 3 characters long"),
            custom(function = "not_blank", message = "Title is required")
        )]
        title: String,
    }

    fn title_errors(title: &str) -> Option<FieldErrors> {
        match validate_form(&Titled { title: title.to_string() }, |_| {}) {
            Err(BackofficeError::ValidationFailed(errors)) => Some(errors),
            _ => None,
        }
    }

    #[test]
    fn test_required_hides_other_rules_on_the_field() {
        let errors = title_errors("").unwrap();
        assert_eq!(errors.first("title"), Some("Title is required"));
        assert!(!errors.to_string().contains("at least 3"));

        let errors = title_errors("ab").unwrap();
        assert_eq!(
            errors.first("title"),
            Some("Title must be at least 3 characters long")
        );
        assert!(title_errors("abc").is_none());
    }

    #[test]
    fn test_field_errors_use_declared_messages() {
        let form = Sample {
            name: "  ".to_string(),
            email: "not-an-email".to_string(),
            code: "ok".to_string(),
        };
        let err = validate_form(&form, |_| {}).unwrap_err();
        let BackofficeError::ValidationFailed(errors) = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(errors.first("name"), Some("Name is required"));
        assert_eq!(
            errors.first("email"),
            Some("email must be a valid email address")
        );
        assert!(errors.first("code").is_none());
    }

    #[test]
    fn test_default_required_message() {
        let form = Sample {
            name: "Admin".to_string(),
            email: "a@b.co".to_string(),
            code: "".to_string(),
        };
        let err = validate_form(&form, |_| {}).unwrap_err();
        let BackofficeError::ValidationFailed(errors) = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(errors.first("code"), Some("code is required"));
    }

    #[test]
    fn test_extra_checks_are_merged() {
        let form = Sample {
            name: "Admin".to_string(),
            email: "a@b.co".to_string(),
            code: "x".to_string(),
        };
        let err = validate_form(&form, |errors| errors.add("confirm", "Passwords do not match"))
            .unwrap_err();
        assert!(matches!(err, BackofficeError::ValidationFailed(_)));

        assert!(validate_form(&form, |_| {}).is_ok());
    }

    #[test]
    fn test_invalid_shorthand() {
        let BackofficeError::ValidationFailed(errors) = invalid("email", "Email is required") else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(errors.first("email"), Some("Email is required"));
    }
}
