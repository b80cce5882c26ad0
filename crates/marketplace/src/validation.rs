//! Edit-form validation.
//!
//! [`validate`] is a pure function from form state to the set of fields
//! that fail, each with the first rule it violates.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 20;

/// Fields of the profile edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Password,
    ConfirmPassword,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::FirstName,
        Field::LastName,
        Field::Password,
        Field::ConfirmPassword,
    ];

    /// Name of the field on the wire and in the form.
    pub fn name(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A rule violated by a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(Field),

    #[error("{0} is shorter than 8 characters")]
    TooShort(Field),

    #[error("{0} is longer than 20 characters")]
    TooLong(Field),

    #[error("{0} does not match password")]
    Mismatch(Field),
}

impl ValidationError {
    /// Inline message shown under the field.
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::Required(Field::FirstName) => "First Name is required!",
            ValidationError::Required(Field::LastName) => "Last Name is required!",
            ValidationError::Required(Field::Password) | ValidationError::TooShort(_) => {
                "Password must be at least 8 characters!"
            }
            ValidationError::TooLong(_) => "Password must be at most 20 characters!",
            ValidationError::Required(Field::ConfirmPassword) => "Confirm Password is required!",
            ValidationError::Mismatch(_) => "Passwords don't match!",
        }
    }
}

/// Transient state of the profile edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditForm {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
}

impl EditForm {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::FirstName => self.first_name = value,
            Field::LastName => self.last_name = value,
            Field::Password => self.password = value,
            Field::ConfirmPassword => self.confirm_password = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

/// Field-keyed validation failures. A missing key means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, ValidationError>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<ValidationError> {
        self.0.get(&field).copied()
    }

    /// Inline message for `field`, if it failed.
    pub fn message(&self, field: Field) -> Option<&'static str> {
        self.get(field).map(|e| e.message())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, ValidationError)> + '_ {
        self.0.iter().map(|(f, e)| (*f, *e))
    }

    /// Replace the entry for `field` with `error` (or remove it).
    pub fn update(&mut self, field: Field, error: Option<ValidationError>) {
        match error {
            Some(e) => {
                self.0.insert(field, e);
            }
            None => {
                self.0.remove(&field);
            }
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Validate every field of `form`.
pub fn validate(form: &EditForm) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for field in Field::ALL {
        errors.update(field, validate_field(form, field));
    }
    errors
}

/// Validate a single field. `ConfirmPassword` is checked against the
/// form's current password.
pub fn validate_field(form: &EditForm, field: Field) -> Option<ValidationError> {
    let value = form.get(field);
    match field {
        Field::FirstName | Field::LastName => {
            value.is_empty().then_some(ValidationError::Required(field))
        }
        Field::Password => {
            let len = value.chars().count();
            if value.is_empty() {
                Some(ValidationError::Required(field))
            } else if len < PASSWORD_MIN_LEN {
                Some(ValidationError::TooShort(field))
            } else if len > PASSWORD_MAX_LEN {
                Some(ValidationError::TooLong(field))
            } else {
                None
            }
        }
        Field::ConfirmPassword => {
            if value.is_empty() {
                Some(ValidationError::Required(field))
            } else if value != form.password {
                Some(ValidationError::Mismatch(field))
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(first: &str, last: &str, password: &str, confirm: &str) -> EditForm {
        EditForm {
            first_name: first.into(),
            last_name: last.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn test_valid_form_has_no_errors() {
        let errors = validate(&form("Ada", "Lovelace", "P@ssword123", "P@ssword123"));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_form_requires_everything() {
        let errors = validate(&EditForm::default());
        assert_eq!(errors.len(), 4);
        for field in Field::ALL {
            assert_eq!(errors.get(field), Some(ValidationError::Required(field)));
        }
        assert_eq!(errors.message(Field::FirstName), Some("First Name is required!"));
        assert_eq!(errors.message(Field::ConfirmPassword), Some("Confirm Password is required!"));
    }

    #[test]
    fn test_short_password() {
        let errors = validate(&form("Ada", "Lovelace", "short", "short"));
        assert_eq!(
            errors.get(Field::Password),
            Some(ValidationError::TooShort(Field::Password))
        );
        assert_eq!(
            errors.message(Field::Password),
            Some("Password must be at least 8 characters!")
        );
        assert!(errors.get(Field::ConfirmPassword).is_none());
    }

    #[test]
    fn test_long_password() {
        let long = "a".repeat(21);
        let errors = validate(&form("Ada", "Lovelace", &long, &long));
        assert_eq!(
            errors.get(Field::Password),
            Some(ValidationError::TooLong(Field::Password))
        );
    }

    #[test]
    fn test_password_length_bounds_are_inclusive() {
        for len in [8, 20] {
            let password = "x".repeat(len);
            assert!(validate_field(&form("", "", &password, ""), Field::Password).is_none());
        }
    }

    #[test]
    fn test_password_length_counts_characters() {
        // 8 characters, 16 bytes
        let password = "éééééééé";
        assert!(validate_field(&form("", "", password, ""), Field::Password).is_none());
    }

    #[test]
    fn test_mismatched_confirmation() {
        let errors = validate(&form("Ada", "Lovelace", "P@ssword123", "different"));
        assert_eq!(
            errors.get(Field::ConfirmPassword),
            Some(ValidationError::Mismatch(Field::ConfirmPassword))
        );
        assert_eq!(errors.message(Field::ConfirmPassword), Some("Passwords don't match!"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_accepted_iff_all_rules_hold() {
        let cases = [
            ("Ada", "Lovelace", "P@ssword123", "P@ssword123", true),
            ("", "Lovelace", "P@ssword123", "P@ssword123", false),
            ("Ada", "", "P@ssword123", "P@ssword123", false),
            ("Ada", "Lovelace", "1234567", "1234567", false),
            ("Ada", "Lovelace", "12345678", "12345678", true),
            ("Ada", "Lovelace", "123456789012345678901", "123456789012345678901", false),
            ("Ada", "Lovelace", "P@ssword123", "", false),
            ("Ada", "Lovelace", "P@ssword123", "P@ssword124", false),
            (" ", " ", "        ", "        ", true),
        ];

        for (first, last, password, confirm, expected) in cases {
            let f = form(first, last, password, confirm);
            let len = password.chars().count();
            let rule = !first.is_empty()
                && !last.is_empty()
                && (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len)
                && confirm == password
                && !confirm.is_empty();
            assert_eq!(rule, expected, "case table disagrees with rule for {f:?}");
            assert_eq!(validate(&f).is_empty(), expected, "{f:?}");
        }
    }

    #[test]
    fn test_update_removes_fixed_field() {
        let mut f = form("", "Lovelace", "P@ssword123", "P@ssword123");
        let mut errors = validate(&f);
        assert!(errors.get(Field::FirstName).is_some());

        f.set(Field::FirstName, "Ada");
        errors.update(Field::FirstName, validate_field(&f, Field::FirstName));
        assert!(errors.is_empty());
    }
}
