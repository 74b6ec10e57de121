//! Form schema and validation.
//!
//! # Design
//! - Inputs stay as raw strings so editing is lossless; parsing happens on validation.
//! - Each field reports at most one violation, the first rule it breaks.
//! - Violations are translation keys so the view can render them in any language.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Minimum accepted name length in characters.
pub const NAME_MIN_CHARS: usize = 2;
/// Maximum accepted name length in characters.
pub const NAME_MAX_CHARS: usize = 50;
/// Youngest accepted age.
pub const AGE_MIN: u8 = 18;
/// Oldest accepted age.
pub const AGE_MAX: u8 = 120;
/// Minimum password length in characters.
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Translation keys for every validation message.
pub mod error_keys {
    /// Name shorter than the minimum.
    pub const NAME_TOO_SHORT: &str = "form.errors.nameTooShort";
    /// Name longer than the maximum.
    pub const NAME_TOO_LONG: &str = "form.errors.nameTooLong";
    /// Malformed email address.
    pub const EMAIL_INVALID: &str = "form.errors.emailInvalid";
    /// Age is not an integer.
    pub const AGE_NOT_NUMBER: &str = "form.errors.ageNotNumber";
    /// Age below the minimum.
    pub const AGE_TOO_YOUNG: &str = "form.errors.ageTooYoung";
    /// Age above the maximum.
    pub const AGE_TOO_OLD: &str = "form.errors.ageTooOld";
    /// Password shorter than the minimum.
    pub const PASSWORD_TOO_SHORT: &str = "form.errors.passwordTooShort";
    /// Password lacks an uppercase letter.
    pub const PASSWORD_UPPERCASE: &str = "form.errors.passwordUppercase";
    /// Password lacks a lowercase letter.
    pub const PASSWORD_LOWERCASE: &str = "form.errors.passwordLowercase";
    /// Password lacks a digit.
    pub const PASSWORD_NUMBER: &str = "form.errors.passwordNumber";
    /// Confirmation differs from the password.
    pub const PASSWORD_MISMATCH: &str = "form.errors.passwordMismatch";
    /// Terms not accepted.
    pub const TERMS_REQUIRED: &str = "form.errors.termsRequired";
}

static EMAIL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .map_err(|err| tracing::error!(error = %err, "email pattern failed to compile"))
        .ok()
});

/// Form fields in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Full name.
    Name,
    /// Email address.
    Email,
    /// Optional age.
    Age,
    /// Password.
    Password,
    /// Password confirmation.
    ConfirmPassword,
    /// Terms acceptance checkbox.
    Terms,
}

impl Field {
    /// Every field in display order.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Name,
            Self::Email,
            Self::Age,
            Self::Password,
            Self::ConfirmPassword,
            Self::Terms,
        ]
    }

    /// Input `name` attribute and JSON key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Age => "age",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Terms => "terms",
        }
    }

    /// Translation key for the field label.
    #[must_use]
    pub const fn label_key(self) -> &'static str {
        match self {
            Self::Name => "form.name.label",
            Self::Email => "form.email.label",
            Self::Age => "form.age.label",
            Self::Password => "form.password.label",
            Self::ConfirmPassword => "form.confirmPassword.label",
            Self::Terms => "form.terms.label",
        }
    }
}

/// Raw, unvalidated form contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormInput {
    /// Full name as typed.
    pub name: String,
    /// Email as typed.
    pub email: String,
    /// Age as typed; blank means not provided.
    pub age: String,
    /// Password as typed.
    pub password: String,
    /// Confirmation as typed.
    pub confirm_password: String,
    /// Terms checkbox.
    pub terms: bool,
}

impl FormInput {
    /// Current text of a text field; `None` for the checkbox.
    #[must_use]
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => Some(&self.name),
            Field::Email => Some(&self.email),
            Field::Age => Some(&self.age),
            Field::Password => Some(&self.password),
            Field::ConfirmPassword => Some(&self.confirm_password),
            Field::Terms => None,
        }
    }

    /// Mutable slot for a text field; `None` for the checkbox.
    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Name => Some(&mut self.name),
            Field::Email => Some(&mut self.email),
            Field::Age => Some(&mut self.age),
            Field::Password => Some(&mut self.password),
            Field::ConfirmPassword => Some(&mut self.confirm_password),
            Field::Terms => None,
        }
    }
}

/// Form contents that passed every rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedForm {
    /// Full name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Age, when provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    /// Password.
    pub password: String,
    /// Password confirmation.
    pub confirm_password: String,
    /// Always `true` once validated.
    pub terms: bool,
}

impl ValidatedForm {
    /// Pretty JSON for display with both password fields masked.
    #[must_use]
    pub fn redacted_json(&self) -> String {
        let redacted = Self {
            password: "***".to_string(),
            confirm_password: "***".to_string(),
            ..self.clone()
        };
        serde_json::to_string_pretty(&redacted).unwrap_or_default()
    }
}

/// First violation per field, as translation keys.
pub type FieldErrors = BTreeMap<Field, &'static str>;

/// Check every rule and return either the typed form or the per-field violations.
///
/// # Errors
///
/// Returns the [`FieldErrors`] map when at least one field is invalid.
pub fn validate(input: &FormInput) -> Result<ValidatedForm, FieldErrors> {
    let mut errors = FieldErrors::new();
    if let Err(key) = check_name(&input.name) {
        errors.insert(Field::Name, key);
    }
    if let Err(key) = check_email(&input.email) {
        errors.insert(Field::Email, key);
    }
    let age = check_age(&input.age).unwrap_or_else(|key| {
        errors.insert(Field::Age, key);
        None
    });
    if let Err(key) = check_password(&input.password) {
        errors.insert(Field::Password, key);
    }
    if input.password != input.confirm_password {
        errors.insert(Field::ConfirmPassword, error_keys::PASSWORD_MISMATCH);
    }
    if !input.terms {
        errors.insert(Field::Terms, error_keys::TERMS_REQUIRED);
    }
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(ValidatedForm {
        name: input.name.clone(),
        email: input.email.clone(),
        age,
        password: input.password.clone(),
        confirm_password: input.confirm_password.clone(),
        terms: input.terms,
    })
}

fn check_name(name: &str) -> Result<(), &'static str> {
    let chars = name.chars().count();
    if chars < NAME_MIN_CHARS {
        Err(error_keys::NAME_TOO_SHORT)
    } else if chars > NAME_MAX_CHARS {
        Err(error_keys::NAME_TOO_LONG)
    } else {
        Ok(())
    }
}

/// Whether `email` looks like a deliverable address.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.')
        && !email.contains("..")
        && EMAIL_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(email))
}

fn check_email(email: &str) -> Result<(), &'static str> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(error_keys::EMAIL_INVALID)
    }
}

fn check_age(raw: &str) -> Result<Option<u8>, &'static str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let age = trimmed
        .parse::<i64>()
        .map_err(|_| error_keys::AGE_NOT_NUMBER)?;
    if age < i64::from(AGE_MIN) {
        return Err(error_keys::AGE_TOO_YOUNG);
    }
    u8::try_from(age)
        .ok()
        .filter(|age| *age <= AGE_MAX)
        .map(Some)
        .ok_or(error_keys::AGE_TOO_OLD)
}

fn check_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        Err(error_keys::PASSWORD_TOO_SHORT)
    } else if !password.chars().any(|ch| ch.is_ascii_uppercase()) {
        Err(error_keys::PASSWORD_UPPERCASE)
    } else if !password.chars().any(|ch| ch.is_ascii_lowercase()) {
        Err(error_keys::PASSWORD_LOWERCASE)
    } else if !password.chars().any(|ch| ch.is_ascii_digit()) {
        Err(error_keys::PASSWORD_NUMBER)
    } else {
        Ok(())
    }
}
