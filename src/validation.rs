//! Credential Validation
//!
//! Turns raw registration and login payloads into [`NewAccount`] and
//! [`Credentials`]. Rule order is fixed: required fields, then password
//! confirmation, then password length, then field formats.

use crate::error::AuthError;
use crate::models::{Credentials, LoginRequest, NewAccount, RegisterRequest};

use validator::{Validate, ValidationErrors};

impl RegisterRequest {
    /// Validate a registration payload
    pub fn into_new_account(self, min_password_length: usize) -> Result<NewAccount, AuthError> {
        let username = required("username", self.username.as_deref())?;
        let email = required("email", self.email.as_deref())?;
        let password = required("password", self.password.as_deref())?;
        let password_confirm = required("password_confirm", self.password_confirm.as_deref())?;

        if password != password_confirm {
            return Err(AuthError::Validation(
                "password: Password fields do not match.".into(),
            ));
        }

        if password.chars().count() < min_password_length {
            return Err(AuthError::Validation(format!(
                "password: Password must be at least {min_password_length} characters long."
            )));
        }

        self.validate().map_err(flatten_errors)?;

        if !is_valid_username(username) {
            return Err(AuthError::Validation(
                "username: Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.".into(),
            ));
        }

        Ok(NewAccount {
            username: username.trim().to_string(),
            email: normalize_email(email),
            password: password.to_string(),
        })
    }
}

impl LoginRequest {
    /// Validate a login payload
    pub fn into_credentials(self) -> Result<Credentials, AuthError> {
        let (email, password) = match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
                (email, password)
            }
            _ => {
                return Err(AuthError::Validation(
                    "Email and password are required".into(),
                ))
            }
        };

        self.validate().map_err(flatten_errors)?;

        Ok(Credentials {
            email: normalize_email(email),
            password: password.to_string(),
        })
    }
}

/// Lower-case the domain part of an email address.
///
/// The local part is left untouched since some mail hosts treat it as
/// case-sensitive.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, AuthError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AuthError::Validation(format!(
            "{field}: This field is required."
        ))),
    }
}

fn is_valid_username(username: &str) -> bool {
    username
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

/// Render field errors as `field: message` lines, sorted by field name so
/// the output does not depend on map ordering.
fn flatten_errors(errors: ValidationErrors) -> AuthError {
    let mut lines: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{field}: {message}")
            })
        })
        .collect();
    lines.sort();

    AuthError::Validation(lines.join("; "))
}
