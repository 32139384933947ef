use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::ApiError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_required(value: &str, field: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Registration payload. The password lives here only until it is hashed.
#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub nick: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// Trim surrounding whitespace and lowercase the email, then check every
    /// field. Login lowercases the submitted email the same way, so a
    /// mixed-case registration still matches at login.
    pub fn normalize_and_validate(&mut self) -> Result<(), ApiError> {
        self.name = self.name.trim().to_string();
        self.nick = self.nick.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.password = self.password.trim().to_string();

        check_required(&self.name, "name")?;
        check_required(&self.nick, "nick")?;
        check_required(&self.email, "email")?;
        check_required(&self.password, "password")?;
        if !is_valid_email(&self.email) {
            return Err(ApiError::Validation("email is invalid".into()));
        }
        Ok(())
    }
}

/// Update payload; no password field on purpose.
#[derive(Debug, Deserialize)]
pub struct UserUpdate {
    pub name: String,
    pub nick: String,
    pub email: String,
}

impl UserUpdate {
    pub fn normalize_and_validate(&mut self) -> Result<(), ApiError> {
        self.name = self.name.trim().to_string();
        self.nick = self.nick.trim().to_string();
        self.email = self.email.trim().to_lowercase();

        check_required(&self.name, "name")?;
        check_required(&self.nick, "nick")?;
        check_required(&self.email, "email")?;
        if !is_valid_email(&self.email) {
            return Err(ApiError::Validation("email is invalid".into()));
        }
        Ok(())
    }
}

/// Query string for GET /users.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub user: String,
}
