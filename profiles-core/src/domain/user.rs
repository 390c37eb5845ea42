//! User domain model

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::email::Email;
use super::extra_fields::ExtraFields;
use super::identity::{BaseIdentity, PasswordHashable};
use super::result::{Error, Result};

/// The field used as the login identifier
pub const USERNAME_FIELD: &str = "email";

/// Fields prompted for when creating a superuser interactively
pub const REQUIRED_FIELDS: &[&str] = &["first_name", "last_name"];

/// Maximum length of first and last names, in characters
pub const NAME_MAX_LENGTH: usize = 150;

/// An account identified by its email address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
    pub identity: BaseIdentity,
}

impl User {
    /// Create an active, non-staff account joined now, with an unusable
    /// password
    pub fn new(email: Email) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            first_name: String::new(),
            last_name: String::new(),
            date_joined: Utc::now(),
            identity: BaseIdentity::default(),
        }
    }

    /// The login identifier
    pub fn username(&self) -> &str {
        self.email.as_ref()
    }

    /// First and last name separated by a space
    pub fn get_full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn get_short_name(&self) -> &str {
        &self.first_name
    }

    pub fn is_active(&self) -> bool {
        self.identity.is_active
    }

    pub fn is_staff(&self) -> bool {
        self.identity.is_staff
    }

    pub fn is_superuser(&self) -> bool {
        self.identity.is_superuser
    }

    /// Apply every extra field, stopping at the first bad one
    pub fn apply_fields(&mut self, fields: &ExtraFields) -> Result<()> {
        for (name, value) in fields.iter() {
            self.apply_field(name, value)?;
        }
        Ok(())
    }

    /// Set one field by name from a JSON value
    pub fn apply_field(&mut self, name: &str, value: &Value) -> Result<()> {
        match name {
            "first_name" => self.first_name = expect_string(name, value)?,
            "last_name" => self.last_name = expect_string(name, value)?,
            "is_active" => self.identity.is_active = expect_bool(name, value)?,
            "is_staff" => self.identity.is_staff = expect_bool(name, value)?,
            "is_superuser" => self.identity.is_superuser = expect_bool(name, value)?,
            "date_joined" => self.date_joined = expect_timestamp(name, value)?,
            "last_login" => {
                self.identity.last_login = match value {
                    Value::Null => None,
                    other => Some(expect_timestamp(name, other)?),
                }
            }
            "id" | "email" | "password" => return Err(Error::ReservedField(name.to_string())),
            other => return Err(Error::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Validate record data before persisting
    pub fn validate(&self) -> Result<()> {
        if self.email.as_ref().is_empty() {
            return Err(Error::MissingField("email"));
        }
        check_name_length("first_name", &self.first_name)?;
        check_name_length("last_name", &self.last_name)?;
        self.identity.check_flags()
    }
}

impl PasswordHashable for User {
    fn identity(&self) -> &BaseIdentity {
        &self.identity
    }

    fn identity_mut(&mut self) -> &mut BaseIdentity {
        &mut self.identity
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.email.as_ref())
    }
}

fn check_name_length(field: &str, value: &str) -> Result<()> {
    let len = value.chars().count();
    if len > NAME_MAX_LENGTH {
        return Err(Error::invalid_format(
            field,
            format!("at most {} characters allowed, got {}", NAME_MAX_LENGTH, len),
        ));
    }
    Ok(())
}

fn expect_string(field: &str, value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_format(field, "expected a string"))
}

fn expect_bool(field: &str, value: &Value) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| Error::invalid_format(field, "expected a boolean"))
}

fn expect_timestamp(field: &str, value: &Value) -> Result<DateTime<Utc>> {
    let raw = value
        .as_str()
        .ok_or_else(|| Error::invalid_format(field, "expected an RFC 3339 timestamp"))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::invalid_format(field, e.to_string()))
}
