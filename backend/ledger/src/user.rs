use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, validate};

pub const MIN_PASSWORD_LEN: usize = 6;

labels! {
    Role {
        User => "USER",
        Admin => "ADMIN",
    }
}

/// Stored account. The hash is persisted but never leaves the server; use
/// [`Profile`] for responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

impl_record!(User, "users", |u| vec![
    ("username", u.username.clone()),
    ("email", u.email.clone()),
]);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl Registration {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate::required("username", &self.username)?;
        validate::email("email", &self.email)?;

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(LedgerError::InvalidField {
                field: "password",
                reason: format!("must be at least {MIN_PASSWORD_LEN} characters"),
            });
        }

        Ok(())
    }
}

impl User {
    pub fn create(registration: &Registration, password_hash: String, now: NaiveDateTime) -> Self {
        User {
            id: 0,
            username: registration.username.trim().to_string(),
            email: registration.email.trim().to_string(),
            password_hash,
            role: Role::User,
            created_at: now,
        }
    }

    pub fn answers_to(&self, username_or_email: &str) -> bool {
        let login = username_or_email.trim();
        self.username == login || self.email == login
    }

    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}
