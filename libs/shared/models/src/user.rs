use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::validation::{require_non_blank, validate_email};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[serde(alias = "cliente", alias = "tutor")]
    Client,
    #[serde(alias = "veterinario", alias = "vet")]
    Veterinarian,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Client => write!(f, "client"),
            UserRole::Veterinarian => write!(f, "veterinarian"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable contact fields; identity and role never change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl User {
    pub fn new(id: Uuid, name: String, email: String, phone: Option<String>, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            email,
            phone,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        validate_email("email", &self.email)?;
        if let Some(phone) = &self.phone {
            require_non_blank("phone", phone)?;
        }
        Ok(())
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }

    /// Apply a contact update, validating the result before it is kept.
    pub fn apply_contact_update(&mut self, update: ContactUpdate) -> Result<(), ValidationError> {
        let mut next = self.clone();
        if let Some(name) = update.name {
            next.name = name;
        }
        if let Some(email) = update.email {
            next.email = email;
        }
        if update.phone.is_some() {
            next.phone = update.phone;
        }
        next.validate()?;

        next.updated_at = Utc::now();
        *self = next;
        Ok(())
    }
}
