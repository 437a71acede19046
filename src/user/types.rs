/// User type definitions and input validators

use crate::enums::string_enum;
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._+%-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

string_enum! {
    /// System-wide and per-project role of a user
    pub enum UserRole {
        SuperAdmin => "super_admin",
        Admin => "admin",
        ProjectAdmin => "project_admin",
        Developer => "developer",
        Tester => "tester",
        Viewer => "viewer",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Developer
    }
}

impl UserRole {
    /// Roles allowed to edit project settings, including the workflow
    pub fn can_manage_projects(&self) -> bool {
        matches!(self, UserRole::SuperAdmin | UserRole::Admin | UserRole::ProjectAdmin)
    }
}

/// A registered user
///
/// The password hash is accepted from storage but never serialized outward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    #[serde(default, skip_serializing)]
    pub hashed_password: String,
    #[serde(default)]
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub email_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a new active user from validated input
    pub fn create(input: UserCreate, hashed_password: String, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let input = input.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            email: input.email,
            username: input.username,
            full_name: input.full_name,
            hashed_password,
            role: UserRole::default(),
            avatar_url: None,
            is_active: true,
            email_verified: false,
            last_login_at: None,
            created_at: now,
            updated_at: None,
        })
    }

    /// Compact form embedded in other resources
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            avatar_url: self.avatar_url.clone(),
            role: self.role,
        }
    }
}

/// User reference nested inside issues, comments and notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: UserRole,
}

/// Registration input
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub full_name: Option<String>,
    pub password: String,
}

impl UserCreate {
    /// Validate and normalize (email and username lowercased)
    pub fn validate(self) -> Result<Self, ValidationError> {
        validate_password(&self.password)?;
        Ok(Self {
            email: normalize_email(&self.email)?,
            username: normalize_username(&self.username)?,
            ..self
        })
    }
}

/// Profile update input; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<UserRole>,
}

impl UserUpdate {
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            email: self.email.as_deref().map(normalize_email).transpose()?,
            username: self.username.as_deref().map(normalize_username).transpose()?,
            ..self
        })
    }
}

/// Password change input
#[derive(Debug, Clone, Deserialize)]
pub struct UserChangePassword {
    pub current_password: String,
    pub new_password: String,
}

impl UserChangePassword {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_password(&self.new_password).map_err(|e| ValidationError::new("new_password", e.message))
    }
}

/// Check email format and lowercase it
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::new("email", "invalid email format"));
    }
    Ok(email.to_lowercase())
}

/// Usernames are at least 3 alphanumeric characters, stored lowercased
pub fn normalize_username(username: &str) -> Result<String, ValidationError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::new(
            "username",
            format!("must be at least {} characters", MIN_USERNAME_LEN),
        ));
    }
    if !username.chars().all(char::is_alphanumeric) {
        return Err(ValidationError::new("username", "must be alphanumeric"));
    }
    Ok(username.to_lowercase())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}
