//! User directory helpers: search, status badges and the registration form.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::model::User;
use crate::EntityId;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Badge shown next to a user in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Inactive,
    Unverified,
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UserStatus::Active => "Active",
            UserStatus::Inactive => "Inactive",
            UserStatus::Unverified => "Unverified",
        };
        f.write_str(label)
    }
}

impl User {
    /// Inactive wins over unverified.
    pub fn status_badge(&self) -> UserStatus {
        if !self.is_active {
            UserStatus::Inactive
        } else if !self.is_verified {
            UserStatus::Unverified
        } else {
            UserStatus::Active
        }
    }

    /// Case-insensitive match on full name, email or username.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [&self.full_name, &self.email, &self.user_name]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&term))
    }

    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .or(self.user_name.as_deref())
            .unwrap_or("(unnamed)")
    }
}

/// Users matching a search term; an empty term matches everyone.
pub fn filter_users<'a>(users: &'a [User], term: &str) -> Vec<&'a User> {
    users.iter().filter(|u| u.matches(term)).collect()
}

/// Validation failures keyed by form field.
pub type FieldErrors = BTreeMap<&'static str, String>;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").expect("static email pattern"))
}

/// Registration form for a new console user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub full_name: String,
    pub user_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
    pub contact_no: String,
    pub user_type: String,
    pub role_id: EntityId,
    pub gender: String,
    pub dob: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub is_active: bool,
    pub is_staff: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            user_name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            contact_no: String::new(),
            user_type: "user".to_string(),
            role_id: 0,
            gender: "male".to_string(),
            dob: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            is_active: true,
            is_staff: false,
        }
    }
}

impl UserForm {
    /// Check every field and report all failures at once.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.full_name.trim().is_empty() {
            errors.insert("fullName", "Full name is required".into());
        }
        if self.user_name.trim().is_empty() {
            errors.insert("userName", "Username is required".into());
        }
        if self.email.trim().is_empty() {
            errors.insert("email", "Email is required".into());
        } else if !email_pattern().is_match(&self.email) {
            errors.insert("email", "Email is invalid".into());
        }
        if self.password.is_empty() {
            errors.insert("password", "Password is required".into());
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            );
        }
        if self.password != self.confirm_password {
            errors.insert("confirmPassword", "Passwords do not match".into());
        }
        if self.contact_no.trim().is_empty() {
            errors.insert("contactNo", "Contact number is required".into());
        }
        if self.user_type.trim().is_empty() {
            errors.insert("userType", "User type is required".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
