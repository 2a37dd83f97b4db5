//! User entity definitions

use md5::{Digest, Md5};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::SshKey;
use crate::types::UserError;

/// Longest username accepted from untrusted input
pub const USERNAME_MAX_LEN: usize = 24;

/// Path segments a username would shadow at the top level of the site
pub const RESERVED_USERNAMES: &[&str] = &[
    "assets",
    "register",
    "login",
    "logout",
    "settings",
    "admin-panel",
    "all",
    "search",
    "init",
    "healthcheck",
    "preview",
    "embed",
    "metrics",
];

/// User entity representing an account in the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Already hashed by the caller, stored as-is
    #[serde(default, skip_serializing)]
    pub password: String,
    pub is_admin: bool,
    /// Unix seconds; 0 means "not persisted yet"
    pub created_at: i64,
    pub email: Option<String>,
    pub md5_hash: String,
    /// Only populated by lookups that load keys eagerly
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<SshKey>,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>, email: Option<String>) -> Self {
        let email = email.filter(|e| !e.trim().is_empty());
        let md5_hash = avatar_hash(email.as_deref());

        Self {
            id: 0,
            username: username.into(),
            password: password.into(),
            is_admin: false,
            created_at: 0,
            email,
            md5_hash,
            ssh_keys: Vec::new(),
        }
    }

    /// Replace the email and recompute the avatar hash with it
    pub fn set_email(&mut self, email: Option<String>) {
        self.email = email.filter(|e| !e.trim().is_empty());
        self.md5_hash = avatar_hash(self.email.as_deref());
    }
}

/// Gravatar-style hash: MD5 of the normalised email, random when there is none.
pub fn avatar_hash(email: Option<&str>) -> String {
    let mut hasher = Md5::new();
    match email {
        Some(email) => hasher.update(email.trim().to_lowercase().as_bytes()),
        None => {
            let mut bytes = [0u8; 16];
            rand::thread_rng().fill_bytes(&mut bytes);
            hasher.update(bytes);
        }
    }
    format!("{:x}", hasher.finalize())
}

/// Untrusted sign-up input, checked before a `User` is built from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub username: String,
    pub password: String,
}

impl UserDto {
    pub fn validate(&self) -> Result<(), UserError> {
        if self.username.is_empty() {
            return Err(UserError::Validation("username is required".to_string()));
        }

        if self.username.chars().count() > USERNAME_MAX_LEN {
            return Err(UserError::Validation(format!(
                "username must be at most {USERNAME_MAX_LEN} characters long"
            )));
        }

        if !self.username.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(UserError::Validation(
                "username can only contain letters and numbers".to_string(),
            ));
        }

        let lowered = self.username.to_ascii_lowercase();
        if RESERVED_USERNAMES.contains(&lowered.as_str()) {
            return Err(UserError::Validation(format!(
                "username {} is reserved",
                self.username
            )));
        }

        if self.password.is_empty() {
            return Err(UserError::Validation("password is required".to_string()));
        }

        Ok(())
    }

    /// Build an unsaved user. Callers hash the password before or after this step.
    pub fn into_user(self) -> User {
        User::new(self.username, self.password, None)
    }
}
