use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque bearer credential issued by the backend at login.
///
/// The client never decodes it for validity; the server decides when it has
/// expired. `Debug` is redacted so the value never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

// Admin login credentials.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// Admin profile as reported by the backend, or reconstructed from the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<u64>,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

// Fields an admin may change on their own profile; unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        let blank = |field: &Option<String>| field.as_deref().is_none_or(|v| v.trim().is_empty());
        blank(&self.username) && blank(&self.email)
    }
}

// Why the application is being sent back to the login entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginReason {
    SessionExpired,
    LoggedOut,
}
