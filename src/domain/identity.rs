use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::domain::entities::{SessionToken, UserProfile};

// Fallback identity shown when the profile endpoint is unreachable.
const DEFAULT_USERNAME: &str = "Admin User";
const DEFAULT_MAILBOX: &str = "admin";

// Identity embedded in the token subject as `<id>:<username>:<is_admin>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: Option<u64>,
    pub username: Option<String>,
    pub is_admin: bool,
}

#[derive(Deserialize)]
struct Claims {
    sub: String,
}

// Reads the subject claim without checking the signature. Only used for
// display; authorization stays with the server.
pub fn decode_token_identity(token: &SessionToken) -> Option<TokenIdentity> {
    let payload = token.as_str().split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;

    let mut parts = claims.sub.splitn(3, ':');
    let user_id = parts.next().and_then(|id| id.parse().ok());
    let username = parts
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    let is_admin = parts.next() == Some("True");

    Some(TokenIdentity {
        user_id,
        username,
        is_admin,
    })
}

impl TokenIdentity {
    pub fn into_profile(self, email_domain: &str) -> UserProfile {
        let email = format!(
            "{}@{email_domain}",
            self.username.as_deref().unwrap_or(DEFAULT_MAILBOX)
        );
        UserProfile {
            id: self.user_id,
            username: self.username.unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            email,
            is_admin: self.is_admin,
            active: None,
            created_at: None,
            last_login: None,
        }
    }
}

pub fn default_admin_profile(email_domain: &str) -> UserProfile {
    UserProfile {
        id: None,
        username: DEFAULT_USERNAME.to_string(),
        email: format!("{DEFAULT_MAILBOX}@{email_domain}"),
        is_admin: true,
        active: None,
        created_at: None,
        last_login: None,
    }
}

#[cfg(test)]
pub(crate) fn token_with_subject(subject: &str) -> SessionToken {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "sub": subject }).to_string());
    SessionToken::new(format!("{header}.{payload}.signature"))
}
