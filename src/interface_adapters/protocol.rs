use serde::{Deserialize, Serialize};

use crate::domain::UserProfile;

// Request payload for admin login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

// Response payload for admin login.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

// Response payload for a profile update.
#[derive(Debug, Deserialize)]
pub struct ProfileUpdateResponse {
    #[serde(default)]
    pub msg: Option<String>,
    pub user: UserProfile,
}

// Newsletter subscription payloads.
#[derive(Debug, Serialize)]
pub struct SubscribeRequest<'a> {
    pub email: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UnsubscribeRequest<'a> {
    pub email: &'a str,
}
