use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::entities::{
    Credentials, LoginReason, ProfileUpdate, SessionToken, UserProfile,
};
use crate::domain::errors::{ApiError, DownloadError, TokenStoreError};

// Port for the persisted session token. Reads and writes are synchronous.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionToken>, TokenStoreError>;
    fn save(&self, token: &SessionToken) -> Result<(), TokenStoreError>;
    fn clear(&self) -> Result<(), TokenStoreError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn load(&self) -> Result<Option<SessionToken>, TokenStoreError> {
        (**self).load()
    }

    fn save(&self, token: &SessionToken) -> Result<(), TokenStoreError> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        (**self).clear()
    }
}

// Decides whether a failed response means "token expired, log in again".
pub trait ExpiryPolicy: Send + Sync {
    fn is_expiry_signal(&self, status: StatusCode, body: &str) -> bool;
}

impl<F> ExpiryPolicy for F
where
    F: Fn(StatusCode, &str) -> bool + Send + Sync,
{
    fn is_expiry_signal(&self, status: StatusCode, body: &str) -> bool {
        self(status, body)
    }
}

// Navigation is owned by the application shell; the client only signals.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self, reason: LoginReason);
}

impl<T: LoginRedirect + ?Sized> LoginRedirect for Arc<T> {
    fn redirect_to_login(&self, reason: LoginReason) {
        (**self).redirect_to_login(reason)
    }
}

// Destination for binary downloads. Returns where the file ended up.
pub trait DownloadSink: Send + Sync {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, DownloadError>;
}

// Port for retrieving the current date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

// The session endpoints the use cases depend on.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken, ApiError>;
    async fn fetch_profile(&self) -> Result<UserProfile, ApiError>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError>;
    async fn verify(&self) -> Result<(), ApiError>;
}
