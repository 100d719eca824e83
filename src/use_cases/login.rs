use reqwest::StatusCode;

use crate::domain::{ApiError, Credentials, SessionBackend, SessionError, SessionToken, TokenStore};

// Admin login use case with injected dependencies.
pub struct LoginUseCase<B, S> {
    pub backend: B,
    pub store: S,
}

impl<B, S> LoginUseCase<B, S>
where
    B: SessionBackend,
    S: TokenStore,
{
    pub async fn execute(&self, credentials: Credentials) -> Result<SessionToken, SessionError> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }

        let token = self
            .backend
            .login(&credentials)
            .await
            .map_err(|err| match err {
                ApiError::Http { status, .. } if status == StatusCode::UNAUTHORIZED => {
                    SessionError::InvalidCredentials
                }
                other => SessionError::Api(other),
            })?;

        self.store.save(&token)?;
        tracing::info!(username = %credentials.username, "admin logged in.");
        Ok(token)
    }
}
