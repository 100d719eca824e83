use crate::domain::{
    ApiError, ProfileUpdate, SessionBackend, SessionError, TokenStore, UserProfile, decode_token_identity,
    default_admin_profile,
};

// Profile lookup and update for the signed-in admin.
pub struct ProfileUseCase<B, S> {
    pub backend: B,
    pub store: S,
    // Mail domain used when the profile has to be rebuilt from the token.
    pub email_domain: String,
}

impl<B, S> ProfileUseCase<B, S>
where
    B: SessionBackend,
    S: TokenStore,
{
    /// Returns the signed-in admin, or `None` when no token is stored.
    ///
    /// When the profile endpoint fails the identity is rebuilt from the
    /// token subject, and failing that a generic admin identity is used.
    pub async fn current_user(&self) -> Result<Option<UserProfile>, SessionError> {
        let Some(token) = self.store.load()? else {
            return Ok(None);
        };

        match self.backend.fetch_profile().await {
            Ok(profile) => Ok(Some(profile)),
            // The client has already dropped the token and asked for a login.
            Err(ApiError::AuthExpired) => Ok(None),
            Err(err) => {
                tracing::warn!(error = %err, "profile fetch failed; using token identity.");
                let profile = decode_token_identity(&token)
                    .map(|identity| identity.into_profile(&self.email_domain))
                    .unwrap_or_else(|| default_admin_profile(&self.email_domain));
                Ok(Some(profile))
            }
        }
    }

    pub async fn update(&self, update: ProfileUpdate) -> Result<UserProfile, SessionError> {
        if update.is_empty() {
            return Err(SessionError::EmptyProfileUpdate);
        }
        let profile = self.backend.update_profile(&update).await?;
        tracing::info!(username = %profile.username, "profile updated.");
        Ok(profile)
    }
}
