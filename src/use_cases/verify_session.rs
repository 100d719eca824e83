use crate::domain::{SessionBackend, SessionError, TokenStore};

// Checks the stored token against the backend. A rejected or unverifiable
// token is dropped so the next screen asks for a login.
pub struct VerifySessionUseCase<B, S> {
    pub backend: B,
    pub store: S,
}

impl<B, S> VerifySessionUseCase<B, S>
where
    B: SessionBackend,
    S: TokenStore,
{
    pub async fn execute(&self) -> Result<bool, SessionError> {
        if self.store.load()?.is_none() {
            return Ok(false);
        }

        match self.backend.verify().await {
            Ok(()) => Ok(true),
            Err(err) => {
                tracing::warn!(error = %err, "session verification failed; dropping token.");
                self.store.clear()?;
                Ok(false)
            }
        }
    }
}
