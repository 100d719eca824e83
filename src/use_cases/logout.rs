use crate::domain::{LoginReason, LoginRedirect, SessionError, TokenStore};

// Logout use case: forget the token locally and send the user to login.
pub struct LogoutUseCase<S, R> {
    pub store: S,
    pub redirect: R,
}

impl<S, R> LogoutUseCase<S, R>
where
    S: TokenStore,
    R: LoginRedirect,
{
    pub fn execute(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        self.redirect.redirect_to_login(LoginReason::LoggedOut);
        Ok(())
    }
}
