use crate::domain::{ExpiryPolicy, LoginReason, LoginRedirect};
use reqwest::StatusCode;

// Marker flask-jwt-extended puts in the 422 body when the token signature
// no longer verifies.
pub const SIGNATURE_FAILURE_MARKER: &str = "Signature verification failed";

// Expiry signal: a specific status plus a marker substring in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureFailurePolicy {
    pub status: StatusCode,
    pub marker: String,
}

impl SignatureFailurePolicy {
    pub fn new(status: StatusCode, marker: impl Into<String>) -> Self {
        Self {
            status,
            marker: marker.into(),
        }
    }
}

impl Default for SignatureFailurePolicy {
    fn default() -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, SIGNATURE_FAILURE_MARKER)
    }
}

impl ExpiryPolicy for SignatureFailurePolicy {
    fn is_expiry_signal(&self, status: StatusCode, body: &str) -> bool {
        status == self.status && !self.marker.is_empty() && body.contains(&self.marker)
    }
}

// Redirect for headless callers: there is nowhere to navigate, so log it.
#[derive(Debug, Clone)]
pub struct LogRedirect {
    login_path: String,
}

impl LogRedirect {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }
}

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self, reason: LoginReason) {
        match reason {
            LoginReason::SessionExpired => {
                tracing::warn!(login_path = %self.login_path, "session expired, login required.")
            }
            LoginReason::LoggedOut => {
                tracing::info!(login_path = %self.login_path, "logged out.")
            }
        }
    }
}

// Hands the login entry point to an application-supplied navigation hook.
pub struct CallbackRedirect<F> {
    login_path: String,
    navigate: F,
}

impl<F> CallbackRedirect<F>
where
    F: Fn(&str, LoginReason) + Send + Sync,
{
    pub fn new(login_path: impl Into<String>, navigate: F) -> Self {
        Self {
            login_path: login_path.into(),
            navigate,
        }
    }
}

impl<F> LoginRedirect for CallbackRedirect<F>
where
    F: Fn(&str, LoginReason) + Send + Sync,
{
    fn redirect_to_login(&self, reason: LoginReason) {
        (self.navigate)(&self.login_path, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn when_status_is_422_and_body_has_marker_then_it_is_an_expiry_signal() {
        let policy = SignatureFailurePolicy::default();

        assert!(policy.is_expiry_signal(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"msg":"Signature verification failed"}"#
        ));
    }

    #[test]
    fn when_422_is_an_ordinary_validation_error_then_it_is_not_expiry() {
        let policy = SignatureFailurePolicy::default();

        assert!(!policy.is_expiry_signal(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"msg":"title is required"}"#
        ));
    }

    #[test]
    fn when_marker_arrives_with_other_status_then_it_is_not_expiry() {
        let policy = SignatureFailurePolicy::default();

        assert!(!policy.is_expiry_signal(StatusCode::UNAUTHORIZED, SIGNATURE_FAILURE_MARKER));
    }

    #[test]
    fn when_marker_is_empty_then_nothing_counts_as_expiry() {
        let policy = SignatureFailurePolicy::new(StatusCode::UNPROCESSABLE_ENTITY, "");

        assert!(!policy.is_expiry_signal(StatusCode::UNPROCESSABLE_ENTITY, "anything"));
    }

    #[test]
    fn when_policy_is_a_closure_then_it_decides_expiry() {
        let policy = |status: StatusCode, body: &str| {
            status == StatusCode::UNAUTHORIZED && body.contains("token_expired")
        };

        assert!(policy.is_expiry_signal(StatusCode::UNAUTHORIZED, r#"{"code":"token_expired"}"#));
        assert!(!policy.is_expiry_signal(StatusCode::FORBIDDEN, r#"{"code":"token_expired"}"#));
    }

    #[test]
    fn when_callback_redirect_fires_then_navigation_hook_gets_login_path() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&visited);
        let redirect = CallbackRedirect::new("/login", move |path: &str, reason| {
            sink.lock().unwrap().push((path.to_string(), reason));
        });

        redirect.redirect_to_login(LoginReason::SessionExpired);

        assert_eq!(
            *visited.lock().unwrap(),
            vec![("/login".to_string(), LoginReason::SessionExpired)]
        );
    }
}
