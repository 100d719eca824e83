use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::domain::{
    ApiError, Credentials, LoginReason, LoginRedirect, ProfileUpdate, SessionBackend,
    SessionToken, TokenStore, TokenStoreError, UserProfile,
};
use crate::interface_adapters::token_store::MemoryTokenStore;

// Failure a fake backend call should produce.
#[derive(Clone, Copy, Debug)]
pub(crate) enum FakeFailure {
    Http(StatusCode),
    Expired,
    Malformed,
}

impl FakeFailure {
    fn to_error(self) -> ApiError {
        match self {
            FakeFailure::Http(status) => ApiError::Http {
                status,
                body: String::new(),
            },
            FakeFailure::Expired => ApiError::AuthExpired,
            FakeFailure::Malformed => ApiError::MalformedResponse("not json".to_string()),
        }
    }
}

pub(crate) fn sample_profile() -> UserProfile {
    UserProfile {
        id: Some(1),
        username: "pastor".to_string(),
        email: "pastor@example.org".to_string(),
        is_admin: true,
        active: Some(true),
        created_at: None,
        last_login: None,
    }
}

// Scripted session backend that records which endpoints were hit.
pub(crate) struct FakeBackend {
    pub(crate) login_result: Result<&'static str, FakeFailure>,
    pub(crate) profile_result: Result<UserProfile, FakeFailure>,
    pub(crate) verify_result: Result<(), FakeFailure>,
    pub(crate) calls: Arc<Mutex<Vec<&'static str>>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            login_result: Ok("issued-token"),
            profile_result: Ok(sample_profile()),
            verify_result: Ok(()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeBackend {
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    async fn login(&self, _credentials: &Credentials) -> Result<SessionToken, ApiError> {
        self.record("login");
        self.login_result
            .map(SessionToken::new)
            .map_err(FakeFailure::to_error)
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.record("fetch_profile");
        self.profile_result.clone().map_err(FakeFailure::to_error)
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.record("update_profile");
        let mut profile = self.profile_result.clone().map_err(FakeFailure::to_error)?;
        if let Some(username) = &update.username {
            profile.username = username.clone();
        }
        if let Some(email) = &update.email {
            profile.email = email.clone();
        }
        Ok(profile)
    }

    async fn verify(&self) -> Result<(), ApiError> {
        self.record("verify");
        self.verify_result.map_err(FakeFailure::to_error)
    }
}

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub load: bool,
    pub save: bool,
    pub clear: bool,
}

// Token store with injectable failures.
#[derive(Clone, Default)]
pub(crate) struct RecordingStore {
    inner: MemoryTokenStore,
    failures: FailureFlags,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_token(token: &str) -> Self {
        Self {
            inner: MemoryTokenStore::with_token(SessionToken::new(token)),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn current(&self) -> Option<SessionToken> {
        self.inner.load().expect("memory store load")
    }
}

fn injected_failure() -> TokenStoreError {
    TokenStoreError::Io(std::io::Error::other("injected failure"))
}

impl TokenStore for RecordingStore {
    fn load(&self) -> Result<Option<SessionToken>, TokenStoreError> {
        if self.failures.load {
            return Err(injected_failure());
        }
        self.inner.load()
    }

    fn save(&self, token: &SessionToken) -> Result<(), TokenStoreError> {
        if self.failures.save {
            return Err(injected_failure());
        }
        self.inner.save(token)
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        if self.failures.clear {
            return Err(injected_failure());
        }
        self.inner.clear()
    }
}

// Collects redirect requests instead of navigating.
#[derive(Clone, Default)]
pub(crate) struct RecordingRedirect {
    reasons: Arc<Mutex<Vec<LoginReason>>>,
}

impl RecordingRedirect {
    pub(crate) fn reasons(&self) -> Vec<LoginReason> {
        self.reasons.lock().expect("reasons mutex poisoned").clone()
    }
}

impl LoginRedirect for RecordingRedirect {
    fn redirect_to_login(&self, reason: LoginReason) {
        self.reasons
            .lock()
            .expect("reasons mutex poisoned")
            .push(reason);
    }
}
