use reqwest::StatusCode;
use thiserror::Error;

// Failure taxonomy produced by the API client. Callers branch on these and
// decide presentation themselves.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request path `{0}`: expected a server-relative path starting with `/`")]
    InvalidPath(String),

    #[error("invalid header `{0}`")]
    InvalidHeader(String),

    #[error("request body could not be serialized: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("network failure: {0}")]
    Network(#[source] reqwest::Error),

    #[error("http error {status}")]
    Http { status: StatusCode, body: String },

    #[error("session expired, login required")]
    AuthExpired,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),

    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl ApiError {
    // Status code for server-side failures, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, ApiError::AuthExpired)
    }
}

// Errors raised by session token storage backends.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("token storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage lock poisoned")]
    Poisoned,
}

// Errors raised while persisting a downloaded file.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid download file name `{0}`")]
    InvalidFileName(String),

    #[error("failed to save download: {0}")]
    Io(#[from] std::io::Error),
}

// Errors for the session workflows (login, logout, profile, verification).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("username and password are required")]
    MissingCredentials,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("profile update has no fields to change")]
    EmptyProfileUpdate,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Storage(#[from] TokenStoreError),
}
