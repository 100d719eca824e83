pub mod entities;
pub mod errors;
pub mod identity;
pub mod ports;
pub mod request;

// Re-export the domain boundary types and ports.
pub use entities::{Credentials, LoginReason, ProfileUpdate, SessionToken, UserProfile};
pub use errors::{ApiError, DownloadError, SessionError, TokenStoreError};
pub use identity::{TokenIdentity, decode_token_identity, default_admin_profile};
pub use ports::{Clock, DownloadSink, ExpiryPolicy, LoginRedirect, SessionBackend, TokenStore};
pub use request::{FileUpload, Method, RequestDescriptor, RequestOptions, validate_path};
