//! Typed client for the church CMS REST backend.
//!
//! Every backend call goes through [`ApiClient`], which attaches the stored
//! session token, normalizes failures into [`ApiError`] and handles an
//! expired session by clearing the token and signalling a login redirect.

pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use domain::{
    ApiError, Credentials, FileUpload, LoginReason, Method, ProfileUpdate, RequestDescriptor,
    RequestOptions, SessionError, SessionToken, UserProfile,
};
pub use frameworks::{ClientConfig, build_api_client};
pub use interface_adapters::api_client::ApiClient;
pub use interface_adapters::resources::{QueryFilters, Resource, ResourceClient};
pub use interface_adapters::token_store::{FileTokenStore, MemoryTokenStore};
