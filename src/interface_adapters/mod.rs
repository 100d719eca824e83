pub mod api_client;
pub mod downloads;
pub mod expiry;
pub mod media;
pub mod protocol;
pub mod resources;
pub mod session;
pub mod token_store;
