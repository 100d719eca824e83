use crate::domain::{
    ApiError, Credentials, Method, ProfileUpdate, RequestOptions, SessionBackend, SessionToken,
    UserProfile,
};
use crate::interface_adapters::api_client::ApiClient;
use crate::interface_adapters::protocol::{LoginRequest, LoginResponse, ProfileUpdateResponse};
use async_trait::async_trait;

const LOGIN_PATH: &str = "/auth/login";
const PROFILE_PATH: &str = "/auth/profile";
const VERIFY_PATH: &str = "/auth/verify";

// Session endpoints over the shared API client.
#[async_trait]
impl SessionBackend for ApiClient {
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken, ApiError> {
        let payload = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
        };
        let options = RequestOptions::json(Method::Post, &payload)?;
        let response: LoginResponse = self.request_json(LOGIN_PATH, options).await?;
        Ok(SessionToken::new(response.access_token))
    }

    async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.request_json(PROFILE_PATH, RequestOptions::get()).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let options = RequestOptions::json(Method::Put, update)?;
        let response: ProfileUpdateResponse = self.request_json(PROFILE_PATH, options).await?;
        if let Some(msg) = response.msg.as_deref() {
            tracing::debug!(message = %msg, "profile updated.");
        }
        Ok(response.user)
    }

    async fn verify(&self) -> Result<(), ApiError> {
        self.request(VERIFY_PATH, RequestOptions::get()).await?;
        Ok(())
    }
}
