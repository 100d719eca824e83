use crate::domain::{LoginRedirect, TokenStore};
use crate::frameworks::config::ClientConfig;
use crate::interface_adapters::api_client::ApiClient;
use crate::interface_adapters::expiry::SignatureFailurePolicy;
use std::sync::Arc;

// Wire an API client from configuration plus the application's token
// storage and login navigation.
pub fn build_api_client(
    config: &ClientConfig,
    tokens: Arc<dyn TokenStore>,
    redirect: Arc<dyn LoginRedirect>,
) -> Result<ApiClient, reqwest::Error> {
    let policy = SignatureFailurePolicy::new(config.expiry_status, config.expiry_marker.clone());
    tracing::debug!(
        base_url = %config.base_url,
        timeout_ms = config.timeout.as_millis() as u64,
        "api client configured."
    );

    Ok(ApiClient::new(config.base_url.clone(), config.timeout)?
        .with_token_store(tokens)
        .with_expiry_policy(Arc::new(policy))
        .with_login_redirect(redirect))
}
