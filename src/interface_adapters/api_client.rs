use crate::domain::{
    ApiError, DownloadSink, ExpiryPolicy, FileUpload, LoginReason, LoginRedirect, Method,
    RequestDescriptor, RequestOptions, SessionToken, TokenStore, validate_path,
};
use crate::interface_adapters::expiry::{LogRedirect, SignatureFailurePolicy};
use crate::interface_adapters::token_store::MemoryTokenStore;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const JSON_CONTENT_TYPE: &str = "application/json";

// Single entry point for backend calls. Token attachment, failure
// normalization and expiry handling happen here and nowhere else.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    expiry: Arc<dyn ExpiryPolicy>,
    redirect: Arc<dyn LoginRedirect>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("church-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http(http, base_url))
    }

    // Wrap an already configured reqwest client.
    pub fn with_http(http: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens: Arc::new(MemoryTokenStore::default()),
            expiry: Arc::new(SignatureFailurePolicy::default()),
            redirect: Arc::new(LogRedirect::new("/login")),
        }
    }

    pub fn with_token_store(mut self, tokens: Arc<dyn TokenStore>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_expiry_policy(mut self, expiry: Arc<dyn ExpiryPolicy>) -> Self {
        self.expiry = expiry;
        self
    }

    pub fn with_login_redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
        self.redirect = redirect;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        Arc::clone(&self.tokens)
    }

    pub fn login_redirect(&self) -> Arc<dyn LoginRedirect> {
        Arc::clone(&self.redirect)
    }

    /// Issue a JSON request against `path` (relative to the base URL) and
    /// return the parsed response body.
    ///
    /// The current session token, when one is stored, is sent as
    /// `Authorization: Bearer <token>`. `Content-Type: application/json` is
    /// always set unless `options.headers` overrides it. An empty success
    /// body yields `Value::Null`.
    #[tracing::instrument(
        name = "api_request",
        skip_all,
        fields(method = options.method.as_str(), path = %path)
    )]
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let url = self.url_for(path)?;
        let token = self.tokens.load()?;
        let headers = build_headers(token.as_ref(), true, &options.headers)?;

        tracing::debug!(%url, token_present = token.is_some(), "sending api request.");
        let mut builder = self
            .http
            .request(http_method(options.method), url)
            .headers(headers);
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        let response = self.dispatch(builder).await?;
        let bytes = response.bytes().await.map_err(|err| {
            tracing::error!(error = %err, "failed to read api response body.");
            ApiError::Network(err)
        })?;
        parse_json_body(&bytes)
    }

    pub async fn send(&self, descriptor: RequestDescriptor) -> Result<Value, ApiError> {
        self.request(&descriptor.path, descriptor.options).await
    }

    // Typed variant of `request`; a body that does not match `T` is malformed.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let value = self.request(path, options).await?;
        serde_json::from_value(value).map_err(|err| {
            tracing::error!(error = %err, "api response did not match the expected shape.");
            ApiError::MalformedResponse(err.to_string())
        })
    }

    /// Submit a file as a multipart form.
    ///
    /// Only `Authorization` is attached; reqwest sets the multipart
    /// `Content-Type` with its boundary.
    #[tracing::instrument(name = "api_upload", skip_all, fields(path = %path, field = %upload.field))]
    pub async fn upload(&self, path: &str, upload: FileUpload) -> Result<Value, ApiError> {
        let url = self.url_for(path)?;
        let token = self.tokens.load()?;
        let headers = build_headers(token.as_ref(), false, &BTreeMap::new())?;

        let mut part = Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(mime) = upload.mime.as_deref() {
            part = part
                .mime_str(mime)
                .map_err(|_| ApiError::InvalidHeader(CONTENT_TYPE.to_string()))?;
        }
        let form = Form::new().part(upload.field, part);

        tracing::debug!(%url, token_present = token.is_some(), "sending multipart upload.");
        let builder = self.http.post(url).headers(headers).multipart(form);
        let response = self.dispatch(builder).await?;
        let bytes = response.bytes().await.map_err(ApiError::Network)?;
        parse_json_body(&bytes)
    }

    /// Fetch a binary resource and hand it to `sink` under `file_name`.
    #[tracing::instrument(name = "api_download", skip_all, fields(path = %path, file_name = %file_name))]
    pub async fn download(
        &self,
        path: &str,
        file_name: &str,
        sink: &dyn DownloadSink,
    ) -> Result<PathBuf, ApiError> {
        let url = self.url_for(path)?;
        let token = self.tokens.load()?;
        let headers = build_headers(token.as_ref(), false, &BTreeMap::new())?;

        let builder = self.http.get(url).headers(headers);
        let response = self.dispatch(builder).await?;
        let bytes = response.bytes().await.map_err(|err| {
            tracing::error!(error = %err, "failed to read download body.");
            ApiError::Network(err)
        })?;

        let saved = sink.save(file_name, &bytes)?;
        tracing::info!(path = %saved.display(), size = bytes.len(), "download saved.");
        Ok(saved)
    }

    fn url_for(&self, path: &str) -> Result<String, ApiError> {
        validate_path(path)?;
        Ok(format!("{}{}", self.base_url, path))
    }

    // Send and normalize non-2xx responses into the error taxonomy.
    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|err| {
            tracing::error!(error = %err, "api transport failure.");
            ApiError::Network(err)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // The status alone still classifies the failure if the body is unreadable.
        let body = response.text().await.unwrap_or_default();
        if self.expiry.is_expiry_signal(status, &body) {
            tracing::warn!(%status, "session token rejected as expired; clearing it.");
            if let Err(err) = self.tokens.clear() {
                tracing::error!(error = %err, "failed to clear expired session token.");
            }
            self.redirect.redirect_to_login(LoginReason::SessionExpired);
            return Err(ApiError::AuthExpired);
        }

        tracing::warn!(%status, "api request failed.");
        Err(ApiError::Http { status, body })
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

// Defaults first, caller headers last so they win on name collisions.
fn build_headers(
    token: Option<&SessionToken>,
    json: bool,
    extra: &BTreeMap<String, String>,
) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    if json {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&token.bearer())
            .map_err(|_| ApiError::InvalidHeader(AUTHORIZATION.to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    for (name, value) in extra {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ApiError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader(name.clone()))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

fn parse_json_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|err| {
        tracing::error!(error = %err, "api response body is not valid json.");
        ApiError::MalformedResponse(err.to_string())
    })
}
