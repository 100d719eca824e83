use crate::domain::errors::ApiError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// HTTP verbs the backend understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Per-call configuration for [`ApiClient::request`](crate::interface_adapters::api_client::ApiClient::request).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// HTTP verb. Defaults to `GET`.
    pub method: Method,
    /// Extra headers. Applied after the defaults, so a caller value replaces
    /// the default header of the same name.
    pub headers: BTreeMap<String, String>,
    /// Pre-serialized JSON payload, forwarded unchanged. `None` sends no body.
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn delete() -> Self {
        Self::new(Method::Delete)
    }

    // Serialize `payload` as the JSON body of a request.
    pub fn json<T: Serialize + ?Sized>(method: Method, payload: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_string(payload)?;
        Ok(Self::new(method).with_body(body))
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// One outgoing call: a server-relative path plus its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub path: String,
    pub options: RequestOptions,
}

impl RequestDescriptor {
    pub fn new(path: impl Into<String>, options: RequestOptions) -> Result<Self, ApiError> {
        let path = path.into();
        validate_path(&path)?;
        Ok(Self { path, options })
    }
}

// Paths are relative to the configured base URL; full URLs are rejected so
// the bearer token never leaves the configured origin. Empty segments (`//`)
// are rejected anywhere before the query string.
pub fn validate_path(path: &str) -> Result<(), ApiError> {
    let route = path.split('?').next().unwrap_or_default();
    if !route.starts_with('/') || route.contains("//") || path.contains("://") {
        return Err(ApiError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// A file attachment sent as one part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Form field name the endpoint expects (`image` for media, `file` for documents).
    pub field: String,
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = guess_mime(&file_name).map(str::to_string);
        Self {
            field: field.into(),
            file_name,
            mime,
            bytes,
        }
    }

    pub async fn from_path(field: impl Into<String>, path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(field, file_name, bytes))
    }
}

fn guess_mime(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "pdf" => Some("application/pdf"),
        "doc" => Some("application/msword"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}
