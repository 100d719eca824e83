use crate::interface_adapters::expiry::SIGNATURE_FAILURE_MARKER;
use reqwest::StatusCode;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

// Runtime client settings. Precedence: environment, then the TOML file,
// then these defaults.

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_EMAIL_DOMAIN: &str = "dciukajuki.org";
const DEFAULT_CONFIG_FILE: &str = "church-client.toml";
const APP_DIR: &str = "church-client";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid base url `{0}`: expected an absolute http(s) url")]
    InvalidBaseUrl(String),

    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: &'static str, value: String },
}

// Optional settings read from `church-client.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub token_dir: Option<PathBuf>,
    pub download_dir: Option<PathBuf>,
    pub login_path: Option<String>,
    pub expiry_status: Option<u16>,
    pub expiry_marker: Option<String>,
    pub email_domain: Option<String>,
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    // A missing default file is not an error.
    pub fn read_optional(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::read(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    // Base URL including the `/api` prefix, without a trailing slash.
    pub base_url: String,
    // Scheme, host and port of the backend; media paths resolve against it.
    pub origin: String,
    pub timeout: Duration,
    pub token_dir: PathBuf,
    pub download_dir: PathBuf,
    pub login_path: String,
    pub expiry_status: StatusCode,
    pub expiry_marker: String,
    pub email_domain: String,
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var_os("CHURCH_CLIENT_CONFIG") {
            Some(path) => FileConfig::read(Path::new(&path))?,
            None => FileConfig::read_optional(Path::new(DEFAULT_CONFIG_FILE))?,
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let raw_base_url = env("CHURCH_API_URL")
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let (base_url, origin) = parse_base_url(&raw_base_url)?;

        let timeout_ms = match env("CHURCH_API_TIMEOUT_MS") {
            Some(raw) => parse_value("CHURCH_API_TIMEOUT_MS", &raw)?,
            None => file.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        };
        if timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timeout_ms",
                value: timeout_ms.to_string(),
            });
        }

        let raw_status = match env("CHURCH_EXPIRY_STATUS") {
            Some(raw) => parse_value("CHURCH_EXPIRY_STATUS", &raw)?,
            None => file
                .expiry_status
                .unwrap_or(StatusCode::UNPROCESSABLE_ENTITY.as_u16()),
        };
        let expiry_status = StatusCode::from_u16(raw_status)
            .ok()
            .filter(|status| status.is_client_error() || status.is_server_error())
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "expiry_status",
                value: raw_status.to_string(),
            })?;

        let token_dir = env("CHURCH_TOKEN_DIR")
            .map(PathBuf::from)
            .or(file.token_dir)
            .unwrap_or_else(default_token_dir);
        let download_dir = env("CHURCH_DOWNLOAD_DIR")
            .map(PathBuf::from)
            .or(file.download_dir)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            base_url,
            origin,
            timeout: Duration::from_millis(timeout_ms),
            token_dir,
            download_dir,
            login_path: file
                .login_path
                .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string()),
            expiry_status,
            expiry_marker: env("CHURCH_EXPIRY_MARKER")
                .or(file.expiry_marker)
                .unwrap_or_else(|| SIGNATURE_FAILURE_MARKER.to_string()),
            email_domain: file
                .email_domain
                .unwrap_or_else(|| DEFAULT_EMAIL_DOMAIN.to_string()),
        })
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        let (base_url, origin) = parse_base_url(raw)?;
        self.base_url = base_url;
        self.origin = origin;
        Ok(self)
    }
}

fn parse_base_url(raw: &str) -> Result<(String, String), ConfigError> {
    let invalid = || ConfigError::InvalidBaseUrl(raw.to_string());
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    let base_url = url.as_str().trim_end_matches('/').to_string();
    let origin = url.origin().ascii_serialization();
    Ok((base_url, origin))
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn default_token_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".church-client"))
}
