use crate::domain::{
    ApiError, Credentials, FileUpload, Method, ProfileUpdate, RequestDescriptor, RequestOptions,
    SessionError, TokenStoreError,
};
use crate::frameworks::client::build_api_client;
use crate::frameworks::config::{ClientConfig, ConfigError};
use crate::frameworks::logging::init_tracing;
use crate::interface_adapters::api_client::ApiClient;
use crate::interface_adapters::downloads::FileDownloadSink;
use crate::interface_adapters::expiry::LogRedirect;
use crate::interface_adapters::media::image_url;
use crate::interface_adapters::resources::{QueryFilters, Resource, ResourceClient};
use crate::interface_adapters::token_store::FileTokenStore;
use crate::use_cases::{LoginUseCase, LogoutUseCase, ProfileUseCase, VerifySessionUseCase};
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "church-client", version, about = "Command line client for the church CMS API")]
pub struct Cli {
    /// Backend base URL including the `/api` prefix.
    #[arg(long, global = true, env = "CHURCH_API_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session token.
    Login {
        username: String,
        #[arg(long, env = "CHURCH_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session token.
    Logout,
    /// Print the signed-in admin.
    Whoami,
    /// Check the stored token with the backend.
    Verify,
    /// Change the signed-in admin's username or email.
    UpdateProfile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// List a collection, e.g. `events` or `church-members`.
    List { resource: Resource },
    /// Fetch one item of a collection.
    Show { resource: Resource, id: String },
    /// Send a GET request to any backend path.
    Get(RawRequest),
    /// Send a POST request to any backend path.
    Post(RawRequest),
    /// Send a PUT request to any backend path.
    Put(RawRequest),
    /// Send a DELETE request to any backend path.
    Delete(RawRequest),
    /// Upload a file as multipart form data.
    Upload {
        path: String,
        file: PathBuf,
        #[arg(long, default_value = "image")]
        field: String,
    },
    /// Download the member directory as a dated PDF.
    ExportMembers {
        #[arg(long = "filter", value_parser = parse_key_value)]
        filters: Vec<(String, String)>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Resolve a stored media path to a fetchable URL.
    ImageUrl { path: String },
}

#[derive(Debug, Args)]
pub struct RawRequest {
    /// Server-relative path, e.g. `/events/`.
    pub path: String,
    /// JSON request body.
    #[arg(long)]
    pub body: Option<String>,
    /// Extra header as `name=value`; replaces a default header of the same name.
    #[arg(long = "header", value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] TokenStoreError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request body is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not logged in")]
    NotLoggedIn,

    #[error("media path is empty")]
    EmptyMediaPath,
}

pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn run() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match execute(cli).await {
        Ok(output) => {
            if !output.is_null() {
                match serde_json::to_string_pretty(&output) {
                    Ok(text) => println!("{text}"),
                    Err(err) => {
                        tracing::error!(error = %err, "failed to render output.");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "command failed.");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

// Wiring shared by every command.
struct Context {
    config: ClientConfig,
    tokens: Arc<FileTokenStore>,
    redirect: Arc<LogRedirect>,
    api: ApiClient,
}

impl Context {
    fn new(base_url: Option<&str>) -> Result<Self, CliError> {
        let mut config = ClientConfig::load()?;
        if let Some(raw) = base_url {
            config = config.with_base_url(raw)?;
        }

        let tokens = Arc::new(FileTokenStore::new(config.token_dir.clone()));
        let redirect = Arc::new(LogRedirect::new(config.login_path.clone()));
        let api = build_api_client(&config, tokens.clone(), redirect.clone())?;
        Ok(Self {
            config,
            tokens,
            redirect,
            api,
        })
    }

    fn resources(&self) -> ResourceClient {
        ResourceClient::new(self.api.clone())
    }
}

pub async fn execute(cli: Cli) -> Result<Value, CliError> {
    let ctx = Context::new(cli.base_url.as_deref())?;

    match cli.command {
        Command::Login { username, password } => {
            let use_case = LoginUseCase {
                backend: ctx.api.clone(),
                store: ctx.tokens.clone(),
            };
            use_case.execute(Credentials { username, password }).await?;
            Ok(json!({ "logged_in": true }))
        }
        Command::Logout => {
            let use_case = LogoutUseCase {
                store: ctx.tokens.clone(),
                redirect: ctx.redirect.clone(),
            };
            use_case.execute()?;
            ctx.tokens.clear_all()?;
            Ok(Value::Null)
        }
        Command::Whoami => {
            let use_case = ProfileUseCase {
                backend: ctx.api.clone(),
                store: ctx.tokens.clone(),
                email_domain: ctx.config.email_domain.clone(),
            };
            let profile = use_case.current_user().await?.ok_or(CliError::NotLoggedIn)?;
            Ok(serde_json::to_value(profile)?)
        }
        Command::Verify => {
            let use_case = VerifySessionUseCase {
                backend: ctx.api.clone(),
                store: ctx.tokens.clone(),
            };
            let valid = use_case.execute().await?;
            Ok(json!({ "valid": valid }))
        }
        Command::UpdateProfile { username, email } => {
            let use_case = ProfileUseCase {
                backend: ctx.api.clone(),
                store: ctx.tokens.clone(),
                email_domain: ctx.config.email_domain.clone(),
            };
            let profile = use_case.update(ProfileUpdate { username, email }).await?;
            Ok(serde_json::to_value(profile)?)
        }
        Command::List { resource } => Ok(ctx.resources().list(resource).await?),
        Command::Show { resource, id } => Ok(ctx.resources().get(resource, id).await?),
        Command::Get(raw) => send_raw(&ctx.api, Method::Get, raw).await,
        Command::Post(raw) => send_raw(&ctx.api, Method::Post, raw).await,
        Command::Put(raw) => send_raw(&ctx.api, Method::Put, raw).await,
        Command::Delete(raw) => send_raw(&ctx.api, Method::Delete, raw).await,
        Command::Upload { path, file, field } => {
            let upload = FileUpload::from_path(field, &file)
                .await
                .map_err(|source| CliError::Io {
                    path: file.clone(),
                    source,
                })?;
            Ok(ctx.api.upload(&path, upload).await?)
        }
        Command::ExportMembers { filters, out } => {
            let filters: QueryFilters = filters.into_iter().collect();
            let sink = FileDownloadSink::new(out.unwrap_or_else(|| ctx.config.download_dir.clone()));
            let saved = ctx.resources().export_members_pdf(&filters, &sink).await?;
            Ok(json!({ "saved": saved.display().to_string() }))
        }
        Command::ImageUrl { path } => {
            let url = image_url(&ctx.config.origin, &path).ok_or(CliError::EmptyMediaPath)?;
            Ok(Value::String(url))
        }
    }
}

async fn send_raw(api: &ApiClient, method: Method, raw: RawRequest) -> Result<Value, CliError> {
    let mut options = RequestOptions::new(method);
    if let Some(body) = raw.body {
        // Reject malformed JSON before it reaches the backend.
        serde_json::from_str::<Value>(&body)?;
        options = options.with_body(body);
    }
    for (name, value) in raw.headers {
        options = options.with_header(name, value);
    }
    let descriptor = RequestDescriptor::new(raw.path, options)?;
    Ok(api.send(descriptor).await?)
}
