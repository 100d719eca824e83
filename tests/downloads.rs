mod support;

use chrono::NaiveDate;
use church_client::domain::Clock;
use church_client::interface_adapters::downloads::FileDownloadSink;
use church_client::{ApiClient, ApiError, MemoryTokenStore, QueryFilters, ResourceClient, SessionToken};
use reqwest::StatusCode;
use std::path::Path;
use std::sync::Arc;
use support::{StubResponse, StubServer};

const PDF: &[u8] = b"%PDF-1.4 member directory";

struct FixedClock(NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

fn resources_for(base_url: &str) -> ResourceClient {
    let api = ApiClient::with_http(support::http_client(), base_url).with_token_store(Arc::new(
        MemoryTokenStore::with_token(SessionToken::new("abc")),
    ));
    let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
    ResourceClient::new(api).with_clock(Arc::new(FixedClock(date)))
}

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn when_members_are_exported_then_pdf_is_saved_under_dated_name() {
    let server = StubServer::start(|_| StubResponse::bytes("application/pdf", PDF)).await;
    let dir = tempfile::tempdir().unwrap();
    let sink = FileDownloadSink::new(dir.path());

    let saved = resources_for(&server.base_url)
        .export_members_pdf(&QueryFilters::new(), &sink)
        .await
        .unwrap();

    assert_eq!(saved, dir.path().join("church_members_2026-10-16.pdf"));
    assert_eq!(std::fs::read(&saved).unwrap(), PDF);
    assert_eq!(entries(dir.path()), vec!["church_members_2026-10-16.pdf"]);
}

#[tokio::test]
async fn when_export_is_filtered_then_query_string_and_bearer_are_sent() {
    let server = StubServer::start(|_| StubResponse::bytes("application/pdf", PDF)).await;
    let dir = tempfile::tempdir().unwrap();
    let filters = QueryFilters::new()
        .with("ministry", "choir")
        .with("status", "")
        .with("search", "Grace");

    resources_for(&server.base_url)
        .export_members_pdf(&filters, &FileDownloadSink::new(dir.path()))
        .await
        .unwrap();

    let request = server.only_request();
    assert_eq!(request.path, "/api/church-members/export-pdf");
    assert_eq!(request.query.as_deref(), Some("ministry=choir&search=Grace"));
    assert_eq!(request.header("authorization").as_deref(), Some("Bearer abc"));
    assert_eq!(request.header("content-type"), None);
}

#[tokio::test]
async fn when_export_fails_then_no_file_is_left_behind() {
    let server =
        StubServer::start(|_| StubResponse::json(StatusCode::FORBIDDEN, r#"{"msg":"admins only"}"#))
            .await;
    let dir = tempfile::tempdir().unwrap();

    let err = resources_for(&server.base_url)
        .export_members_pdf(&QueryFilters::new(), &FileDownloadSink::new(dir.path()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert!(entries(dir.path()).is_empty());
}

#[tokio::test]
async fn when_download_name_escapes_the_directory_then_it_is_rejected() {
    let server = StubServer::start(|_| StubResponse::bytes("application/pdf", PDF)).await;
    let dir = tempfile::tempdir().unwrap();
    let api = ApiClient::with_http(support::http_client(), &server.base_url);

    let err = api
        .download(
            "/church-members/export-pdf",
            "../escape.pdf",
            &FileDownloadSink::new(dir.path()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Download(_)));
    assert!(entries(dir.path()).is_empty());
}
