use crate::domain::{ApiError, Clock, DownloadSink, FileUpload, Method, RequestOptions};
use crate::interface_adapters::api_client::ApiClient;
use crate::interface_adapters::downloads::{SystemClock, dated_file_name};
use crate::interface_adapters::protocol::{SubscribeRequest, UnsubscribeRequest};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

// Backend collections that follow the `/x/` + `/x/:id` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Announcements,
    ChurchMembers,
    ContactSubmissions,
    Devotionals,
    Events,
    GivingMethods,
    GivingTransactions,
    HeroSlides,
    Ministries,
    Pastors,
    Resources,
    Sermons,
    Services,
    Subscriptions,
}

impl Resource {
    pub const ALL: [Resource; 14] = [
        Resource::Announcements,
        Resource::ChurchMembers,
        Resource::ContactSubmissions,
        Resource::Devotionals,
        Resource::Events,
        Resource::GivingMethods,
        Resource::GivingTransactions,
        Resource::HeroSlides,
        Resource::Ministries,
        Resource::Pastors,
        Resource::Resources,
        Resource::Sermons,
        Resource::Services,
        Resource::Subscriptions,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Resource::Announcements => "announcements",
            Resource::ChurchMembers => "church-members",
            Resource::ContactSubmissions => "contact-submissions",
            Resource::Devotionals => "devotionals",
            Resource::Events => "events",
            Resource::GivingMethods => "giving-methods",
            Resource::GivingTransactions => "giving-transactions",
            Resource::HeroSlides => "hero-slides",
            Resource::Ministries => "ministries",
            Resource::Pastors => "pastors",
            Resource::Resources => "resources",
            Resource::Sermons => "sermons",
            Resource::Services => "services",
            Resource::Subscriptions => "subscriptions",
        }
    }

    // Collection path; also the target for creates.
    pub fn collection_path(self) -> &'static str {
        match self {
            Resource::Announcements => "/announcements/",
            Resource::ChurchMembers => "/church-members/",
            Resource::ContactSubmissions => "/contact/form-submissions",
            Resource::Devotionals => "/devotionals/",
            Resource::Events => "/events/",
            Resource::GivingMethods => "/giving/",
            Resource::GivingTransactions => "/giving-transactions/",
            Resource::HeroSlides => "/hero-slides/",
            Resource::Ministries => "/ministries/",
            Resource::Pastors => "/pastors/",
            Resource::Resources => "/resources/",
            Resource::Sermons => "/sermons/",
            Resource::Services => "/services/",
            Resource::Subscriptions => "/subscriptions/subscriptions",
        }
    }

    // Admin listing path. The public `/giving/` listing hides inactive methods.
    pub fn list_path(self) -> &'static str {
        match self {
            Resource::GivingMethods => "/giving/admin",
            other => other.collection_path(),
        }
    }

    pub fn item_path(self, id: impl fmt::Display) -> String {
        format!("{}/{id}", self.collection_path().trim_end_matches('/'))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("unknown resource `{0}`")]
pub struct UnknownResource(pub String);

impl FromStr for Resource {
    type Err = UnknownResource;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase().replace('_', "-");
        Resource::ALL
            .into_iter()
            .find(|resource| resource.name() == wanted)
            .ok_or_else(|| UnknownResource(value.to_string()))
    }
}

// Query-string filters; empty values are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilters(BTreeMap<String, String>);

impl QueryFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn to_query(&self) -> Option<String> {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        let mut any = false;
        for (key, value) in &self.0 {
            if value.is_empty() {
                continue;
            }
            serializer.append_pair(key, value);
            any = true;
        }
        any.then(|| serializer.finish())
    }

    pub fn apply(&self, path: &str) -> String {
        match self.to_query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryFilters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Self::new();
        for (key, value) in iter {
            filters.insert(key, value);
        }
        filters
    }
}

const MEMBER_EXPORT_PATH: &str = "/church-members/export-pdf";

// Typed endpoints for the church content backend.
#[derive(Clone)]
pub struct ResourceClient {
    api: ApiClient,
    clock: Arc<dyn Clock>,
}

impl ResourceClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub async fn list(&self, resource: Resource) -> Result<Value, ApiError> {
        self.api
            .request(resource.list_path(), RequestOptions::get())
            .await
    }

    pub async fn get(&self, resource: Resource, id: impl fmt::Display) -> Result<Value, ApiError> {
        let path = resource.item_path(id);
        self.api.request(&path, RequestOptions::get()).await
    }

    pub async fn create<T: Serialize + ?Sized>(
        &self,
        resource: Resource,
        payload: &T,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::json(Method::Post, payload)?;
        self.api.request(resource.collection_path(), options).await
    }

    pub async fn update<T: Serialize + ?Sized>(
        &self,
        resource: Resource,
        id: impl fmt::Display,
        payload: &T,
    ) -> Result<Value, ApiError> {
        let path = resource.item_path(id);
        let options = RequestOptions::json(Method::Put, payload)?;
        self.api.request(&path, options).await
    }

    pub async fn delete(&self, resource: Resource, id: impl fmt::Display) -> Result<Value, ApiError> {
        let path = resource.item_path(id);
        self.api.request(&path, RequestOptions::delete()).await
    }

    // Ministry cards and images are addressed by ministry slug.

    pub async fn ministry_cards(&self, slug: &str) -> Result<Value, ApiError> {
        let path = format!("/ministries/{slug}/cards");
        self.api.request(&path, RequestOptions::get()).await
    }

    pub async fn create_ministry_card<T: Serialize + ?Sized>(
        &self,
        slug: &str,
        payload: &T,
    ) -> Result<Value, ApiError> {
        let path = format!("/ministries/{slug}/cards");
        let options = RequestOptions::json(Method::Post, payload)?;
        self.api.request(&path, options).await
    }

    pub async fn update_ministry_card<T: Serialize + ?Sized>(
        &self,
        slug: &str,
        card_id: u64,
        payload: &T,
    ) -> Result<Value, ApiError> {
        let path = format!("/ministries/{slug}/cards/{card_id}");
        let options = RequestOptions::json(Method::Put, payload)?;
        self.api.request(&path, options).await
    }

    pub async fn delete_ministry_card(&self, slug: &str, card_id: u64) -> Result<Value, ApiError> {
        let path = format!("/ministries/{slug}/cards/{card_id}");
        self.api.request(&path, RequestOptions::delete()).await
    }

    pub async fn ministry_images(&self, slug: &str) -> Result<Value, ApiError> {
        let path = format!("/ministries/{slug}/images");
        self.api.request(&path, RequestOptions::get()).await
    }

    pub async fn add_ministry_image(
        &self,
        slug: &str,
        upload: FileUpload,
    ) -> Result<Value, ApiError> {
        let path = format!("/ministries/{slug}/images");
        self.api.upload(&path, upload).await
    }

    pub async fn delete_ministry_image(
        &self,
        slug: &str,
        image_id: u64,
    ) -> Result<Value, ApiError> {
        let path = format!("/ministries/{slug}/images/{image_id}");
        self.api.request(&path, RequestOptions::delete()).await
    }

    pub async fn upload_image(&self, upload: FileUpload) -> Result<Value, ApiError> {
        self.api.upload("/upload", upload).await
    }

    pub async fn list_members(&self, filters: &QueryFilters) -> Result<Value, ApiError> {
        let path = filters.apply(Resource::ChurchMembers.collection_path());
        self.api.request(&path, RequestOptions::get()).await
    }

    pub async fn assign_ministry<T: Serialize + ?Sized>(
        &self,
        member_id: u64,
        payload: &T,
    ) -> Result<Value, ApiError> {
        let path = format!("/church-members/{member_id}/ministries");
        let options = RequestOptions::json(Method::Post, payload)?;
        self.api.request(&path, options).await
    }

    pub async fn remove_ministry_assignment(
        &self,
        member_id: u64,
        assignment_id: u64,
    ) -> Result<Value, ApiError> {
        let path = format!("/church-members/{member_id}/ministries/{assignment_id}");
        self.api.request(&path, RequestOptions::delete()).await
    }

    // Saves the member directory PDF as `church_members_<today>.pdf`.
    pub async fn export_members_pdf(
        &self,
        filters: &QueryFilters,
        sink: &dyn DownloadSink,
    ) -> Result<PathBuf, ApiError> {
        let path = filters.apply(MEMBER_EXPORT_PATH);
        let file_name = dated_file_name("church_members", self.clock.today(), "pdf");
        self.api.download(&path, &file_name, sink).await
    }

    pub async fn submit_contact_form<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::json(Method::Post, payload)?;
        self.api.request("/contact/", options).await
    }

    pub async fn mark_submission_read(&self, id: u64) -> Result<Value, ApiError> {
        let path = format!("/contact/form-submissions/{id}/read");
        self.api.request(&path, RequestOptions::new(Method::Put)).await
    }

    pub async fn subscribe(&self, email: &str, name: &str) -> Result<Value, ApiError> {
        let options = RequestOptions::json(Method::Post, &SubscribeRequest { email, name })?;
        self.api.request("/subscriptions/subscribe", options).await
    }

    pub async fn unsubscribe(&self, email: &str) -> Result<Value, ApiError> {
        let options = RequestOptions::json(Method::Post, &UnsubscribeRequest { email })?;
        self.api.request("/subscriptions/unsubscribe", options).await
    }

    pub async fn giving_info(&self) -> Result<Value, ApiError> {
        self.api.request("/giving/", RequestOptions::get()).await
    }

    pub async fn church_info(&self) -> Result<Value, ApiError> {
        self.api.request("/church-info/", RequestOptions::get()).await
    }

    pub async fn update_church_info<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<Value, ApiError> {
        let options = RequestOptions::json(Method::Put, payload)?;
        self.api.request("/church-info/", options).await
    }

    pub async fn dashboard_stats(&self) -> Result<Value, ApiError> {
        self.api.request("/dashboard/stats", RequestOptions::get()).await
    }

    pub async fn health(&self) -> Result<Value, ApiError> {
        self.api.request("/health", RequestOptions::get()).await
    }
}
