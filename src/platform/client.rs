use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use moka::future::Cache;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::{ApiConfig, RateLimitConfig};
use crate::session::SessionStore;

use super::errors::ApiError;
use super::traits::{AuthApi, DirectoryApi, ProvisioningApi};
use super::types::{
    ProjectMetadata, RawProjectRecord, RepositoryCreated, ServiceCreated, VerifiedSession,
};

const PROJECTS_CACHE_KEY: &str = "projects";

/// Rate-limited HTTP client for the BaseBase platform API.
///
/// Read responses are cached for a short TTL and invalidated after any write
/// so a subsequent directory fetch observes the new state. Provisioning calls
/// carry the bearer token of the current session when one is present.
pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    sessions: Arc<SessionStore>,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    cache: Cache<String, Vec<RawProjectRecord>>,
}

impl PlatformClient {
    /// Create a client with default rate limiting
    pub fn new(
        base_url: impl Into<String>,
        sessions: Arc<SessionStore>,
    ) -> Result<Self, ApiError> {
        Self::with_rate_limit(base_url, sessions, &RateLimitConfig::default())
    }

    /// Create a client from the configured API section
    pub fn from_config(api: &ApiConfig, sessions: Arc<SessionStore>) -> Result<Self, ApiError> {
        Self::with_rate_limit(api.base_url.clone(), sessions, &api.rate_limit)
    }

    fn with_rate_limit(
        base_url: impl Into<String>,
        sessions: Arc<SessionStore>,
        rate_limit: &RateLimitConfig,
    ) -> Result<Self, ApiError> {
        let per_second = NonZeroU32::new(rate_limit.requests_per_second.max(1)).unwrap();
        let burst = NonZeroU32::new(rate_limit.burst_capacity.max(1)).unwrap();
        let quota = Quota::per_second(per_second).allow_burst(burst);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let http = reqwest::Client::builder()
            .user_agent(concat!("basebase/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Short-lived read cache, invalidated after write operations
        let cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(Duration::from_secs(300))
            .build();

        Ok(Self {
            http,
            base_url: base_url.into(),
            sessions,
            rate_limiter,
            cache,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Drop any cached read responses so the next fetch hits the network
    pub async fn invalidate_project_cache(&self) {
        self.cache.invalidate(PROJECTS_CACHE_KEY).await;
        debug!("Project list cache invalidated");
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Attach the current session's bearer token when one exists
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.sessions.get().token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn throttle(&self) {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
            .await;
    }

    /// Map a non-success response to an error carrying the body's message
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }
}

/// Pull the platform's own wording out of an error body so it can be
/// surfaced verbatim; fall back to the raw body, then the bare status.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    format!("HTTP {}", status.as_u16())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestCodeBody<'a> {
    username: &'a str,
    phone: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyCodeBody<'a> {
    phone: &'a str,
    code: &'a str,
    project_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectBody<'a> {
    project_id: &'a str,
    #[serde(flatten)]
    metadata: &'a ProjectMetadata,
}

#[derive(Deserialize)]
struct AckEnvelope {
    #[serde(default)]
    success: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    repository: Option<RepositoryCreated>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    service: Option<ServiceCreated>,
}

#[async_trait]
impl AuthApi for PlatformClient {
    async fn request_code(&self, username: &str, phone: &str) -> Result<(), ApiError> {
        self.throttle().await;
        let response = self
            .http
            .post(self.url("v1/auth/request-code"))
            .json(&RequestCodeBody { username, phone })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn verify_code(
        &self,
        phone: &str,
        code: &str,
        project_id: &str,
    ) -> Result<VerifiedSession, ApiError> {
        self.throttle().await;
        let response = self
            .http
            .post(self.url("v1/auth/verify-code"))
            .json(&VerifyCodeBody {
                phone,
                code,
                project_id,
            })
            .send()
            .await?;
        let verified = Self::check(response).await?.json::<VerifiedSession>().await?;
        Ok(verified)
    }
}

#[async_trait]
impl ProvisioningApi for PlatformClient {
    async fn create_project_record(
        &self,
        project_id: &str,
        metadata: &ProjectMetadata,
    ) -> Result<(), ApiError> {
        self.throttle().await;
        let response = self
            .authorized(self.http.post(self.url("v1/projects")))
            .json(&CreateProjectBody {
                project_id,
                metadata,
            })
            .send()
            .await?;
        let ack = Self::check(response).await?.json::<AckEnvelope>().await?;
        self.invalidate_project_cache().await;
        if !ack.success {
            return Err(ApiError::Rejected(
                "Failed to create project document".to_string(),
            ));
        }
        Ok(())
    }

    async fn create_repository(&self, project_id: &str) -> Result<RepositoryCreated, ApiError> {
        self.throttle().await;
        let response = self
            .authorized(
                self.http
                    .post(self.url(&format!("v1/projects/{project_id}/repository"))),
            )
            .send()
            .await?;
        let envelope = Self::check(response)
            .await?
            .json::<RepositoryEnvelope>()
            .await?;
        match envelope.repository {
            Some(repository) if envelope.success => Ok(repository),
            _ => Err(ApiError::Rejected("Failed to create repository".to_string())),
        }
    }

    async fn create_service(&self, project_id: &str) -> Result<ServiceCreated, ApiError> {
        self.throttle().await;
        let response = self
            .authorized(
                self.http
                    .post(self.url(&format!("v1/projects/{project_id}/service"))),
            )
            .send()
            .await?;
        let envelope = Self::check(response)
            .await?
            .json::<ServiceEnvelope>()
            .await?;
        match envelope.service {
            Some(service) if envelope.success => Ok(service),
            _ => Err(ApiError::Rejected("Failed to deploy service".to_string())),
        }
    }

    async fn update_project_record(
        &self,
        project_id: &str,
        metadata: &ProjectMetadata,
    ) -> Result<(), ApiError> {
        self.throttle().await;
        let response = self
            .authorized(
                self.http
                    .put(self.url(&format!("v1/projects/{project_id}"))),
            )
            .json(metadata)
            .send()
            .await?;
        Self::check(response).await?;
        self.invalidate_project_cache().await;
        Ok(())
    }
}

#[async_trait]
impl DirectoryApi for PlatformClient {
    async fn list_projects(&self) -> Result<Vec<RawProjectRecord>, ApiError> {
        if let Some(cached) = self.cache.get(PROJECTS_CACHE_KEY).await {
            debug!("Serving project list from cache");
            return Ok(cached);
        }

        self.throttle().await;
        let response = self
            .authorized(self.http.get(self.url("v1/projects")))
            .send()
            .await?;
        let records = Self::check(response)
            .await?
            .json::<Vec<RawProjectRecord>>()
            .await?;

        self.cache
            .insert(PROJECTS_CACHE_KEY.to_string(), records.clone())
            .await;
        Ok(records)
    }
}
