use async_trait::async_trait;

use super::errors::ApiError;
use super::types::{
    ProjectMetadata, RawProjectRecord, RepositoryCreated, ServiceCreated, VerifiedSession,
};

/// Authentication service contract: phone-based challenge/response
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Ask the platform to send a one-time code to `phone`
    async fn request_code(&self, username: &str, phone: &str) -> Result<(), ApiError>;

    /// Exchange the one-time code for a verified session
    async fn verify_code(
        &self,
        phone: &str,
        code: &str,
        project_id: &str,
    ) -> Result<VerifiedSession, ApiError>;
}

/// Platform provisioning contract: the three creation steps plus metadata update
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    async fn create_project_record(
        &self,
        project_id: &str,
        metadata: &ProjectMetadata,
    ) -> Result<(), ApiError>;

    async fn create_repository(&self, project_id: &str) -> Result<RepositoryCreated, ApiError>;

    async fn create_service(&self, project_id: &str) -> Result<ServiceCreated, ApiError>;

    async fn update_project_record(
        &self,
        project_id: &str,
        metadata: &ProjectMetadata,
    ) -> Result<(), ApiError>;
}

/// Read API contract: the published project list, heterogeneous shape permitted
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<RawProjectRecord>, ApiError>;
}
