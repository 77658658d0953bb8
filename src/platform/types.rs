use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::AuthUser;

/// Payload returned by a successful code verification
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedSession {
    pub user: AuthUser,
    #[serde(default)]
    pub project: Option<Value>,
    pub token: String,
}

/// Project metadata submitted to the platform on create and edit.
///
/// Timestamps are owned by the server so that resubmitting identical data
/// stores identical state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub name: String,
    pub description: String,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

/// Result of the repository provisioning step
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryCreated {
    pub url: String,
}

/// Result of the service provisioning step. `deployment_url` is a polling
/// target: the deployment is not guaranteed to be complete when it returns.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCreated {
    pub deployment_url: String,
}

/// A project record as the read API returns it: optional and legacy fields,
/// loose numeric shapes, and open-ended extra fields that normalization
/// passes through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProjectRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub production_url: Option<String>,
    #[serde(default)]
    pub users: Option<Value>,
    #[serde(default)]
    pub forks: Option<Value>,
    #[serde(default)]
    pub categories: Option<Value>,
    /// Legacy singular field still present on older records
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
