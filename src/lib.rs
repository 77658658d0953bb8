// BaseBase Platform Client - phone-based auth, project directory, provisioning
// This exposes the core components for testing and integration

pub mod auth;
pub mod cli;
pub mod config;
pub mod directory;
pub mod platform;
pub mod provision;
pub mod session;
pub mod telemetry;

// Re-export key types for easy access
pub use auth::{AuthError, AuthFlow, AuthPhase};
pub use config::{config, init_config, BasebaseConfig};
pub use directory::{
    can_edit, normalize_record, search, DirectoryError, ProjectDirectory, ProjectRecord,
};
pub use platform::{
    ApiError, AuthApi, DirectoryApi, PlatformClient, ProvisioningApi, RawProjectRecord,
};
pub use provision::{
    slugify_project_id, ProgressSink, ProvisionError, ProvisionMode, ProvisionOutcome,
    ProvisioningOrchestrator, ProvisioningRequest, Step,
};
pub use session::{FileSessionStorage, MemorySessionStorage, Session, SessionStorage, SessionStore};
pub use telemetry::{generate_correlation_id, init_telemetry};
