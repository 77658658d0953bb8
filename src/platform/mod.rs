pub mod client;
pub mod errors;
pub mod traits;
pub mod types;

pub use client::PlatformClient;
pub use errors::ApiError;
pub use traits::{AuthApi, DirectoryApi, ProvisioningApi};
pub use types::{
    ProjectMetadata, RawProjectRecord, RepositoryCreated, ServiceCreated, VerifiedSession,
};

#[cfg(any(test, feature = "testing"))]
pub use traits::{MockAuthApi, MockDirectoryApi, MockProvisioningApi};
