//! Property tests for the validation boundaries
//!
//! The guarantees here are universals: no username with a character outside
//! `[A-Za-z0-9_]` ever reaches the wire, and no project ID outside
//! `[a-z0-9-]+` ever starts a provisioning sequence. Counting fakes stand in
//! for the remote services so "zero remote calls" is observable.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use proptest::prelude::*;
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use basebase::auth::{AuthError, AuthFlow, AuthPhase};
use basebase::platform::{
    ApiError, AuthApi, ProjectMetadata, ProvisioningApi, RepositoryCreated, ServiceCreated,
    VerifiedSession,
};
use basebase::provision::{
    ProvisionError, ProvisionMode, ProvisioningOrchestrator, ProvisioningRequest, SilentProgress,
};
use basebase::session::{AuthUser, MemorySessionStorage, SessionStore};

static RUNTIME: Lazy<tokio::runtime::Runtime> =
    Lazy::new(|| tokio::runtime::Runtime::new().unwrap());
static USERNAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new("^[A-Za-z0-9_]+$").unwrap());
static PROJECT_ID_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new("^[a-z0-9-]+$").unwrap());

fn sessions() -> Arc<SessionStore> {
    Arc::new(SessionStore::open(Arc::new(MemorySessionStorage::new())))
}

#[derive(Default)]
struct CountingAuthApi {
    calls: AtomicUsize,
}

#[async_trait]
impl AuthApi for CountingAuthApi {
    async fn request_code(&self, _username: &str, _phone: &str) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn verify_code(
        &self,
        _phone: &str,
        _code: &str,
        _project_id: &str,
    ) -> Result<VerifiedSession, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(VerifiedSession {
            user: AuthUser {
                id: "user_1".to_string(),
                name: "bob".to_string(),
                phone: "+15551234567".to_string(),
            },
            project: None,
            token: "tok".to_string(),
        })
    }
}

#[derive(Default)]
struct CountingProvisioningApi {
    calls: AtomicUsize,
}

#[async_trait]
impl ProvisioningApi for CountingProvisioningApi {
    async fn create_project_record(
        &self,
        _project_id: &str,
        _metadata: &ProjectMetadata,
    ) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_repository(&self, _project_id: &str) -> Result<RepositoryCreated, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RepositoryCreated {
            url: "https://github.com/basebase-ai/x".to_string(),
        })
    }

    async fn create_service(&self, _project_id: &str) -> Result<ServiceCreated, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ServiceCreated {
            deployment_url: "https://x.basebase.ai".to_string(),
        })
    }

    async fn update_project_record(
        &self,
        _project_id: &str,
        _metadata: &ProjectMetadata,
    ) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

proptest! {
    #[test]
    fn usernames_with_forbidden_characters_never_reach_the_wire(
        username in ".*".prop_filter(
            "must be non-blank and contain a forbidden character",
            |s| !s.trim().is_empty() && !USERNAME_PATTERN.is_match(s.trim()),
        )
    ) {
        let api = Arc::new(CountingAuthApi::default());
        let mut flow = AuthFlow::new(Arc::clone(&api) as Arc<dyn AuthApi>, sessions());

        let result = RUNTIME.block_on(flow.request_code(&username, "+15551234567"));

        prop_assert!(matches!(result, Err(AuthError::Validation(_))));
        prop_assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        prop_assert_eq!(flow.phase(), &AuthPhase::Idle);
    }

    #[test]
    fn well_formed_usernames_always_pass_validation(
        username in "[A-Za-z0-9_]{1,24}"
    ) {
        let api = Arc::new(CountingAuthApi::default());
        let mut flow = AuthFlow::new(Arc::clone(&api) as Arc<dyn AuthApi>, sessions());

        let result = RUNTIME.block_on(flow.request_code(&username, "+15551234567"));

        prop_assert!(result.is_ok());
        prop_assert_eq!(api.calls.load(Ordering::SeqCst), 1);
        prop_assert!(matches!(flow.phase(), AuthPhase::AwaitingCode { .. }));
    }

    #[test]
    fn malformed_project_ids_never_start_a_provisioning_sequence(
        project_id in ".*".prop_filter(
            "must be non-blank and fail the id pattern",
            |s| !s.trim().is_empty() && !PROJECT_ID_PATTERN.is_match(s.trim()),
        )
    ) {
        let api = Arc::new(CountingProvisioningApi::default());
        let orchestrator = ProvisioningOrchestrator::new(
            Arc::clone(&api) as Arc<dyn ProvisioningApi>,
            sessions(),
            "https://editor.basebase.ai",
        );
        let request = ProvisioningRequest::new(project_id, "My App", "Does things", vec![]);

        let result = RUNTIME.block_on(orchestrator.provision(
            &request,
            ProvisionMode::Create,
            &SilentProgress,
        ));

        prop_assert!(matches!(result, Err(ProvisionError::Validation(_))));
        prop_assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn well_formed_project_ids_run_all_three_steps(
        project_id in "[a-z0-9-]{1,30}"
    ) {
        let api = Arc::new(CountingProvisioningApi::default());
        let orchestrator = ProvisioningOrchestrator::new(
            Arc::clone(&api) as Arc<dyn ProvisioningApi>,
            sessions(),
            "https://editor.basebase.ai",
        );
        let request = ProvisioningRequest::new(project_id, "My App", "Does things", vec![]);

        let result = RUNTIME.block_on(orchestrator.provision(
            &request,
            ProvisionMode::Create,
            &SilentProgress,
        ));

        prop_assert!(result.is_ok());
        prop_assert_eq!(api.calls.load(Ordering::SeqCst), 3);
    }
}
