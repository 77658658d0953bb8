use regex::Regex;
use std::future::Future;
use std::sync::{Arc, LazyLock};
use tracing::{debug, Instrument};

use crate::platform::{ApiError, ProjectMetadata, ProvisioningApi};
use crate::session::SessionStore;
use crate::telemetry::{create_provisioning_span, generate_correlation_id};

use super::{
    ProgressSink, ProvisionError, ProvisionMode, ProvisionOutcome, ProvisioningRequest, Step,
};

static PROJECT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z0-9-]+$").unwrap());

/// One run's position, as a single tagged state instead of a pile of
/// loading/success/error flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Validating,
    RunningStep(Step),
    Succeeded,
    Failed(Step),
}

fn transition(from: RunState, to: RunState) -> RunState {
    debug!(?from, ?to, "Provisioning state transition");
    to
}

/// Drives the sequential creation of a project (document, then repository,
/// then service) or the single-step edit of an existing one.
///
/// Steps are strictly sequential with no parallelism, no retries, and no
/// rollback: a failure leaves any already-completed steps in place, and the
/// returned error names the step that failed.
pub struct ProvisioningOrchestrator {
    api: Arc<dyn ProvisioningApi>,
    sessions: Arc<SessionStore>,
    editor_base_url: String,
}

impl ProvisioningOrchestrator {
    pub fn new(
        api: Arc<dyn ProvisioningApi>,
        sessions: Arc<SessionStore>,
        editor_base_url: impl Into<String>,
    ) -> Self {
        Self {
            api,
            sessions,
            editor_base_url: editor_base_url.into(),
        }
    }

    /// Run one submission to completion. Emits an advisory status line to
    /// `progress` before each remote step.
    pub async fn provision(
        &self,
        request: &ProvisioningRequest,
        mode: ProvisionMode,
        progress: &dyn ProgressSink,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        let correlation_id = generate_correlation_id();
        let span = create_provisioning_span(mode.label(), &request.project_id, &correlation_id);
        self.run(request, mode, progress).instrument(span).await
    }

    async fn run(
        &self,
        request: &ProvisioningRequest,
        mode: ProvisionMode,
        progress: &dyn ProgressSink,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        let mut state = RunState::Validating;

        // Validation always short-circuits before any network effect
        let project_id = request.project_id.trim().to_string();
        let name = request.name.trim();
        let description = request.description.trim();

        if name.is_empty() || project_id.is_empty() || description.is_empty() {
            return Err(ProvisionError::Validation(
                "Please fill in all fields".to_string(),
            ));
        }
        if !PROJECT_ID_PATTERN.is_match(&project_id) {
            return Err(ProvisionError::Validation(
                "Project ID must contain only lowercase letters, numbers, and hyphens".to_string(),
            ));
        }

        let categories: Vec<String> = request
            .categories
            .iter()
            .map(|category| category.trim())
            .filter(|category| !category.is_empty())
            .map(str::to_string)
            .collect();

        // Ownership comes from the session, never from the caller
        let owner_id = self.sessions.get().user.map(|user| user.id);

        let metadata = ProjectMetadata {
            name: name.to_string(),
            description: description.to_string(),
            categories,
            owner_id,
        };

        match mode {
            ProvisionMode::Edit => {
                run_step(
                    &mut state,
                    Step::Document,
                    "Updating project information...",
                    progress,
                    self.api.update_project_record(&project_id, &metadata),
                )
                .await?;

                transition(state, RunState::Succeeded);
                Ok(ProvisionOutcome::Updated)
            }
            ProvisionMode::Create => {
                run_step(
                    &mut state,
                    Step::Document,
                    "Creating project document...",
                    progress,
                    self.api.create_project_record(&project_id, &metadata),
                )
                .await?;

                let repository = run_step(
                    &mut state,
                    Step::Repository,
                    "Setting up GitHub repository...",
                    progress,
                    self.api.create_repository(&project_id),
                )
                .await?;

                let service = run_step(
                    &mut state,
                    Step::Service,
                    "Deploying service...",
                    progress,
                    self.api.create_service(&project_id),
                )
                .await?;

                transition(state, RunState::Succeeded);
                progress.status("Project created successfully!");

                Ok(ProvisionOutcome::Created {
                    repository_url: repository.url,
                    deployment_url: service.deployment_url,
                    editor_url: format!(
                        "{}/{}",
                        self.editor_base_url.trim_end_matches('/'),
                        project_id
                    ),
                })
            }
        }
    }
}

/// Announce a step, run its remote call, and classify any failure. Later
/// steps structurally require this to have returned `Ok`.
async fn run_step<T, F>(
    state: &mut RunState,
    step: Step,
    message: &str,
    progress: &dyn ProgressSink,
    call: F,
) -> Result<T, ProvisionError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    progress.status(message);
    *state = transition(*state, RunState::RunningStep(step));
    match call.await {
        Ok(value) => Ok(value),
        Err(error) => {
            *state = transition(*state, RunState::Failed(step));
            Err(classify(step, error))
        }
    }
}

/// Sort a raw step failure into the error taxonomy. Conflicts are detected
/// by message-content inspection; everything else is surfaced verbatim.
fn classify(step: Step, error: ApiError) -> ProvisionError {
    let message = error.to_string();
    if error.is_conflict() {
        ProvisionError::Conflict { step, message }
    } else {
        ProvisionError::Remote { step, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MockProvisioningApi, RepositoryCreated, ServiceCreated};
    use crate::provision::SilentProgress;
    use crate::session::{AuthUser, MemorySessionStorage, Session};
    use std::sync::Mutex;

    const EDITOR_BASE: &str = "https://editor.basebase.ai";

    fn sessions() -> Arc<SessionStore> {
        let store = SessionStore::open(Arc::new(MemorySessionStorage::new()));
        store.set(Session::authenticated(
            AuthUser {
                id: "user_1".to_string(),
                name: "bob".to_string(),
                phone: "+15551234567".to_string(),
            },
            None,
            "tok".to_string(),
        ));
        Arc::new(store)
    }

    fn request(project_id: &str) -> ProvisioningRequest {
        ProvisioningRequest::new(project_id, "My App", "Does things", vec!["social".to_string()])
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Send + Sync) {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let sink_messages = Arc::clone(&messages);
        let sink = move |message: &str| sink_messages.lock().unwrap().push(message.to_string());
        (messages, sink)
    }

    fn status_error(status: u16, message: &str) -> ApiError {
        ApiError::Status {
            status,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn invalid_project_id_fails_before_any_remote_call() {
        // A fresh mock panics on any call, so validation must short-circuit
        let orchestrator = ProvisioningOrchestrator::new(
            Arc::new(MockProvisioningApi::new()),
            sessions(),
            EDITOR_BASE,
        );

        let err = orchestrator
            .provision(&request("my app"), ProvisionMode::Create, &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, ProvisionError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Project ID must contain only lowercase letters, numbers, and hyphens"
        );
    }

    #[tokio::test]
    async fn blank_fields_fail_before_any_remote_call() {
        let orchestrator = ProvisioningOrchestrator::new(
            Arc::new(MockProvisioningApi::new()),
            sessions(),
            EDITOR_BASE,
        );

        let blank = ProvisioningRequest::new("my-app", "  ", "Does things", vec![]);
        let err = orchestrator
            .provision(&blank, ProvisionMode::Create, &SilentProgress)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all fields");
    }

    #[tokio::test]
    async fn conflict_at_the_document_step_stops_the_sequence() {
        let mut api = MockProvisioningApi::new();
        api.expect_create_project_record()
            .times(1)
            .returning(|_, _| Err(status_error(409, "Project 'foo' already exists")));
        // No expectations for repository/service: reaching them panics

        let orchestrator = ProvisioningOrchestrator::new(Arc::new(api), sessions(), EDITOR_BASE);
        let err = orchestrator
            .provision(&request("foo"), ProvisionMode::Create, &SilentProgress)
            .await
            .unwrap_err();

        match &err {
            ProvisionError::Conflict { step, message } => {
                assert_eq!(*step, Step::Document);
                assert_eq!(message, "Project 'foo' already exists");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "The ID you selected is already taken, please try again with a different ID"
        );
    }

    #[tokio::test]
    async fn service_failure_is_remote_with_no_compensating_actions() {
        let mut api = MockProvisioningApi::new();
        api.expect_create_project_record()
            .times(1)
            .returning(|_, _| Ok(()));
        api.expect_create_repository().times(1).returning(|_| {
            Ok(RepositoryCreated {
                url: "https://github.com/basebase-ai/foo".to_string(),
            })
        });
        api.expect_create_service()
            .times(1)
            .returning(|_| Err(status_error(500, "deploy quota exceeded")));
        // The trait has no delete operations; the times(1) expectations above
        // pin the document and repository steps to exactly one call each.

        let orchestrator = ProvisioningOrchestrator::new(Arc::new(api), sessions(), EDITOR_BASE);
        let err = orchestrator
            .provision(&request("foo"), ProvisionMode::Create, &SilentProgress)
            .await
            .unwrap_err();

        match err {
            ProvisionError::Remote { step, message } => {
                assert_eq!(step, Step::Service);
                assert_eq!(message, "deploy quota exceeded");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_runs_all_steps_and_reports_progress_in_order() {
        let mut api = MockProvisioningApi::new();
        api.expect_create_project_record()
            .times(1)
            .withf(|project_id, metadata| {
                project_id == "my-app" && metadata.owner_id.as_deref() == Some("user_1")
            })
            .returning(|_, _| Ok(()));
        api.expect_create_repository().times(1).returning(|_| {
            Ok(RepositoryCreated {
                url: "https://github.com/basebase-ai/my-app".to_string(),
            })
        });
        api.expect_create_service().times(1).returning(|_| {
            Ok(ServiceCreated {
                deployment_url: "https://my-app.basebase.ai".to_string(),
            })
        });

        let orchestrator = ProvisioningOrchestrator::new(Arc::new(api), sessions(), EDITOR_BASE);
        let (messages, sink) = recorder();

        let outcome = orchestrator
            .provision(&request("my-app"), ProvisionMode::Create, &sink)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ProvisionOutcome::Created {
                repository_url: "https://github.com/basebase-ai/my-app".to_string(),
                deployment_url: "https://my-app.basebase.ai".to_string(),
                editor_url: "https://editor.basebase.ai/my-app".to_string(),
            }
        );
        assert_eq!(
            *messages.lock().unwrap(),
            vec![
                "Creating project document...",
                "Setting up GitHub repository...",
                "Deploying service...",
                "Project created successfully!",
            ]
        );
    }

    #[tokio::test]
    async fn request_fields_are_trimmed_and_empty_categories_dropped() {
        let mut api = MockProvisioningApi::new();
        api.expect_create_project_record()
            .times(1)
            .withf(|project_id, metadata| {
                project_id == "my-app"
                    && metadata.name == "My App"
                    && metadata.description == "Does things"
                    && metadata.categories == vec!["social", "games"]
            })
            .returning(|_, _| Ok(()));
        api.expect_create_repository()
            .returning(|_| Ok(RepositoryCreated { url: String::new() }));
        api.expect_create_service().returning(|_| {
            Ok(ServiceCreated {
                deployment_url: String::new(),
            })
        });

        let orchestrator = ProvisioningOrchestrator::new(Arc::new(api), sessions(), EDITOR_BASE);
        let mut request = ProvisioningRequest::new(
            " my-app ",
            " My App ",
            " Does things ",
            vec![" social ".to_string(), "  ".to_string(), "games".to_string()],
        );
        // Caller-supplied ownership is ignored in favor of the session's
        request.owner_id = Some("someone-else".to_string());

        orchestrator
            .provision(&request, ProvisionMode::Create, &SilentProgress)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn edit_touches_only_the_metadata_update() {
        let mut api = MockProvisioningApi::new();
        api.expect_update_project_record()
            .times(2)
            .withf(|project_id, metadata| project_id == "my-app" && metadata.name == "My App")
            .returning(|_, _| Ok(()));
        // create_* must never be called in edit mode

        let orchestrator = ProvisioningOrchestrator::new(Arc::new(api), sessions(), EDITOR_BASE);
        let (messages, sink) = recorder();

        // Resubmitting identical data is idempotent: same outcome, one remote
        // call per submission, and nothing else touched
        for _ in 0..2 {
            let outcome = orchestrator
                .provision(&request("my-app"), ProvisionMode::Edit, &sink)
                .await
                .unwrap();
            assert_eq!(outcome, ProvisionOutcome::Updated);
        }

        assert_eq!(
            *messages.lock().unwrap(),
            vec![
                "Updating project information...",
                "Updating project information...",
            ]
        );
    }

    #[tokio::test]
    async fn anonymous_session_sends_no_owner() {
        let store = Arc::new(SessionStore::open(Arc::new(MemorySessionStorage::new())));
        let mut api = MockProvisioningApi::new();
        api.expect_update_project_record()
            .times(1)
            .withf(|_, metadata| metadata.owner_id.is_none())
            .returning(|_, _| Ok(()));

        let orchestrator = ProvisioningOrchestrator::new(Arc::new(api), store, EDITOR_BASE);
        orchestrator
            .provision(&request("my-app"), ProvisionMode::Edit, &SilentProgress)
            .await
            .unwrap();
    }
}
