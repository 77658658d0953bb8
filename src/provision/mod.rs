pub mod orchestrator;

pub use orchestrator::ProvisioningOrchestrator;

use thiserror::Error;

/// Whether a submission creates a new project or updates an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionMode {
    Create,
    Edit,
}

impl ProvisionMode {
    pub fn label(&self) -> &'static str {
        match self {
            ProvisionMode::Create => "create",
            ProvisionMode::Edit => "edit",
        }
    }
}

/// The three dependent remote steps of the create path, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Document,
    Repository,
    Service,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Document => "document",
            Step::Repository => "repository",
            Step::Service => "service",
        };
        f.write_str(name)
    }
}

/// One submission's worth of project data. Ephemeral: lives for the duration
/// of a single provisioning run and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRequest {
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub categories: Vec<String>,
    /// Derived from the current session by the orchestrator; any
    /// caller-supplied value is replaced.
    pub owner_id: Option<String>,
}

impl ProvisioningRequest {
    pub fn new(
        project_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        categories: Vec<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            name: name.into(),
            description: description.into(),
            categories,
            owner_id: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Local validation failure, detected before any remote call
    #[error("{0}")]
    Validation(String),

    /// The identifier is already taken; the user must pick a different one
    #[error("The ID you selected is already taken, please try again with a different ID")]
    Conflict {
        step: Step,
        /// The remote's original wording, kept for logs
        message: String,
    },

    /// Any other failure from a provisioning step; message surfaced verbatim.
    /// Orchestration halts at the failing step with no retries and no
    /// compensating actions.
    #[error("{message}")]
    Remote { step: Step, message: String },
}

/// Result of a successful provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created {
        repository_url: String,
        /// Polling target; the deployment may still be in progress when the
        /// run returns
        deployment_url: String,
        editor_url: String,
    },
    Updated,
}

/// Receiver for the advisory status line emitted before each remote step.
/// Display-only; has no effect on control flow.
pub trait ProgressSink: Send + Sync {
    fn status(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn status(&self, message: &str) {
        self(message)
    }
}

/// Sink that discards all progress messages
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn status(&self, _message: &str) {}
}

/// Derive a project ID from a display name: lowercase, strip everything
/// outside `[a-z0-9 -]`, spaces to hyphens, collapsed and trimmed.
pub fn slugify_project_id(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();

    let mut slug = String::with_capacity(cleaned.len());
    let mut previous_hyphen = false;
    for c in cleaned.chars() {
        if c == ' ' || c == '-' {
            if !previous_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            previous_hyphen = true;
        } else {
            slug.push(c);
            previous_hyphen = false;
        }
    }

    slug.trim_end_matches('-').to_string()
}

/// Split a comma-separated category field into trimmed, non-empty entries
pub fn parse_categories(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|category| !category.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify_project_id("My Awesome App"), "my-awesome-app");
        assert_eq!(slugify_project_id("QuickPoll 2"), "quickpoll-2");
    }

    #[test]
    fn slugify_strips_punctuation_and_collapses_hyphens() {
        assert_eq!(slugify_project_id("Bob's  App!"), "bobs-app");
        assert_eq!(slugify_project_id("a -- b"), "a-b");
        assert_eq!(slugify_project_id("-edges- "), "edges");
    }

    #[test]
    fn slugify_of_only_punctuation_is_empty() {
        assert_eq!(slugify_project_id("!!!"), "");
    }

    #[test]
    fn categories_parse_trimmed_and_non_empty() {
        assert_eq!(
            parse_categories(" social , , games,productivity "),
            vec!["social", "games", "productivity"]
        );
        assert!(parse_categories("").is_empty());
    }
}
