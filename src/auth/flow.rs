use regex::Regex;
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::info;

use crate::platform::{ApiError, AuthApi};
use crate::session::{Session, SessionStore};

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z0-9_]+$").unwrap());

/// Where the sign-in conversation currently stands.
///
/// `AwaitingCode` retains the challenged username and phone so a caller can
/// re-prompt or correct the code without restarting the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    Idle,
    AwaitingCode { username: String, phone: String },
    Authenticated,
}

impl AuthPhase {
    fn label(&self) -> &'static str {
        match self {
            AuthPhase::Idle => "idle",
            AuthPhase::AwaitingCode { .. } => "awaiting-code",
            AuthPhase::Authenticated => "authenticated",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Local validation failure; no remote call was made
    #[error("{0}")]
    Validation(String),

    /// The authentication service failed; message surfaced verbatim
    #[error(transparent)]
    Remote(#[from] ApiError),

    /// The operation is not a legal transition from the current phase
    #[error("{operation} is not valid in the {phase} phase")]
    InvalidPhase {
        operation: &'static str,
        phase: &'static str,
    },
}

/// Two-step challenge/response state machine that turns a username and phone
/// number into a verified session.
///
/// `Idle -> AwaitingCode -> Authenticated`, with sign-out returning to `Idle`
/// and `AwaitingCode` re-entrant on verification failure. Every transition is
/// user-triggered; there are no automatic retries or timeouts.
pub struct AuthFlow {
    api: Arc<dyn AuthApi>,
    sessions: Arc<SessionStore>,
    phase: AuthPhase,
}

impl AuthFlow {
    /// Build a flow over the given service and session store. A store
    /// hydrated from a persisted authenticated session starts the flow in
    /// `Authenticated`.
    pub fn new(api: Arc<dyn AuthApi>, sessions: Arc<SessionStore>) -> Self {
        let phase = if sessions.get().is_authenticated {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Idle
        };
        Self {
            api,
            sessions,
            phase,
        }
    }

    pub fn phase(&self) -> &AuthPhase {
        &self.phase
    }

    /// Ask the platform to send a one-time code. Valid only from `Idle`;
    /// validation failures make no remote call and leave the phase unchanged.
    pub async fn request_code(&mut self, username: &str, phone: &str) -> Result<(), AuthError> {
        if self.phase != AuthPhase::Idle {
            return Err(AuthError::InvalidPhase {
                operation: "request_code",
                phase: self.phase.label(),
            });
        }

        let username = username.trim();
        let phone = phone.trim();

        if username.is_empty() || phone.is_empty() {
            return Err(AuthError::Validation(
                "Please enter both username and phone number".to_string(),
            ));
        }
        if !USERNAME_PATTERN.is_match(username) {
            return Err(AuthError::Validation(
                "Username must contain only letters, numbers, and underscores".to_string(),
            ));
        }

        self.api.request_code(username, phone).await?;

        info!(username, "Verification code requested");
        self.phase = AuthPhase::AwaitingCode {
            username: username.to_string(),
            phone: phone.to_string(),
        };
        Ok(())
    }

    /// Exchange the one-time code for a session. Valid only from
    /// `AwaitingCode`; on remote failure the phase is retained so the caller
    /// can correct the code and retry.
    pub async fn verify_code(
        &mut self,
        phone: &str,
        code: &str,
        project_id: &str,
    ) -> Result<(), AuthError> {
        if !matches!(self.phase, AuthPhase::AwaitingCode { .. }) {
            return Err(AuthError::InvalidPhase {
                operation: "verify_code",
                phase: self.phase.label(),
            });
        }

        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::Validation(
                "Please enter the verification code".to_string(),
            ));
        }

        let verified = self
            .api
            .verify_code(phone.trim(), code, project_id)
            .await?;

        info!(user = %verified.user.name, "Code verified, session established");
        self.sessions.set(Session::authenticated(
            verified.user,
            verified.project,
            verified.token,
        ));
        self.phase = AuthPhase::Authenticated;
        Ok(())
    }

    /// Clear the session locally and return to `Idle`. No remote invalidation
    /// call is made; the token simply stops being stored.
    pub fn sign_out(&mut self) -> Result<(), AuthError> {
        if self.phase != AuthPhase::Authenticated {
            return Err(AuthError::InvalidPhase {
                operation: "sign_out",
                phase: self.phase.label(),
            });
        }

        self.sessions.set(Session::anonymous());
        self.phase = AuthPhase::Idle;
        info!("Signed out");
        Ok(())
    }
}
