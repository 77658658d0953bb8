pub mod persistence;
pub mod store;

pub use persistence::{FileSessionStorage, MemorySessionStorage, SessionStorage, SessionStorageError};
pub use store::{SessionStore, SubscriptionId};

use serde::{Deserialize, Serialize};

/// The user bound to an authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub phone: String,
}

/// The current authentication state of the running process.
///
/// Invariants: `token` is present iff `is_authenticated`, and `user` is
/// present iff `is_authenticated`. The session is always replaced as a whole
/// unit, never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<AuthUser>,
    /// Opaque project descriptor returned by the platform; never interpreted
    /// by the client.
    pub project: Option<serde_json::Value>,
    pub token: Option<String>,
}

impl Session {
    /// The unauthenticated session
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            user: None,
            project: None,
            token: None,
        }
    }

    /// A session bound to a verified user
    pub fn authenticated(user: AuthUser, project: Option<serde_json::Value>, token: String) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
            project,
            token: Some(token),
        }
    }

    /// Check the session invariants. A persisted value that fails this check
    /// is treated as corrupt and replaced with the anonymous session.
    pub fn is_valid(&self) -> bool {
        self.token.is_some() == self.is_authenticated && self.user.is_some() == self.is_authenticated
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}
