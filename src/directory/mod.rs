pub mod normalize;

pub use normalize::{normalize_record, ProjectRecord, DESCRIPTION_PLACEHOLDER};

use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

use crate::platform::DirectoryApi;
use crate::session::Session;

/// Directory fetch failure; the message is what callers display
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0}")]
    Fetch(String),
}

/// Case-insensitive substring search over name, description, and every
/// category entry. An empty query matches all records; a record matches when
/// any one field matches.
pub fn search(records: &[ProjectRecord], query: &str) -> Vec<ProjectRecord> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| {
            record.name.to_lowercase().contains(&needle)
                || record.description.to_lowercase().contains(&needle)
                || record
                    .categories
                    .iter()
                    .any(|category| category.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Advisory ownership check: the session's user must own the record.
/// Never authoritative; the platform enforces ownership on write.
pub fn can_edit(record: &ProjectRecord, session: &Session) -> bool {
    if !session.is_authenticated {
        return false;
    }
    match (&session.user, &record.owner_id) {
        (Some(user), Some(owner_id)) => user.id == *owner_id,
        _ => false,
    }
}

#[derive(Default)]
struct CacheState {
    last_version: Option<u64>,
    records: Option<Vec<ProjectRecord>>,
}

/// The searchable, cached list of published projects.
///
/// `fetch` re-hits the read API only when the caller's refresh epoch
/// increases past the last value this directory observed; equal or lower
/// epochs are served from cache.
pub struct ProjectDirectory {
    api: Arc<dyn DirectoryApi>,
    state: Mutex<CacheState>,
}

impl ProjectDirectory {
    pub fn new(api: Arc<dyn DirectoryApi>) -> Self {
        Self {
            api,
            state: Mutex::new(CacheState::default()),
        }
    }

    /// Fetch and normalize the published project list. Idempotent and safe
    /// to call repeatedly; never panics past this boundary.
    pub async fn fetch(&self, trigger_version: u64) -> Result<Vec<ProjectRecord>, DirectoryError> {
        {
            let state = self.state.lock().unwrap();
            if let (Some(last), Some(records)) = (state.last_version, state.records.as_ref()) {
                if trigger_version <= last {
                    debug!(trigger_version, "Serving project directory from cache");
                    return Ok(records.clone());
                }
            }
        }

        let raw_records = self
            .api
            .list_projects()
            .await
            .map_err(|e| DirectoryError::Fetch(e.to_string()))?;

        let mut records = Vec::with_capacity(raw_records.len());
        for raw in raw_records {
            match normalize_record(raw) {
                Some(record) => records.push(record),
                None => warn!("Skipping project record without an id"),
            }
        }

        let mut state = self.state.lock().unwrap();
        state.last_version = Some(
            state
                .last_version
                .map_or(trigger_version, |last| last.max(trigger_version)),
        );
        state.records = Some(records.clone());
        Ok(records)
    }
}
