use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::platform::RawProjectRecord;

/// Description shown for records that arrive without one
pub const DESCRIPTION_PLACEHOLDER: &str = "No description provided";

/// Canonical project record, post-normalization.
///
/// `categories` holds everything the source record carried;
/// [`ProjectRecord::displayed_categories`] applies the display filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub github_url: Option<String>,
    pub production_url: Option<String>,
    pub users: u64,
    pub forks: u64,
    pub categories: Vec<String>,
    pub owner_id: Option<String>,
    /// Unknown source fields, passed through untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ProjectRecord {
    /// Categories for display: `"uncategorized"` (any casing) is filtered
    /// out here but never deleted from the record itself.
    pub fn displayed_categories(&self) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|category| !category.eq_ignore_ascii_case("uncategorized"))
            .map(String::as_str)
            .collect()
    }
}

/// Pure mapping from a loosely-shaped source record to the canonical shape,
/// with every default stated explicitly. Returns `None` when the record has
/// no usable `id`; everything else has a defined fallback.
pub fn normalize_record(raw: RawProjectRecord) -> Option<ProjectRecord> {
    let id = raw.id.filter(|id| !id.is_empty())?;

    let name = raw
        .name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| id.clone());
    let description = raw
        .description
        .filter(|description| !description.is_empty())
        .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string());
    let categories = categories_from(raw.categories.as_ref(), raw.category.as_deref());

    Some(ProjectRecord {
        id,
        name,
        description,
        github_url: raw.github_url,
        production_url: raw.production_url,
        users: count_from(raw.users.as_ref()),
        forks: count_from(raw.forks.as_ref()),
        categories,
        owner_id: raw.owner_id,
        extra: raw.extra,
    })
}

/// The plural array wins when present; otherwise the legacy singular field
/// is wrapped in a one-element list; otherwise empty.
fn categories_from(categories: Option<&Value>, legacy: Option<&str>) -> Vec<String> {
    match categories {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) if !single.is_empty() => vec![single.clone()],
        _ => match legacy {
            Some(single) if !single.is_empty() => vec![single.to_string()],
            _ => Vec::new(),
        },
    }
}

/// Numeric fields default to 0; negatives and non-numeric shapes clamp to 0
fn count_from(value: Option<&Value>) -> u64 {
    match value.and_then(Value::as_f64) {
        Some(n) if n > 0.0 => n as u64,
        _ => 0,
    }
}
