use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sanitize::split_csv;

/// One posting as returned by `/jobs` and `/job-recommendation`.
///
/// Text fields are optional because the server sends `null` for unset columns.
/// Columns the client does not interpret are kept in `extra` and echoed back on output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    #[serde(default)]
    pub job_id: Option<Value>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    /// Comma-separated skill names.
    #[serde(default)]
    pub job_skills: Option<String>,
    #[serde(default)]
    pub job_location: Option<String>,
    /// Posting date, `dd-mm-yyyy` on the wire.
    #[serde(default)]
    pub created_at: Option<String>,
    /// "Today", "1 day ago" or "N days ago"; absent when `created_at` is unreadable.
    #[serde(
        rename = "daysAgo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub days_ago: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn contains_folded(field: &Option<String>, needle: &str) -> bool {
    field
        .as_deref()
        .is_some_and(|text| text.to_lowercase().contains(needle))
}

impl JobListing {
    /// Case-insensitive match: substring of company, title or department,
    /// or an exact (trimmed) match against one of the listed skills.
    /// A blank query matches every listing.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        contains_folded(&self.company_name, &needle)
            || contains_folded(&self.job_title, &needle)
            || contains_folded(&self.department, &needle)
            || self
                .job_skills
                .as_deref()
                .map(split_csv)
                .unwrap_or_default()
                .iter()
                .any(|skill| skill.to_lowercase() == needle)
    }
}
