//! Job board: lists postings, filters them, and fetches skill-based recommendations.
//!
//! Unlike profile fetches, these are one-shot operations and return their
//! failures to the caller as [`ApiError`].

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api_client::{ApiError, Endpoint, ProfileApi};
use crate::models::job::JobListing;
use crate::models::profile::UserId;
use crate::profile::sections::split_skills;
use crate::profile::SUBJECT_PARAM;

/// Query parameter carrying the comma-joined skill list.
pub const SKILLS_PARAM: &str = "skills";

/// Postings at most this many days old count as recent.
pub const RECENT_DAYS: i64 = 2;

/// Parses a posting date. The server sends `dd-mm-yyyy`; ISO dates and
/// timestamps (`yyyy-mm-dd...`) are accepted as well.
pub fn parse_posted_on(created_at: &str) -> Option<NaiveDate> {
    let raw = created_at.trim();
    NaiveDate::parse_from_str(raw, "%d-%m-%Y")
        .ok()
        .or_else(|| {
            raw.get(..10)
                .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        })
}

/// Whole days between posting and `today`. Dates in the future count as today.
pub fn days_since(created_at: &str, today: NaiveDate) -> Option<i64> {
    parse_posted_on(created_at).map(|posted| (today - posted).num_days().max(0))
}

pub fn days_ago_label(days: i64) -> String {
    match days {
        0 => "Today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{n} days ago"),
    }
}

fn with_age(mut job: JobListing, today: NaiveDate) -> JobListing {
    job.days_ago = match job.created_at.as_deref() {
        Some(created_at) => {
            let label = days_since(created_at, today).map(days_ago_label);
            if label.is_none() {
                warn!(created_at, "unreadable posting date");
            }
            label
        }
        None => None,
    };
    job
}

/// Decodes the listing array out of a response payload. Recommendations nest
/// it one level deeper under `data`. Entries that are not objects are skipped.
fn decode_listings(data: Value) -> Vec<JobListing> {
    let items = match data {
        Value::Array(items) => items,
        Value::Object(mut fields) => match fields.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<JobListing>(item) {
            Ok(job) => Some(job),
            Err(e) => {
                warn!("skipping malformed job listing: {e}");
                None
            }
        })
        .collect()
}

/// Read-only view of the job postings, backed by the same API client as profiles.
pub struct JobBoard {
    api: Arc<dyn ProfileApi>,
}

impl JobBoard {
    pub fn new(api: Arc<dyn ProfileApi>) -> Self {
        Self { api }
    }

    /// Every posting, each labelled with its age relative to `today`.
    pub async fn list(&self, today: NaiveDate) -> Result<Vec<JobListing>, ApiError> {
        let data = self
            .api
            .get(Endpoint::Jobs, &[])
            .await?
            .into_result(|| "Failed to fetch jobs".to_string())?;

        let jobs: Vec<_> = decode_listings(data)
            .into_iter()
            .map(|job| with_age(job, today))
            .collect();
        debug!(count = jobs.len(), "jobs fetched");
        Ok(jobs)
    }

    /// Postings matching `query`; see [`JobListing::matches`].
    pub async fn search(&self, query: &str, today: NaiveDate) -> Result<Vec<JobListing>, ApiError> {
        let mut jobs = self.list(today).await?;
        jobs.retain(|job| job.matches(query));
        Ok(jobs)
    }

    /// Postings from the last [`RECENT_DAYS`] days. Undated postings are left out.
    pub async fn recent(&self, today: NaiveDate) -> Result<Vec<JobListing>, ApiError> {
        let mut jobs = self.list(today).await?;
        jobs.retain(|job| {
            job.created_at
                .as_deref()
                .and_then(|created_at| days_since(created_at, today))
                .is_some_and(|days| days <= RECENT_DAYS)
        });
        Ok(jobs)
    }

    /// Postings recommended for the subject's skills.
    ///
    /// A subject without skills gets an empty list and no recommendation request is made.
    pub async fn recommended(
        &self,
        subject: UserId,
        today: NaiveDate,
    ) -> Result<Vec<JobListing>, ApiError> {
        let skills_data = self
            .api
            .get(
                Endpoint::Skills,
                &[(SUBJECT_PARAM.to_string(), subject.to_string())],
            )
            .await?
            .into_result(|| "Failed to fetch skills".to_string())?;

        let skills: Vec<String> = match split_skills(&skills_data) {
            Value::Array(names) => names
                .into_iter()
                .filter_map(|name| name.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        if skills.is_empty() {
            info!(subject, "no skills on profile, skipping recommendations");
            return Ok(Vec::new());
        }

        let data = self
            .api
            .get(
                Endpoint::RecommendJobs,
                &[(SKILLS_PARAM.to_string(), skills.join(","))],
            )
            .await?
            .into_result(|| "Failed to fetch recommended jobs".to_string())?;

        Ok(decode_listings(data)
            .into_iter()
            .map(|job| with_age(job, today))
            .collect())
    }
}
