use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::identity::PrincipalId;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Employment type of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "full-time")]
    FullTime,
    #[serde(rename = "part-time")]
    PartTime,
}

impl JobType {
    pub const fn label(self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "full-time" => Some(JobType::FullTime),
            "part-time" => Some(JobType::PartTime),
            _ => None,
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A job posting, exclusively owned by the employer that created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub owner_id: PrincipalId,
    pub company_name: String,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub job_type: JobType,
    pub salary_min: u32,
    pub salary_max: u32,
    /// Informational only; never enforced by the core.
    pub deadline: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn validate(&self) -> Result<(), BoardError> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("requirements", &self.requirements),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(BoardError::validation(format!("{field} is required")));
            }
        }
        validate_salary(self.salary_min, self.salary_max)
    }
}

fn validate_salary(min: u32, max: u32) -> Result<(), BoardError> {
    if min > max {
        return Err(BoardError::validation(format!(
            "salary_min ({min}) must not exceed salary_max ({max})"
        )));
    }
    Ok(())
}

/// Employer-supplied fields for a new posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub job_type: JobType,
    pub salary_min: u32,
    pub salary_max: u32,
    pub deadline: NaiveDate,
}

impl JobDraft {
    pub(crate) fn into_job(self, owner_id: PrincipalId, company_name: String) -> Job {
        Job {
            id: JobId::generate(),
            owner_id,
            company_name,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            requirements: self.requirements.trim().to_string(),
            location: self.location.trim().to_string(),
            job_type: self.job_type,
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            deadline: self.deadline,
            created_at: Utc::now(),
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub salary_min: Option<u32>,
    #[serde(default)]
    pub salary_max: Option<u32>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

impl JobPatch {
    /// Apply onto `job` and re-validate the merged result. On error `job` may be
    /// partially modified; callers apply patches to a scratch copy.
    pub fn apply(&self, job: &mut Job) -> Result<(), BoardError> {
        let text_fields = [
            (&self.title, &mut job.title),
            (&self.description, &mut job.description),
            (&self.requirements, &mut job.requirements),
            (&self.location, &mut job.location),
        ];
        for (patch, current) in text_fields {
            if let Some(value) = patch {
                *current = value.trim().to_string();
            }
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        if let Some(min) = self.salary_min {
            job.salary_min = min;
        }
        if let Some(max) = self.salary_max {
            job.salary_max = max;
        }
        if let Some(deadline) = self.deadline {
            job.deadline = deadline;
        }
        job.validate()
    }
}

/// Conjunction of optional listing predicates. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub search: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<JobType>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(needle) = non_blank(&self.search) {
            let hit = [&job.title, &job.company_name, &job.description]
                .iter()
                .any(|haystack| contains_ignore_case(haystack, needle));
            if !hit {
                return false;
            }
        }
        if let Some(needle) = non_blank(&self.location) {
            if !contains_ignore_case(&job.location, needle) {
                return false;
            }
        }
        match self.job_type {
            Some(job_type) => job.job_type == job_type,
            None => true,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filtered view over a snapshot of the catalog. Iteration is lazy and may be
/// restarted any number of times with identical results.
#[derive(Debug, Clone)]
pub struct JobListing {
    snapshot: Arc<[(Job, usize)]>,
    filter: JobFilter,
}

impl JobListing {
    /// `snapshot` pairs each job with its application count, both taken from one read.
    pub(crate) fn new(snapshot: Vec<(Job, usize)>, filter: JobFilter) -> Self {
        Self {
            snapshot: snapshot.into(),
            filter,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> + '_ {
        self.counted().map(|(job, _)| job)
    }

    /// Matching jobs with the application count captured alongside them.
    pub fn counted(&self) -> impl Iterator<Item = (&Job, usize)> + '_ {
        self.snapshot
            .iter()
            .filter(|(job, _)| self.filter.matches(job))
            .map(|(job, count)| (job, *count))
    }
}

impl<'a> IntoIterator for &'a JobListing {
    type Item = &'a Job;
    type IntoIter = Box<dyn Iterator<Item = &'a Job> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
