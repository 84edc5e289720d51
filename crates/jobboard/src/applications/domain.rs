use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::identity::PrincipalId;
use crate::jobs::JobId;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review status. `Pending` may move exactly once, to `Accepted` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }

    pub const fn is_settled(self) -> bool {
        !matches!(self, ApplicationStatus::Pending)
    }

    /// The only legal edges are pending -> accepted and pending -> rejected.
    pub const fn can_transition_to(self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (
                ApplicationStatus::Pending,
                ApplicationStatus::Accepted | ApplicationStatus::Rejected
            )
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An application: content fields belong to the applicant, `status` to the employer
/// owning `job_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant_id: PrincipalId,
    pub resume_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// Applicant-supplied submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub job_id: JobId,
    pub resume_url: String,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

impl ApplicationDraft {
    pub(crate) fn validate(&self) -> Result<(), BoardError> {
        if self.job_id.0.trim().is_empty() {
            return Err(BoardError::validation("job_id is required"));
        }
        if self.resume_url.trim().is_empty() {
            return Err(BoardError::validation("resume_url is required"));
        }
        Ok(())
    }

    pub(crate) fn into_application(self, applicant_id: PrincipalId) -> Application {
        Application {
            id: ApplicationId::generate(),
            job_id: self.job_id,
            applicant_id,
            resume_url: self.resume_url.trim().to_string(),
            cover_letter: self
                .cover_letter
                .map(|letter| letter.trim().to_string())
                .filter(|letter| !letter.is_empty()),
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
        }
    }
}
