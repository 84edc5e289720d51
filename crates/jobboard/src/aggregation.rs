//! Read-time aggregates over the application ledger. Nothing here is stored.

use std::sync::Arc;

use serde::Serialize;

use crate::applications::{Application, ApplicationRepository, ApplicationStatus};
use crate::error::BoardError;
use crate::jobs::JobId;

/// Per-applicant status tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationSummary {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl ApplicationSummary {
    pub fn fold<'a>(applications: impl IntoIterator<Item = &'a Application>) -> Self {
        applications
            .into_iter()
            .fold(Self::default(), |mut summary, application| {
                summary.total += 1;
                match application.status {
                    ApplicationStatus::Pending => summary.pending += 1,
                    ApplicationStatus::Accepted => summary.accepted += 1,
                    ApplicationStatus::Rejected => summary.rejected += 1,
                }
                summary
            })
    }
}

pub struct Aggregation<S> {
    store: Arc<S>,
}

impl<S> Aggregation<S>
where
    S: ApplicationRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Number of applications currently referencing `job_id`.
    pub fn application_count(&self, job_id: &JobId) -> Result<usize, BoardError> {
        Ok(self.store.count_applications_for_job(job_id)?)
    }
}
