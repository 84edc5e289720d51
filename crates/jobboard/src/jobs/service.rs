use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{Job, JobDraft, JobFilter, JobId, JobListing, JobPatch};
use super::repository::JobRepository;
use crate::access::{self, Action};
use crate::error::BoardError;
use crate::identity::Principal;

/// Service composing the ownership guard with job storage.
pub struct JobCatalog<S> {
    store: Arc<S>,
}

impl<S> JobCatalog<S>
where
    S: JobRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Publish a posting owned by `employer`.
    pub fn create(&self, employer: &Principal, draft: JobDraft) -> Result<Job, BoardError> {
        access::authorize(employer, Action::CreateJob).into_result()?;

        let company = employer.profile.company().unwrap_or_default().to_string();
        let job = draft.into_job(employer.id.clone(), company);
        job.validate()?;

        self.store.insert_job(job.clone())?;
        info!(job_id = %job.id, owner_id = %job.owner_id, job_type = %job.job_type, "job created");
        Ok(job)
    }

    pub fn get(&self, id: &JobId) -> Result<Job, BoardError> {
        self.find(id)?.ok_or(BoardError::NotFound)
    }

    pub fn find(&self, id: &JobId) -> Result<Option<Job>, BoardError> {
        Ok(self.store.fetch_job(id)?)
    }

    /// The job with its current application count, observed together.
    pub fn get_counted(&self, id: &JobId) -> Result<(Job, usize), BoardError> {
        self.store
            .fetch_job_with_count(id)?
            .ok_or(BoardError::NotFound)
    }

    /// Apply `patch`, re-validating against the stored record inside the write.
    pub fn update(
        &self,
        employer: &Principal,
        id: &JobId,
        patch: JobPatch,
    ) -> Result<Job, BoardError> {
        let job = self.get(id)?;
        access::authorize(employer, Action::UpdateJob(&job)).into_result()?;

        let updated = self
            .store
            .update_job(id, |current: &mut Job| patch.apply(current))?;
        info!(job_id = %updated.id, "job updated");
        Ok(updated)
    }

    /// Delete a posting and, with it, every application that references it.
    pub fn delete(&self, employer: &Principal, id: &JobId) -> Result<(), BoardError> {
        let job = self.get(id)?;
        access::authorize(employer, Action::DeleteJob(&job)).into_result()?;

        let removed = self.store.delete_job(id)?;
        info!(job_id = %id, applications_removed = removed, "job deleted");
        Ok(())
    }

    /// Public listing, newest first. The returned listing iterates a snapshot, so it is
    /// stable for as long as the caller holds it.
    pub fn list(&self, filter: JobFilter) -> Result<JobListing, BoardError> {
        let snapshot = self.store.list_jobs_with_counts(None)?;
        debug!(total = snapshot.len(), ?filter, "job listing snapshot taken");
        Ok(JobListing::new(snapshot, filter))
    }

    /// Postings owned by the calling employer, each with its application count.
    pub fn list_owned(&self, employer: &Principal) -> Result<Vec<(Job, usize)>, BoardError> {
        access::authorize(employer, Action::ListOwnJobs).into_result()?;
        Ok(self.store.list_jobs_with_counts(Some(&employer.id))?)
    }
}
