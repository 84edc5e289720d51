use super::domain::{Job, JobId};
use crate::identity::PrincipalId;
use crate::storage::RepositoryError;

/// Storage abstraction for job postings.
pub trait JobRepository: Send + Sync {
    fn insert_job(&self, job: Job) -> Result<(), RepositoryError>;

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;

    /// Read-modify-write under one critical section. `apply` runs against a copy of the
    /// current record; the copy replaces the stored record only when `apply` succeeds.
    fn update_job<F, E>(&self, id: &JobId, apply: F) -> Result<Job, E>
    where
        F: FnOnce(&mut Job) -> Result<(), E>,
        E: From<RepositoryError>;

    /// Remove the job together with every application referencing it, atomically with
    /// respect to readers. Returns the number of applications removed.
    fn delete_job(&self, id: &JobId) -> Result<usize, RepositoryError>;

    /// The job and the number of applications referencing it, read under one critical
    /// section so a concurrent cascade delete is seen entirely or not at all.
    fn fetch_job_with_count(&self, id: &JobId) -> Result<Option<(Job, usize)>, RepositoryError>;

    /// Every job paired with its application count from one consistent read, newest
    /// first with ties broken by id. `owner` narrows the result to one employer.
    fn list_jobs_with_counts(
        &self,
        owner: Option<&PrincipalId>,
    ) -> Result<Vec<(Job, usize)>, RepositoryError>;
}
