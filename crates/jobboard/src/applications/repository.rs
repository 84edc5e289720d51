use super::domain::{Application, ApplicationId, ApplicationStatus};
use crate::identity::PrincipalId;
use crate::jobs::JobId;
use crate::storage::RepositoryError;

/// Storage abstraction for the application ledger.
///
/// The conditional writes here are the concurrency contract: `insert_application`
/// checks the parent job and the (job, applicant) uniqueness in the same critical
/// section as the insert, and `transition_application` only writes when the stored
/// status still equals `expected`.
pub trait ApplicationRepository: Send + Sync {
    /// Fails with `MissingParent` when the job does not exist and `Conflict` when the
    /// applicant already has an application for it.
    fn insert_application(&self, application: Application) -> Result<(), RepositoryError>;

    fn fetch_application(&self, id: &ApplicationId)
        -> Result<Option<Application>, RepositoryError>;

    /// Fails with `StaleStatus` when the stored status differs from `expected`.
    fn transition_application(
        &self,
        id: &ApplicationId,
        expected: ApplicationStatus,
        next: ApplicationStatus,
    ) -> Result<Application, RepositoryError>;

    fn has_applied(&self, job_id: &JobId, applicant: &PrincipalId)
        -> Result<bool, RepositoryError>;

    /// Newest first.
    fn applications_by_applicant(
        &self,
        applicant: &PrincipalId,
    ) -> Result<Vec<Application>, RepositoryError>;

    /// Newest first. Fails with `NotFound` when the job does not exist.
    fn applications_for_job(&self, job_id: &JobId) -> Result<Vec<Application>, RepositoryError>;

    fn count_applications_for_job(&self, job_id: &JobId) -> Result<usize, RepositoryError>;
}
