use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{Application, ApplicationDraft, ApplicationId, ApplicationStatus};
use super::repository::ApplicationRepository;
use crate::access::{self, Action};
use crate::error::BoardError;
use crate::identity::{Principal, Role};
use crate::jobs::{JobId, JobRepository};
use crate::storage::RepositoryError;

/// Service enforcing the application lifecycle on top of the shared store.
pub struct ApplicationLedger<S> {
    store: Arc<S>,
}

impl<S> ApplicationLedger<S>
where
    S: JobRepository + ApplicationRepository + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Submit an application as `applicant`. A second submission for the same job fails
    /// with `DuplicateApplication`, including when two submissions race.
    pub fn submit(
        &self,
        applicant: &Principal,
        draft: ApplicationDraft,
    ) -> Result<Application, BoardError> {
        draft.validate()?;
        let job = self
            .store
            .fetch_job(&draft.job_id)?
            .ok_or(BoardError::NotFound)?;

        let already_applied = match applicant.role() {
            Role::Applicant => self.store.has_applied(&job.id, &applicant.id)?,
            Role::Employer => false,
        };
        access::authorize(
            applicant,
            Action::SubmitApplication {
                job: &job,
                already_applied,
            },
        )
        .into_result()?;

        let application = draft.into_application(applicant.id.clone());
        match self.store.insert_application(application.clone()) {
            Ok(()) => {
                info!(
                    application_id = %application.id,
                    job_id = %application.job_id,
                    applicant_id = %application.applicant_id,
                    "application submitted"
                );
                Ok(application)
            }
            Err(RepositoryError::Conflict) => Err(BoardError::DuplicateApplication),
            Err(RepositoryError::MissingParent) => Err(BoardError::NotFound),
            Err(other) => Err(other.into()),
        }
    }

    /// Applications authored by `applicant`, newest first.
    pub fn list_mine(&self, applicant: &Principal) -> Result<Vec<Application>, BoardError> {
        access::authorize(applicant, Action::ReadOwnApplications).into_result()?;
        let applications = self.store.applications_by_applicant(&applicant.id)?;
        let visible = access::own_applications(applicant, applications);
        debug!(applicant_id = %applicant.id, count = visible.len(), "listed own applications");
        Ok(visible)
    }

    /// Applications received for a job, visible only to the job's owner.
    pub fn list_for_job(
        &self,
        employer: &Principal,
        job_id: &JobId,
    ) -> Result<Vec<Application>, BoardError> {
        let job = self.store.fetch_job(job_id)?.ok_or(BoardError::NotFound)?;
        access::authorize(employer, Action::ReadJobApplications(&job)).into_result()?;
        Ok(self.store.applications_for_job(job_id)?)
    }

    /// Settle a pending application. Only the owner of the referenced job may do so,
    /// and only once.
    pub fn set_status(
        &self,
        employer: &Principal,
        application_id: &ApplicationId,
        requested: ApplicationStatus,
    ) -> Result<Application, BoardError> {
        // Unknown ids and ids on someone else's job are indistinguishable to the caller.
        let application = self
            .store
            .fetch_application(application_id)?
            .ok_or(BoardError::Forbidden)?;
        let job = self
            .store
            .fetch_job(&application.job_id)?
            .ok_or(BoardError::Forbidden)?;

        access::authorize(
            employer,
            Action::SetApplicationStatus {
                job: &job,
                application: &application,
                requested,
            },
        )
        .into_result()?;

        match self.store.transition_application(
            application_id,
            ApplicationStatus::Pending,
            requested,
        ) {
            Ok(updated) => {
                info!(
                    application_id = %updated.id,
                    job_id = %updated.job_id,
                    status = %updated.status,
                    "application status changed"
                );
                Ok(updated)
            }
            Err(RepositoryError::StaleStatus { current, .. }) => {
                Err(BoardError::IllegalTransition { current })
            }
            Err(other) => Err(other.into()),
        }
    }
}
