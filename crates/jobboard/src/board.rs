//! Facade wiring the components over one shared store, plus the read-side views that
//! join jobs, applications and principals.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::aggregation::{Aggregation, ApplicationSummary};
use crate::applications::{Application, ApplicationLedger};
use crate::config::AuthConfig;
use crate::error::BoardError;
use crate::identity::{IdentityService, Principal};
use crate::jobs::{Job, JobCatalog, JobFilter, JobId};
use crate::storage::{BoardStore, RepositoryError};

/// Job payload carrying its derived application count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobView {
    #[serde(flatten)]
    pub job: Job,
    pub applications_count: usize,
}

impl From<(Job, usize)> for JobView {
    fn from((job, applications_count): (Job, usize)) -> Self {
        Self {
            job,
            applications_count,
        }
    }
}

/// An applicant's own application with the job it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MyApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    pub company_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MyApplications {
    pub applications: Vec<MyApplicationView>,
    pub summary: ApplicationSummary,
}

/// An application as the owning employer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobApplicationView {
    #[serde(flatten)]
    pub application: Application,
    pub applicant_name: String,
    pub applicant_email: String,
}

pub struct JobBoard<S> {
    identity: IdentityService<S>,
    catalog: JobCatalog<S>,
    ledger: ApplicationLedger<S>,
    aggregation: Aggregation<S>,
}

impl<S> JobBoard<S>
where
    S: BoardStore + 'static,
{
    pub fn new(store: Arc<S>, auth: &AuthConfig) -> Self {
        Self {
            identity: IdentityService::new(store.clone(), auth),
            catalog: JobCatalog::new(store.clone()),
            ledger: ApplicationLedger::new(store.clone()),
            aggregation: Aggregation::new(store),
        }
    }

    pub fn identity(&self) -> &IdentityService<S> {
        &self.identity
    }

    pub fn catalog(&self) -> &JobCatalog<S> {
        &self.catalog
    }

    pub fn ledger(&self) -> &ApplicationLedger<S> {
        &self.ledger
    }

    pub fn aggregation(&self) -> &Aggregation<S> {
        &self.aggregation
    }

    /// Job views pair each job with a count read in the same store access, so a
    /// concurrent cascade delete never yields a live job whose applications are gone.
    pub fn get_job(&self, id: &JobId) -> Result<JobView, BoardError> {
        Ok(self.catalog.get_counted(id)?.into())
    }

    pub fn list_jobs(&self, filter: JobFilter) -> Result<Vec<JobView>, BoardError> {
        let listing = self.catalog.list(filter)?;
        Ok(listing
            .counted()
            .map(|(job, count)| JobView::from((job.clone(), count)))
            .collect())
    }

    pub fn my_jobs(&self, employer: &Principal) -> Result<Vec<JobView>, BoardError> {
        Ok(self
            .catalog
            .list_owned(employer)?
            .into_iter()
            .map(JobView::from)
            .collect())
    }

    /// Status tally over the applicant's own applications.
    pub fn summary(&self, applicant: &Principal) -> Result<ApplicationSummary, BoardError> {
        let mine = self.ledger.list_mine(applicant)?;
        Ok(ApplicationSummary::fold(&mine))
    }

    pub fn my_applications(&self, applicant: &Principal) -> Result<MyApplications, BoardError> {
        let mine = self.ledger.list_mine(applicant)?;
        let mut applications = Vec::with_capacity(mine.len());
        for application in mine {
            // The job may have been deleted, with its applications, since the read above.
            let Some(job) = self.catalog.find(&application.job_id)? else {
                continue;
            };
            applications.push(MyApplicationView {
                application,
                job_title: job.title,
                company_name: job.company_name,
            });
        }

        let summary = ApplicationSummary::fold(applications.iter().map(|view| &view.application));
        Ok(MyApplications {
            applications,
            summary,
        })
    }

    pub fn job_applications(
        &self,
        employer: &Principal,
        job_id: &JobId,
    ) -> Result<Vec<JobApplicationView>, BoardError> {
        self.ledger
            .list_for_job(employer, job_id)?
            .into_iter()
            .map(|application| {
                let applicant = self.identity.find(&application.applicant_id)?.ok_or_else(|| {
                    warn!(application_id = %application.id, "application references unknown applicant");
                    BoardError::Storage(RepositoryError::MissingParent)
                })?;
                Ok(JobApplicationView {
                    application,
                    applicant_name: applicant.name,
                    applicant_email: applicant.email,
                })
            })
            .collect()
    }
}
