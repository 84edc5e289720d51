use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::applications::{
    Application, ApplicationDraft, ApplicationId, ApplicationRepository, ApplicationStatus,
};
use crate::board::JobBoard;
use crate::config::AuthConfig;
use crate::identity::{Principal, PrincipalId, PrincipalRecord, PrincipalRepository, Registration};
use crate::jobs::{Job, JobDraft, JobId, JobRepository, JobType};
use crate::storage::{MemoryStore, RepositoryError};

pub(super) const PASSWORD: &str = "correct-horse-battery";

pub(super) fn board() -> Arc<JobBoard<MemoryStore>> {
    Arc::new(JobBoard::new(
        Arc::new(MemoryStore::default()),
        &AuthConfig::ephemeral(),
    ))
}

pub(super) fn employer_registration(email: &str, company: &str) -> Registration {
    Registration {
        name: format!("Hiring manager at {company}"),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        role: "employer".to_string(),
        company: Some(company.to_string()),
        phone: None,
        location: None,
    }
}

pub(super) fn applicant_registration(email: &str) -> Registration {
    Registration {
        name: format!("Candidate {email}"),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        role: "applicant".to_string(),
        company: None,
        phone: None,
        location: Some("Austin".to_string()),
    }
}

pub(super) fn register_employer(board: &JobBoard<MemoryStore>, email: &str) -> Principal {
    board
        .identity()
        .register(employer_registration(email, "Acme"))
        .expect("employer registers")
}

pub(super) fn register_applicant(board: &JobBoard<MemoryStore>, email: &str) -> Principal {
    board
        .identity()
        .register(applicant_registration(email))
        .expect("applicant registers")
}

pub(super) fn job_draft() -> JobDraft {
    JobDraft {
        title: "Platform Engineer".to_string(),
        description: "Run the scheduling platform".to_string(),
        requirements: "Rust, Postgres".to_string(),
        location: "Remote".to_string(),
        job_type: JobType::FullTime,
        salary_min: 50_000,
        salary_max: 90_000,
        deadline: NaiveDate::from_ymd_opt(2026, 12, 31).expect("valid date"),
    }
}

pub(super) fn post_job(board: &JobBoard<MemoryStore>, employer: &Principal) -> Job {
    board
        .catalog()
        .create(employer, job_draft())
        .expect("job created")
}

pub(super) fn draft_for(job_id: &JobId) -> ApplicationDraft {
    ApplicationDraft {
        job_id: job_id.clone(),
        resume_url: "http://x".to_string(),
        cover_letter: Some("I would like to help.".to_string()),
    }
}

pub(super) fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).expect("json body")))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request builds")
}

pub(super) async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Store whose every call fails as if the backend were down.
#[derive(Default)]
pub(super) struct UnavailableStore;

fn unavailable() -> RepositoryError {
    RepositoryError::Unavailable("backend offline".to_string())
}

impl PrincipalRepository for UnavailableStore {
    fn insert_principal(&self, _record: PrincipalRecord) -> Result<(), RepositoryError> {
        Err(unavailable())
    }

    fn fetch_principal(&self, _id: &PrincipalId) -> Result<Option<PrincipalRecord>, RepositoryError> {
        Err(unavailable())
    }

    fn fetch_principal_by_email(
        &self,
        _email: &str,
    ) -> Result<Option<PrincipalRecord>, RepositoryError> {
        Err(unavailable())
    }
}

impl JobRepository for UnavailableStore {
    fn insert_job(&self, _job: Job) -> Result<(), RepositoryError> {
        Err(unavailable())
    }

    fn fetch_job(&self, _id: &JobId) -> Result<Option<Job>, RepositoryError> {
        Err(unavailable())
    }

    fn update_job<F, E>(&self, _id: &JobId, _apply: F) -> Result<Job, E>
    where
        F: FnOnce(&mut Job) -> Result<(), E>,
        E: From<RepositoryError>,
    {
        Err(unavailable().into())
    }

    fn delete_job(&self, _id: &JobId) -> Result<usize, RepositoryError> {
        Err(unavailable())
    }

    fn fetch_job_with_count(
        &self,
        _id: &JobId,
    ) -> Result<Option<(Job, usize)>, RepositoryError> {
        Err(unavailable())
    }

    fn list_jobs_with_counts(
        &self,
        _owner: Option<&PrincipalId>,
    ) -> Result<Vec<(Job, usize)>, RepositoryError> {
        Err(unavailable())
    }
}

impl ApplicationRepository for UnavailableStore {
    fn insert_application(&self, _application: Application) -> Result<(), RepositoryError> {
        Err(unavailable())
    }

    fn fetch_application(
        &self,
        _id: &ApplicationId,
    ) -> Result<Option<Application>, RepositoryError> {
        Err(unavailable())
    }

    fn transition_application(
        &self,
        _id: &ApplicationId,
        _expected: ApplicationStatus,
        _next: ApplicationStatus,
    ) -> Result<Application, RepositoryError> {
        Err(unavailable())
    }

    fn has_applied(
        &self,
        _job_id: &JobId,
        _applicant: &PrincipalId,
    ) -> Result<bool, RepositoryError> {
        Err(unavailable())
    }

    fn applications_by_applicant(
        &self,
        _applicant: &PrincipalId,
    ) -> Result<Vec<Application>, RepositoryError> {
        Err(unavailable())
    }

    fn applications_for_job(&self, _job_id: &JobId) -> Result<Vec<Application>, RepositoryError> {
        Err(unavailable())
    }

    fn count_applications_for_job(&self, _job_id: &JobId) -> Result<usize, RepositoryError> {
        Err(unavailable())
    }
}
