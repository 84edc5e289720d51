//! HTTP boundary. Handlers resolve the bearer credential, call into the board, and let
//! `BoardError` pick the response status.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::aggregation::ApplicationSummary;
use crate::applications::{Application, ApplicationDraft, ApplicationId, ApplicationStatus};
use crate::board::{JobBoard, JobView, MyApplications};
use crate::error::BoardError;
use crate::identity::{Principal, PrincipalView, Registration, Session};
use crate::jobs::{JobDraft, JobFilter, JobId, JobPatch, JobType};
use crate::storage::BoardStore;

/// Router exposing identity, catalog and ledger endpoints under `/api`.
pub fn board_router<S>(board: Arc<JobBoard<S>>) -> Router
where
    S: BoardStore + 'static,
{
    Router::new()
        .route("/api/auth/register", post(register_handler::<S>))
        .route("/api/auth/login", post(login_handler::<S>))
        .route("/api/auth/profile", get(profile_handler::<S>))
        .route(
            "/api/jobs",
            post(create_job_handler::<S>).get(list_jobs_handler::<S>),
        )
        .route("/api/jobs/employer/my-jobs", get(my_jobs_handler::<S>))
        .route(
            "/api/jobs/:job_id",
            get(get_job_handler::<S>)
                .put(update_job_handler::<S>)
                .delete(delete_job_handler::<S>),
        )
        .route("/api/applications", post(submit_handler::<S>))
        .route(
            "/api/applications/my-applications",
            get(my_applications_handler::<S>),
        )
        .route(
            "/api/applications/job/:job_id/applications",
            get(job_applications_handler::<S>),
        )
        .route(
            "/api/applications/:application_id/status",
            put(set_status_handler::<S>),
        )
        .with_state(board)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct JobQuery {
    search: Option<String>,
    location: Option<String>,
    job_type: Option<String>,
}

impl JobQuery {
    fn into_filter(self) -> Result<JobFilter, BoardError> {
        let job_type = match self.job_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(JobType::parse(raw).ok_or_else(|| {
                BoardError::validation("job_type must be 'full-time' or 'part-time'")
            })?),
        };
        Ok(JobFilter {
            search: self.search,
            location: self.location,
            job_type,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    status: String,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, BoardError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| BoardError::validation(rejection.body_text()))
}

fn bearer(headers: &HeaderMap) -> Result<&str, BoardError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(BoardError::InvalidOrExpiredCredential)
}

fn principal<S>(board: &JobBoard<S>, headers: &HeaderMap) -> Result<Principal, BoardError>
where
    S: BoardStore + 'static,
{
    board.identity().resolve(bearer(headers)?)
}

pub(crate) async fn register_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), BoardError>
where
    S: BoardStore + 'static,
{
    let principal = board.identity().register(body(payload)?)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "registered", "principal": principal.view() })),
    ))
}

pub(crate) async fn login_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Session>, BoardError>
where
    S: BoardStore + 'static,
{
    let LoginRequest { email, password } = body(payload)?;
    Ok(Json(board.identity().authenticate(&email, &password)?))
}

pub(crate) async fn profile_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    headers: HeaderMap,
) -> Result<Json<PrincipalView>, BoardError>
where
    S: BoardStore + 'static,
{
    Ok(Json(principal(&board, &headers)?.view()))
}

pub(crate) async fn create_job_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    headers: HeaderMap,
    payload: Result<Json<JobDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<JobView>), BoardError>
where
    S: BoardStore + 'static,
{
    let employer = principal(&board, &headers)?;
    let job = board.catalog().create(&employer, body(payload)?)?;
    Ok((StatusCode::CREATED, Json(JobView::from((job, 0)))))
}

pub(crate) async fn list_jobs_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    query: Result<Query<JobQuery>, QueryRejection>,
) -> Result<Json<Value>, BoardError>
where
    S: BoardStore + 'static,
{
    let Query(query) = query.map_err(|rejection| BoardError::validation(rejection.body_text()))?;
    let jobs = board.list_jobs(query.into_filter()?)?;
    Ok(Json(json!({ "jobs": jobs })))
}

pub(crate) async fn get_job_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobView>, BoardError>
where
    S: BoardStore + 'static,
{
    Ok(Json(board.get_job(&JobId(job_id))?))
}

pub(crate) async fn update_job_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    payload: Result<Json<JobPatch>, JsonRejection>,
) -> Result<Json<JobView>, BoardError>
where
    S: BoardStore + 'static,
{
    let employer = principal(&board, &headers)?;
    let job = board
        .catalog()
        .update(&employer, &JobId(job_id), body(payload)?)?;
    Ok(Json(board.get_job(&job.id)?))
}

pub(crate) async fn delete_job_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, BoardError>
where
    S: BoardStore + 'static,
{
    let employer = principal(&board, &headers)?;
    let job_id = JobId(job_id);
    board.catalog().delete(&employer, &job_id)?;
    Ok(Json(json!({ "message": "job deleted", "job_id": job_id })))
}

pub(crate) async fn my_jobs_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    headers: HeaderMap,
) -> Result<Json<Value>, BoardError>
where
    S: BoardStore + 'static,
{
    let employer = principal(&board, &headers)?;
    let jobs = board.my_jobs(&employer)?;
    Ok(Json(json!({ "jobs": jobs })))
}

pub(crate) async fn submit_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    headers: HeaderMap,
    payload: Result<Json<ApplicationDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Application>), BoardError>
where
    S: BoardStore + 'static,
{
    let applicant = principal(&board, &headers)?;
    let application = board.ledger().submit(&applicant, body(payload)?)?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub(crate) async fn my_applications_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    headers: HeaderMap,
) -> Result<Json<MyApplications>, BoardError>
where
    S: BoardStore + 'static,
{
    let applicant = principal(&board, &headers)?;
    Ok(Json(board.my_applications(&applicant)?))
}

pub(crate) async fn job_applications_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, BoardError>
where
    S: BoardStore + 'static,
{
    let employer = principal(&board, &headers)?;
    let applications = board.job_applications(&employer, &JobId(job_id))?;
    let summary = ApplicationSummary::fold(applications.iter().map(|view| &view.application));
    Ok(Json(json!({ "applications": applications, "summary": summary })))
}

pub(crate) async fn set_status_handler<S>(
    State(board): State<Arc<JobBoard<S>>>,
    headers: HeaderMap,
    Path(application_id): Path<String>,
    payload: Result<Json<StatusChange>, JsonRejection>,
) -> Result<Json<Application>, BoardError>
where
    S: BoardStore + 'static,
{
    let employer = principal(&board, &headers)?;
    let StatusChange { status } = body(payload)?;
    let requested = ApplicationStatus::parse(&status).ok_or_else(|| {
        BoardError::validation("status must be one of pending, accepted, rejected")
    })?;
    let updated =
        board
            .ledger()
            .set_status(&employer, &ApplicationId(application_id), requested)?;
    Ok(Json(updated))
}
