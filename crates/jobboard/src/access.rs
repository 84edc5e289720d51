//! Ownership Guard: the single source of truth for who may do what.
//!
//! Pure decisions, no persistence. Callers fetch the target records and pass them in;
//! anything not explicitly allowed is denied.

use tracing::warn;

use crate::applications::{Application, ApplicationStatus};
use crate::error::BoardError;
use crate::identity::{Principal, Role};
use crate::jobs::Job;

/// Operation a principal is attempting, with the records it targets.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    CreateJob,
    UpdateJob(&'a Job),
    DeleteJob(&'a Job),
    ListOwnJobs,
    SubmitApplication {
        job: &'a Job,
        already_applied: bool,
    },
    ReadOwnApplications,
    ReadJobApplications(&'a Job),
    SetApplicationStatus {
        job: &'a Job,
        application: &'a Application,
        requested: ApplicationStatus,
    },
}

impl Action<'_> {
    pub const fn name(&self) -> &'static str {
        match self {
            Action::CreateJob => "create_job",
            Action::UpdateJob(_) => "update_job",
            Action::DeleteJob(_) => "delete_job",
            Action::ListOwnJobs => "list_own_jobs",
            Action::SubmitApplication { .. } => "submit_application",
            Action::ReadOwnApplications => "read_own_applications",
            Action::ReadJobApplications(_) => "read_job_applications",
            Action::SetApplicationStatus { .. } => "set_application_status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    RoleRequired(Role),
    NotOwner,
    AlreadyApplied,
    StatusSettled(ApplicationStatus),
    UnsupportedTarget(ApplicationStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn into_result(self) -> Result<(), BoardError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason.into()),
        }
    }
}

/// Denials collapse to the caller-facing taxonomy. Role and ownership misses are a
/// uniform `Forbidden` with no further detail.
impl From<DenyReason> for BoardError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::RoleRequired(_) | DenyReason::NotOwner => BoardError::Forbidden,
            DenyReason::AlreadyApplied => BoardError::DuplicateApplication,
            DenyReason::StatusSettled(current) => BoardError::IllegalTransition { current },
            DenyReason::UnsupportedTarget(requested) => {
                BoardError::UnsupportedTransition { requested }
            }
        }
    }
}

pub fn authorize(principal: &Principal, action: Action<'_>) -> Decision {
    let decision = decide(principal, action);
    if let Decision::Deny(reason) = decision {
        warn!(
            principal_id = %principal.id,
            role = %principal.role(),
            action = action.name(),
            ?reason,
            "authorization denied"
        );
    }
    decision
}

fn decide(principal: &Principal, action: Action<'_>) -> Decision {
    match action {
        Action::CreateJob | Action::ListOwnJobs => require_role(principal, Role::Employer),
        Action::UpdateJob(job) | Action::DeleteJob(job) | Action::ReadJobApplications(job) => {
            require_owner(principal, job)
        }
        Action::SubmitApplication {
            already_applied, ..
        } => match require_role(principal, Role::Applicant) {
            Decision::Allow if already_applied => Decision::Deny(DenyReason::AlreadyApplied),
            decision => decision,
        },
        Action::ReadOwnApplications => require_role(principal, Role::Applicant),
        Action::SetApplicationStatus {
            job,
            application,
            requested,
        } => {
            if application.job_id != job.id {
                return Decision::Deny(DenyReason::NotOwner);
            }
            if let Decision::Deny(reason) = require_owner(principal, job) {
                return Decision::Deny(reason);
            }
            if application.status.is_settled() {
                return Decision::Deny(DenyReason::StatusSettled(application.status));
            }
            if !application.status.can_transition_to(requested) {
                return Decision::Deny(DenyReason::UnsupportedTarget(requested));
            }
            Decision::Allow
        }
    }
}

fn require_role(principal: &Principal, role: Role) -> Decision {
    if principal.is(role) {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::RoleRequired(role))
    }
}

/// Jobs are only ever owned by employers.
fn require_owner(principal: &Principal, job: &Job) -> Decision {
    match principal.role() {
        Role::Employer if principal.id == job.owner_id => Decision::Allow,
        Role::Employer => Decision::Deny(DenyReason::NotOwner),
        Role::Applicant => Decision::Deny(DenyReason::RoleRequired(Role::Employer)),
    }
}

/// Restrict an application set to the ones authored by `principal`.
pub fn own_applications(
    principal: &Principal,
    applications: impl IntoIterator<Item = Application>,
) -> Vec<Application> {
    applications
        .into_iter()
        .filter(|application| application.applicant_id == principal.id)
        .collect()
}
