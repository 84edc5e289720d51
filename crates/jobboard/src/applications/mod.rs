//! Application Ledger: submissions, the one-per-(job, applicant) rule, and the
//! pending -> accepted | rejected status machine.

pub mod domain;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{Application, ApplicationDraft, ApplicationId, ApplicationStatus};
pub use repository::ApplicationRepository;
pub use service::ApplicationLedger;
