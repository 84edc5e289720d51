//! Job Catalog: postings owned by employers, publicly listable.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{Job, JobDraft, JobFilter, JobId, JobListing, JobPatch, JobType};
pub use repository::JobRepository;
pub use service::JobCatalog;
