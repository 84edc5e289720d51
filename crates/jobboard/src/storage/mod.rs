//! Persistence boundary shared by the identity, catalog, and ledger components.
//!
//! Each component declares the repository trait it needs next to its service; a single
//! backing store implements all of them so that cross-component invariants (cascade
//! delete, no orphan applications) hold under one critical section.

pub mod memory;

pub use memory::MemoryStore;

use crate::applications::{ApplicationRepository, ApplicationStatus};
use crate::identity::PrincipalRepository;
use crate::jobs::JobRepository;

/// Everything the board needs from a backing store.
pub trait BoardStore: PrincipalRepository + JobRepository + ApplicationRepository {}

impl<T> BoardStore for T where T: PrincipalRepository + JobRepository + ApplicationRepository {}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("referenced parent record not found")]
    MissingParent,
    #[error("record status is {current}, expected {expected}")]
    StaleStatus {
        expected: ApplicationStatus,
        current: ApplicationStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
