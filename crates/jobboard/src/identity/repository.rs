use super::domain::{PrincipalId, PrincipalRecord};
use crate::storage::RepositoryError;

/// Storage abstraction for registered principals.
///
/// `insert_principal` must reject a second record with the same (normalized) email with
/// [`RepositoryError::Conflict`] as a single atomic check-and-insert.
pub trait PrincipalRepository: Send + Sync {
    fn insert_principal(&self, record: PrincipalRecord) -> Result<(), RepositoryError>;
    fn fetch_principal(&self, id: &PrincipalId) -> Result<Option<PrincipalRecord>, RepositoryError>;
    fn fetch_principal_by_email(
        &self,
        email: &str,
    ) -> Result<Option<PrincipalRecord>, RepositoryError>;
}
