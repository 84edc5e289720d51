use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::credential::{Credential, CredentialSigner};
use super::domain::{
    normalize_email, ContactDetails, Principal, PrincipalId, PrincipalRecord, PrincipalView,
    Registration, Role, RoleProfile,
};
use super::password::PasswordHash;
use super::repository::PrincipalRepository;
use crate::config::AuthConfig;
use crate::error::BoardError;
use crate::storage::RepositoryError;

const MIN_PASSWORD_LEN: usize = 8;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub credential: Credential,
    pub expires_at: DateTime<Utc>,
    pub principal: PrincipalView,
}

/// Authenticates principals and resolves bearer credentials back to them.
pub struct IdentityService<P> {
    repository: Arc<P>,
    signer: CredentialSigner,
    password_iterations: u32,
    decoy: PasswordHash,
}

impl<P> IdentityService<P>
where
    P: PrincipalRepository + 'static,
{
    pub fn new(repository: Arc<P>, config: &AuthConfig) -> Self {
        Self {
            repository,
            signer: CredentialSigner::new(&config.token_secret, config.token_ttl),
            password_iterations: config.password_iterations,
            decoy: PasswordHash::new("unregistered-login-decoy", config.password_iterations),
        }
    }

    /// Register a new principal. The role is fixed for the principal's lifetime.
    pub fn register(&self, registration: Registration) -> Result<Principal, BoardError> {
        let Registration {
            name,
            email,
            password,
            role,
            company,
            phone,
            location,
        } = registration;

        let name = required("name", &name)?;
        let email = normalize_email(&email);
        validate_email(&email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BoardError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let role = Role::parse(&role)
            .ok_or_else(|| BoardError::validation("role must be 'employer' or 'applicant'"))?;
        let profile = match role {
            Role::Employer => RoleProfile::Employer {
                company: required("company", company.as_deref().unwrap_or_default())?,
            },
            Role::Applicant => RoleProfile::Applicant,
        };

        let principal = Principal {
            id: PrincipalId::generate(),
            name,
            email,
            profile,
            contact: ContactDetails {
                phone: optional(phone),
                location: optional(location),
            },
            created_at: Utc::now(),
        };

        let record = PrincipalRecord {
            principal: principal.clone(),
            password: PasswordHash::new(&password, self.password_iterations),
        };

        match self.repository.insert_principal(record) {
            Ok(()) => {
                info!(principal_id = %principal.id, role = %principal.role(), "principal registered");
                Ok(principal)
            }
            Err(RepositoryError::Conflict) => Err(BoardError::DuplicateEmail),
            Err(other) => Err(other.into()),
        }
    }

    /// Exchange an email/password pair for a bearer credential.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session, BoardError> {
        self.authenticate_at(email, password, Utc::now())
    }

    pub fn authenticate_at(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<Session, BoardError> {
        let record = self
            .repository
            .fetch_principal_by_email(&normalize_email(email))?;

        let verified = match record {
            Some(record) => record
                .password
                .verify(password)
                .then_some(record.principal),
            None => {
                // Unknown emails cost the same key derivation as a wrong password.
                self.decoy.verify(password);
                None
            }
        };
        let Some(principal) = verified else {
            warn!("login rejected");
            return Err(BoardError::InvalidCredentials);
        };

        let (credential, expires_at) = self
            .signer
            .issue(&principal, now)
            .map_err(BoardError::CredentialIssue)?;
        info!(principal_id = %principal.id, "credential issued");
        Ok(Session {
            credential,
            expires_at,
            principal: principal.view(),
        })
    }

    /// Resolve a bearer credential. Any defect in the credential, or a principal that no
    /// longer matches its claims, is reported as `InvalidOrExpiredCredential`.
    pub fn resolve(&self, credential: &str) -> Result<Principal, BoardError> {
        self.resolve_at(credential, Utc::now())
    }

    pub fn resolve_at(&self, credential: &str, now: DateTime<Utc>) -> Result<Principal, BoardError> {
        let claims = self.signer.verify(credential, now).map_err(|rejection| {
            warn!(%rejection, "credential refused");
            BoardError::InvalidOrExpiredCredential
        })?;

        let record = self
            .repository
            .fetch_principal(&claims.sub)?
            .ok_or(BoardError::InvalidOrExpiredCredential)?;

        if record.principal.role() != claims.role {
            warn!(principal_id = %claims.sub, "credential role does not match principal");
            return Err(BoardError::InvalidOrExpiredCredential);
        }
        Ok(record.principal)
    }

    pub fn find(&self, id: &PrincipalId) -> Result<Option<Principal>, BoardError> {
        Ok(self
            .repository
            .fetch_principal(id)?
            .map(|record| record.principal))
    }
}

fn required(field: &str, value: &str) -> Result<String, BoardError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BoardError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn validate_email(email: &str) -> Result<(), BoardError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(BoardError::validation("email address is malformed"))
    }
}
