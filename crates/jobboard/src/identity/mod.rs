//! Identity & Session: registration, password authentication, and bearer credentials.

pub mod credential;
pub mod domain;
pub mod password;
pub mod repository;
pub mod service;


pub use credential::{Credential, CredentialClaims, CredentialSigner};
pub use domain::{
    ContactDetails, Principal, PrincipalId, PrincipalRecord, PrincipalView, Registration, Role,
    RoleProfile,
};
pub use password::PasswordHash;
pub use repository::PrincipalRepository;
pub use service::{IdentityService, Session};
