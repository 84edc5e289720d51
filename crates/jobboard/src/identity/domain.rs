use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::password::PasswordHash;

/// Identifier wrapper for registered principals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of roles. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employer,
    Applicant,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Employer => "employer",
            Role::Applicant => "applicant",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "employer" => Some(Role::Employer),
            "applicant" => Some(Role::Applicant),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields that only exist for one of the two roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Employer { company: String },
    Applicant,
}

impl RoleProfile {
    pub const fn role(&self) -> Role {
        match self {
            RoleProfile::Employer { .. } => Role::Employer,
            RoleProfile::Applicant => Role::Applicant,
        }
    }

    pub fn company(&self) -> Option<&str> {
        match self {
            RoleProfile::Employer { company } => Some(company.as_str()),
            RoleProfile::Applicant => None,
        }
    }
}

/// Optional contact details collected for either role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// An authenticated identity with a fixed role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub name: String,
    pub email: String,
    pub profile: RoleProfile,
    pub contact: ContactDetails,
    pub created_at: DateTime<Utc>,
}

impl Principal {
    pub const fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn is(&self, role: Role) -> bool {
        self.role() == role
    }

    pub fn view(&self) -> PrincipalView {
        PrincipalView {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role(),
            company: self.profile.company().map(str::to_string),
            phone: self.contact.phone.clone(),
            location: self.contact.location.clone(),
        }
    }
}

/// Stored principal alongside its password hash. Never leaves the identity component.
#[derive(Debug, Clone)]
pub struct PrincipalRecord {
    pub principal: Principal,
    pub password: PasswordHash,
}

/// Input for `IdentityService::register`.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Public projection of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrincipalView {
    pub id: PrincipalId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

pub(crate) fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
