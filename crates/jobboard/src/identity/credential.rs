use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::domain::{Principal, PrincipalId, Role};

/// Opaque bearer token handed to clients after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(pub String);

impl Credential {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Claims bound into a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    pub sub: PrincipalId,
    pub role: Role,
    pub exp: i64,
}

/// Why a presented credential was refused. Collapsed into a single outcome before
/// leaving the identity component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CredentialRejection {
    #[error("credential is malformed")]
    Malformed,
    #[error("credential signature mismatch")]
    BadSignature,
    #[error("credential expired")]
    Expired,
}

impl From<&ErrorKind> for CredentialRejection {
    fn from(kind: &ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Self::BadSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

/// Issues and verifies HS256 JSON Web Tokens carrying subject, role and expiry.
#[derive(Clone)]
pub struct CredentialSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl CredentialSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        // Expiry is checked against the caller's clock in `verify`.
        validation.validate_exp = false;
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn issue(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<(Credential, DateTime<Utc>), JwtError> {
        let expires_at = now + self.ttl;
        let claims = CredentialClaims {
            sub: principal.id.clone(),
            role: principal.role(),
            exp: expires_at.timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok((Credential(token), expires_at))
    }

    pub fn verify(
        &self,
        credential: &str,
        now: DateTime<Utc>,
    ) -> Result<CredentialClaims, CredentialRejection> {
        let data = jsonwebtoken::decode::<CredentialClaims>(
            credential.trim(),
            &self.decoding,
            &self.validation,
        )
        .map_err(|error| CredentialRejection::from(error.kind()))?;
        if data.claims.exp <= now.timestamp() {
            return Err(CredentialRejection::Expired);
        }
        Ok(data.claims)
    }
}

impl std::fmt::Debug for CredentialSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::domain::{ContactDetails, RoleProfile};
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    fn principal() -> Principal {
        Principal {
            id: PrincipalId("p-1".to_string()),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            profile: RoleProfile::Applicant,
            contact: ContactDetails::default(),
            created_at: Utc::now(),
        }
    }

    fn signer() -> CredentialSigner {
        CredentialSigner::new(b"0123456789abcdef0123456789abcdef", Duration::hours(1))
    }

    fn issue(signer: &CredentialSigner, now: DateTime<Utc>) -> Credential {
        signer
            .issue(&principal(), now)
            .expect("credential issued")
            .0
    }

    #[test]
    fn issued_credentials_verify_until_expiry() {
        let now = Utc::now();
        let (credential, expires_at) = signer().issue(&principal(), now).expect("issued");
        assert_eq!(expires_at, now + Duration::hours(1));
        assert_eq!(credential.as_str().split('.').count(), 3);

        let claims = signer()
            .verify(credential.as_str(), now + Duration::minutes(59))
            .expect("valid credential");
        assert_eq!(claims.sub, PrincipalId("p-1".to_string()));
        assert_eq!(claims.role, Role::Applicant);

        assert_eq!(
            signer().verify(credential.as_str(), now + Duration::hours(2)),
            Err(CredentialRejection::Expired)
        );
    }

    #[test]
    fn tampered_claims_fail_signature_check() {
        let now = Utc::now();
        let credential = issue(&signer(), now);
        let parts: Vec<&str> = credential.as_str().split('.').collect();
        let forged_claims = CredentialClaims {
            sub: PrincipalId("p-1".to_string()),
            role: Role::Employer,
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).expect("json")),
            parts[2]
        );
        assert_eq!(
            signer().verify(&forged, now),
            Err(CredentialRejection::BadSignature)
        );
    }

    #[test]
    fn credentials_from_another_key_are_rejected() {
        let now = Utc::now();
        let other = CredentialSigner::new(b"another-key", Duration::hours(1));
        let credential = issue(&other, now);
        assert_eq!(
            signer().verify(credential.as_str(), now),
            Err(CredentialRejection::BadSignature)
        );
    }

    #[test]
    fn stripped_signature_is_refused() {
        let now = Utc::now();
        let credential = issue(&signer(), now);
        let (unsigned, _) = credential
            .as_str()
            .rsplit_once('.')
            .expect("three segments");
        assert!(signer().verify(&format!("{unsigned}."), now).is_err());
    }

    #[test]
    fn garbage_is_malformed() {
        let now = Utc::now();
        for raw in ["", "abc", "abc.zz", "...."] {
            assert_eq!(
                signer().verify(raw, now),
                Err(CredentialRejection::Malformed),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn library_error_kinds_keep_their_meaning() {
        assert_eq!(
            CredentialRejection::from(&ErrorKind::ExpiredSignature),
            CredentialRejection::Expired
        );
        assert_eq!(
            CredentialRejection::from(&ErrorKind::InvalidSignature),
            CredentialRejection::BadSignature
        );
        assert_eq!(
            CredentialRejection::from(&ErrorKind::InvalidToken),
            CredentialRejection::Malformed
        );
    }
}
