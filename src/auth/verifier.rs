//! Identity verification: bearer token in, subject out.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::auth::error::{CryptError, CryptResult};
use crate::auth::jwt::process_token;
use crate::config::Auth;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject: String,
    pub email: Option<String>,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> CryptResult<VerifiedIdentity>;
}

/// Verifies JWTs signed either with a shared secret (HS256) or with the
/// identity provider's RSA key (RS256).
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("iss", &self.validation.iss)
            .field("aud", &self.validation.aud)
            .finish()
    }
}

impl JwtVerifier {
    pub fn hs256<K: AsRef<[u8]>>(secret: K) -> Self {
        Self::new(
            DecodingKey::from_secret(secret.as_ref()),
            Validation::new(Algorithm::HS256),
        )
    }

    pub fn rs256_pem(pem: &[u8]) -> CryptResult<Self> {
        let key = DecodingKey::from_rsa_pem(pem)?;
        Ok(Self::new(key, Validation::new(Algorithm::RS256)))
    }

    fn new(key: DecodingKey, mut validation: Validation) -> Self {
        // only enforced once an audience is configured
        validation.validate_aud = false;
        Self { key, validation }
    }

    /// Tokens without an `iss` claim are rejected once an issuer is set.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self.validation.required_spec_claims.insert("iss".to_string());
        self
    }

    /// Same for `aud`.
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.required_spec_claims.insert("aud".to_string());
        self.validation.validate_aud = true;
        self
    }

    /// A public key wins over a shared secret when both are set.
    #[tracing::instrument(skip(auth))]
    pub fn from_config(auth: &Auth) -> CryptResult<Self> {
        let verifier = match (auth.public_key_path(), auth.secret()) {
            (Some(path), _) => {
                tracing::debug!("verifying tokens with RS256 key at {}", path.display());
                let pem = std::fs::read(path)?;
                Self::rs256_pem(&pem)?
            }
            (None, Some(secret)) => Self::hs256(secret),
            (None, None) => return Err(CryptError::MissingKey),
        };

        let verifier = match auth.issuer() {
            Some(issuer) => verifier.with_issuer(issuer),
            None => verifier,
        };

        Ok(match auth.audience() {
            Some(audience) => verifier.with_audience(audience),
            None => verifier,
        })
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> CryptResult<VerifiedIdentity> {
        let data = process_token(token, &self.key, &self.validation)
            .map_err(CryptError::from_decode)?;

        if data.claims.sub.is_empty() {
            return Err(CryptError::InvalidToken(
                jsonwebtoken::errors::ErrorKind::InvalidSubject.into(),
            ));
        }

        Ok(VerifiedIdentity {
            subject: data.claims.sub,
            email: data.claims.email,
        })
    }
}
