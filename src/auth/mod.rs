mod jwt;
pub use jwt::{UserClaims, generate_token, process_token};
mod error;
pub use error::{CryptError, CryptResult};
mod verifier;
pub use verifier::{IdentityVerifier, JwtVerifier, VerifiedIdentity};
