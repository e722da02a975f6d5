use thiserror::Error;

use crate::web::AuthenticatedUser;

pub type AccessResult<T> = std::result::Result<T, AccessError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("subject `{subject}` is not allowed to access user `{target}`")]
    Unauthorized { subject: String, target: String },
}

/// Callers may only touch their own record. Must run before the record is
/// read or mutated.
pub fn check_access(actor: &AuthenticatedUser, target_user_id: &str) -> AccessResult<()> {
    if actor.user_id() == target_user_id {
        Ok(())
    } else {
        Err(AccessError::Unauthorized {
            subject: actor.user_id().to_string(),
            target: target_user_id.to_string(),
        })
    }
}
