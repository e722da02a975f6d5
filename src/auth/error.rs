use thiserror::Error;

pub type CryptResult<T> = std::result::Result<T, CryptError>;

#[derive(Debug, Error)]
pub enum CryptError {
    #[error("jwt error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
    #[error("token invalid: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
    #[error("token expired")]
    ExpiredToken,
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("no verification key configured, set `auth.secret` or `auth.public_key_path`")]
    MissingKey,
}

impl CryptError {
    /// Sorts a decode failure into expired vs. anything else.
    pub fn from_decode(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::ExpiredToken,
            _ => Self::InvalidToken(error),
        }
    }
}
