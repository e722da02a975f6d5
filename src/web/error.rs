use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::CryptError,
    error::log_error,
    model::{AccessError, DatabaseError, ResourceType, ValidationError},
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationHeaderMalformed")]
    AuthenticationHeaderMalformed,

    #[error("AuthenticationTokenInvalid. Error: {error}")]
    AuthenticationTokenInvalid { error: CryptError },
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type:?}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type:?}. Error: {error}")]
    ResourceForbidden {
        resource_type: ResourceType,
        error: AccessError,
    },

    #[error("ResourceFetchError: {resource_type:?}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceBadRequest: {resource_type:?}. Reason: {reason}")]
    ResourceBadRequest {
        resource_type: ResourceType,
        reason: String,
    },

    #[error("ResourceConflict: {resource_type:?}")]
    ResourceConflict { resource_type: ResourceType },
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationRequired => {
                String::from("Missing or invalid Authorization header.")
            }
            Self::AuthenticationHeaderMalformed => {
                String::from("Authentication error, expected `Authorization: Bearer <token>`.")
            }
            Self::AuthenticationTokenInvalid {
                error: CryptError::ExpiredToken,
            } => String::from("Authentication error, token expired."),
            Self::AuthenticationTokenInvalid { .. } => {
                String::from("Authentication error, token invalid.")
            }
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { .. } => String::from("User not found."),
            Self::ResourceForbidden { .. } => {
                String::from("Unauthorized: User ID does not match token.")
            }
            Self::ResourceFetchError { .. } => {
                String::from("Resource error, unable to persist or fetch resource.")
            }
            Self::ResourceBadRequest { reason, .. } => format!("Invalid request: {reason}."),
            Self::ResourceConflict { .. } => {
                String::from("Resource error, record was created concurrently, retry the request.")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType, error: AccessError) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
            error,
        })
    }

    /// `Conflict` from the store becomes 409, everything else is a 500.
    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        if let DatabaseError::Conflict(_) = error {
            return Self::ResourceError(ResourceError::ResourceConflict {
                resource_type: r#type,
            });
        }

        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn resource_bad_request<S: Into<String>>(r#type: ResourceType, reason: S) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
            reason: reason.into(),
        })
    }

    pub fn resource_invalid(r#type: ResourceType, error: ValidationError) -> Self {
        Self::resource_bad_request(r#type, error.to_string())
    }

    pub fn resource_rejected_body(r#type: ResourceType, rejection: JsonRejection) -> Self {
        Self::resource_bad_request(r#type, rejection.body_text())
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn auth_header_malformed() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationHeaderMalformed)
    }

    pub fn auth_token_invalid(error: CryptError) -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationTokenInvalid { error })
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Human-readable message for the client
    pub error: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            log_error(&self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }

        let display = self.client_display();

        let body = ErrorResponse {
            error: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}
