use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError};

pub static BEARER_PREFIX: &str = "Bearer ";

/// Resolves `Authorization: Bearer <token>` into a [`RequestContext`].
///
/// No header means an anonymous context; handlers reject it through
/// [`RequestContext::user`]. A header that is present but malformed, or a
/// token the verifier refuses, fails the request right here.
pub async fn extract_context_fn(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let Some(header) = req.headers().get(AUTHORIZATION).cloned() else {
        req.extensions_mut().insert(RequestContext::new(None));
        return Ok(next.run(req).await);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(WebError::auth_header_malformed)?;

    let identity = state
        .verifier()
        .verify(&token)
        .await
        .map_err(WebError::auth_token_invalid)?;

    tracing::trace!(subject = %identity.subject, "request authenticated");
    req.extensions_mut().insert(RequestContext::new(Some(AuthenticatedUser::new(
        identity.subject,
        identity.email,
    ))));

    Ok(next.run(req).await)
}
