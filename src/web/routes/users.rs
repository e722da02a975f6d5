use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};

use crate::{
    model::{
        ResourceType, ResourceTyped, check_access,
        entity::{ProfileUpdate, UserRecord},
        ledger::CompletionEvent,
    },
    web::{
        AppState, RequestContext, WebError, WebResult,
        dto::{profile::ProfileRequest, progress::ProgressUpdateRequest},
        error::ErrorResponse,
        middlewares,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/{user_id}/profile",
            get(profile_get_handler).post(profile_upsert_handler),
        )
        .route("/{user_id}/progress", put(progress_update_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/profile",
    description = "Fetch the caller's own progress record",
    params(
        ("user_id" = String, Path, description = "Identity provider subject of the caller")
    ),
    responses(
        (status = 200, description = "Record found", body = UserRecord),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token subject does not match user_id", body = ErrorResponse),
        (status = 404, description = "No record for this user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "users"
)]
#[tracing::instrument(skip(ctx, state))]
pub(crate) async fn profile_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    check_access(user, &user_id)
        .map_err(|e| WebError::resource_forbidden(UserRecord::get_resource_type(), e))?;

    let found = UserRecord::find_by_id(state.mm(), user, &user_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserRecord::get_resource_type(), e))?;

    let Some(found) = found else {
        return Err(WebError::resource_not_found(UserRecord::get_resource_type()));
    };

    Ok((StatusCode::OK, Json(found)))
}

#[utoipa::path(
    post,
    path = "/api/users/{user_id}/profile",
    description = "Create the caller's record on first contact, otherwise update its avatar and email. \
                   Updating requires a non-empty selectedAvatar.",
    request_body = ProfileRequest,
    params(
        ("user_id" = String, Path, description = "Identity provider subject of the caller")
    ),
    responses(
        (status = 200, description = "Record created or updated", body = UserRecord),
        (status = 400, description = "selectedAvatar missing on update, or malformed body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token subject does not match user_id", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "users"
)]
#[tracing::instrument(skip(ctx, state, payload))]
pub(crate) async fn profile_upsert_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    check_access(user, &user_id)
        .map_err(|e| WebError::resource_forbidden(UserRecord::get_resource_type(), e))?;

    let Json(payload) = payload
        .map_err(|e| WebError::resource_rejected_body(UserRecord::get_resource_type(), e))?;

    let found = UserRecord::find_by_id(state.mm(), user, &user_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserRecord::get_resource_type(), e))?;

    let record = match found {
        Some(found) => {
            let update = ProfileUpdate::new(payload.selected_avatar, payload.email)
                .map_err(|e| WebError::resource_invalid(UserRecord::get_resource_type(), e))?;

            found
                .update_profile(state.mm(), user, update)
                .await
                .map_err(|e| WebError::resource_fetch_error(UserRecord::get_resource_type(), e))?
                .ok_or_else(|| WebError::resource_not_found(UserRecord::get_resource_type()))?
        }
        None => {
            tracing::info!(user_id = %user_id, "creating user record");

            UserRecord::create_or_update(state.mm(), user, payload.email, payload.selected_avatar)
                .await
                .map_err(|e| WebError::resource_fetch_error(UserRecord::get_resource_type(), e))?
        }
    };

    Ok((StatusCode::OK, Json(record)))
}

#[utoipa::path(
    put,
    path = "/api/users/{user_id}/progress",
    description = "Record a topic completion event. The topic's score is added to totalScore only \
                   the first time the topic becomes completed; replays never credit again.",
    request_body = ProgressUpdateRequest,
    params(
        ("user_id" = String, Path, description = "Identity provider subject of the caller")
    ),
    responses(
        (status = 200, description = "Progress merged", body = UserRecord),
        (status = 400, description = "moduleId, topicId and completed are required", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Token subject does not match user_id", body = ErrorResponse),
        (status = 404, description = "No record for this user", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    security(
        ("bearer" = [])
    ),
    tag = "users"
)]
#[tracing::instrument(skip(ctx, state, payload))]
pub(crate) async fn progress_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<ProgressUpdateRequest>, JsonRejection>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    check_access(user, &user_id)
        .map_err(|e| WebError::resource_forbidden(ResourceType::UserProgress, e))?;

    let Json(payload) = payload
        .map_err(|e| WebError::resource_rejected_body(ResourceType::UserProgress, e))?;
    let event = CompletionEvent::try_from(payload)
        .map_err(|e| WebError::resource_invalid(ResourceType::UserProgress, e))?;

    let updated = UserRecord::record_completion(state.mm(), user, &user_id, event)
        .await
        .map_err(|e| WebError::resource_fetch_error(ResourceType::UserProgress, e))?;

    let Some(updated) = updated else {
        return Err(WebError::resource_not_found(ResourceType::UserProgress));
    };

    Ok((StatusCode::OK, Json(updated)))
}
