use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        disputedtos::{AddCommentDto, OpenDisputeDto, ResolveDisputeDto},
        offerdtos::PageQueryDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::AuthenticatedUser,
    models::usermodel::UserRole,
    AppState,
};

pub fn dispute_handler() -> Router {
    Router::new()
        .route("/orders/:order_id", post(open_dispute))
        .route("/open", get(get_open_disputes))
        .route("/:dispute_id", get(get_dispute))
        .route("/:dispute_id/comments", post(add_comment))
        .route("/:dispute_id/resolve", put(resolve_dispute))
}

pub async fn open_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<OpenDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let result = app_state
        .dispute_service
        .open_dispute(order_id, auth.id, body)
        .await
        .map_err(HttpError::from)?;

    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn resolve_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(dispute_id): Path<Uuid>,
    Json(body): Json<ResolveDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if auth.role != UserRole::Admin {
        return Err(HttpError::unauthorized(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let result = app_state
        .dispute_service
        .resolve_dispute(dispute_id, auth.id, body)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(result))
}

pub async fn add_comment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(dispute_id): Path<Uuid>,
    Json(body): Json<AddCommentDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let comment = app_state
        .dispute_service
        .add_comment(dispute_id, auth.id, auth.role, body)
        .await
        .map_err(HttpError::from)?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(dispute_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let details = app_state
        .dispute_service
        .get_dispute(dispute_id, auth.id, auth.role)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(details))
}

pub async fn get_open_disputes(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<PageQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    if auth.role != UserRole::Admin {
        return Err(HttpError::unauthorized(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let (limit, offset) = query.to_limit_offset();

    let disputes = app_state
        .dispute_service
        .get_open_disputes(limit, offset)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(disputes))
}
