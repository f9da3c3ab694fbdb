use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::offerdtos::{CreateOfferDto, PageQueryDto, RejectOfferDto},
    error::{ErrorMessage, HttpError},
    middleware::AuthenticatedUser,
    models::usermodel::UserRole,
    AppState,
};

pub fn offer_handler() -> Router {
    Router::new()
        .route("/", post(create_offer))
        .route("/sent", get(get_sent_offers))
        .route("/received", get(get_received_offers))
        .route("/:offer_id", get(get_offer))
        .route("/:offer_id/accept", post(accept_offer))
        .route("/:offer_id/reject", post(reject_offer))
}

pub async fn create_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(body): Json<CreateOfferDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    if auth.role != UserRole::Freelancer {
        return Err(HttpError::unauthorized(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let offer = app_state
        .offer_service
        .create_offer(auth.id, body)
        .await
        .map_err(HttpError::from)?;

    Ok((StatusCode::CREATED, Json(offer)))
}

pub async fn accept_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(offer_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HttpError> {
    // Recorded on the order for audit purposes only.
    let client_ip = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or(value).trim().to_string());

    let result = app_state
        .offer_service
        .accept_offer(offer_id, auth.id, client_ip)
        .await
        .map_err(HttpError::from)?;

    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn reject_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(offer_id): Path<Uuid>,
    Json(body): Json<RejectOfferDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let offer = app_state
        .offer_service
        .reject_offer(offer_id, auth.id, body)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(offer))
}

pub async fn get_offer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(offer_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let offer = app_state
        .offer_service
        .get_offer(offer_id, auth.id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(offer))
}

/// Offers the authenticated freelancer has sent.
pub async fn get_sent_offers(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<PageQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let (limit, offset) = query.to_limit_offset();

    let offers = app_state
        .offer_service
        .get_offers_for_freelancer(auth.id, limit, offset)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(offers))
}

/// Offers awaiting the authenticated client.
pub async fn get_received_offers(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<PageQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let (limit, offset) = query.to_limit_offset();

    let offers = app_state
        .offer_service
        .get_offers_for_client(auth.id, limit, offset)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(offers))
}
