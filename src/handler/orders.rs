use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        offerdtos::PageQueryDto,
        orderdtos::{CancelOrderDto, RequestRevisionDto, SubmitDeliveryDto},
    },
    error::HttpError,
    middleware::AuthenticatedUser,
    AppState,
};

pub fn order_handler() -> Router {
    Router::new()
        .route("/client", get(get_client_orders))
        .route("/freelancer", get(get_freelancer_orders))
        .route("/:order_id", get(get_order))
        .route("/:order_id/contract", get(get_contract))
        .route("/:order_id/timeline", get(get_order_timeline))
        .route("/:order_id/deliverables", get(get_deliverables))
        .route("/:order_id/deliver", post(submit_delivery))
        .route("/:order_id/revision", post(request_revision))
        .route("/:order_id/accept", put(accept_delivery))
        .route("/:order_id/cancel", put(cancel_order))
}

pub async fn submit_delivery(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<SubmitDeliveryDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let result = app_state
        .order_service
        .submit_delivery(order_id, auth.id, body)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(result))
}

pub async fn request_revision(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<RequestRevisionDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let order = app_state
        .order_service
        .request_revision(order_id, auth.id, body)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(order))
}

pub async fn accept_delivery(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let order = app_state
        .order_service
        .accept_delivery(order_id, auth.id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(order))
}

pub async fn cancel_order(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<CancelOrderDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let order = app_state
        .order_service
        .cancel_order(order_id, auth.id, body)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(order))
}

pub async fn get_order(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let order = app_state
        .order_service
        .get_order(order_id, auth.id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(order))
}

pub async fn get_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = app_state
        .contract_service
        .get_by_order_id(order_id, auth.id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(contract))
}

pub async fn get_order_timeline(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
    Query(query): Query<PageQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let (limit, offset) = query.to_limit_offset();

    let events = app_state
        .order_service
        .get_order_timeline(order_id, auth.id, limit, offset)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(events))
}

pub async fn get_deliverables(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let deliverables = app_state
        .order_service
        .get_deliverables(order_id, auth.id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(deliverables))
}

pub async fn get_client_orders(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<PageQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let (limit, offset) = query.to_limit_offset();

    let orders = app_state
        .order_service
        .get_orders_for_client(auth.id, limit, offset)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(orders))
}

pub async fn get_freelancer_orders(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<PageQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let (limit, offset) = query.to_limit_offset();

    let orders = app_state
        .order_service
        .get_orders_for_freelancer(auth.id, limit, offset)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(orders))
}
