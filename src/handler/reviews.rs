use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{offerdtos::PageQueryDto, reviewdtos::SubmitReviewDto},
    error::HttpError,
    middleware::AuthenticatedUser,
    AppState,
};

pub fn review_handler() -> Router {
    Router::new()
        .route("/", post(submit_review))
        .route("/orders/:order_id/eligibility", get(can_review))
        .route("/orders/:order_id", get(get_order_reviews))
        .route("/users/:user_id", get(get_user_reviews))
        .route("/users/:user_id/rating", get(get_user_rating))
        .route("/services/:service_id", get(get_service_reviews))
}

pub async fn submit_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(body): Json<SubmitReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let result = app_state
        .review_service
        .submit_review(auth.id, body)
        .await
        .map_err(HttpError::from)?;

    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn can_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let eligibility = app_state
        .review_service
        .can_review(order_id, auth.id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(eligibility))
}

pub async fn get_order_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let reviews = app_state
        .review_service
        .get_reviews_for_order(order_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(reviews))
}

pub async fn get_user_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<PageQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let (limit, offset) = query.to_limit_offset();

    let reviews = app_state
        .review_service
        .get_reviews_for_user(user_id, limit, offset)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(reviews))
}

pub async fn get_user_rating(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let summary = app_state
        .review_service
        .get_rating_summary(user_id)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(summary))
}

pub async fn get_service_reviews(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(service_id): Path<Uuid>,
    Query(query): Query<PageQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let (limit, offset) = query.to_limit_offset();

    let reviews = app_state
        .review_service
        .get_reviews_for_service(service_id, limit, offset)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(reviews))
}
