use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{catalogdb::CatalogExt, db::DBClient, orderdb::OrderExt, reviewdb::ReviewExt},
    dtos::reviewdtos::SubmitReviewDto,
    models::{
        ordermodel::{Order, OrderStatus},
        reviewmodel::{RatingSummary, Review, ReviewEligibility},
    },
    service::{
        error::{is_unique_violation, ServiceError},
        notification_service::NotificationService,
    },
};

pub const REASON_NOT_PARTICIPANT: &str = "You are not a participant in this order";
pub const REASON_NOT_COMPLETED: &str = "Order must be completed to review";
pub const REASON_CLIENT_FIRST: &str = "Client review is required first";
pub const REASON_ALREADY_REVIEWED: &str = "You have already reviewed this order";

/// Two-sided review gate on completed orders. The client reviews first;
/// the freelancer's review is only accepted once a client review exists.
/// Everything `can_review` checks is re-validated at write time inside the
/// submit transaction, with the uniqueness constraint closing the
/// check-then-act window.
#[derive(Debug, Clone)]
pub struct ReviewService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

impl ReviewService {
    pub fn new(db_client: Arc<DBClient>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    pub async fn can_review(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> Result<ReviewEligibility, ServiceError> {
        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        let client_review_exists = self
            .db_client
            .get_order_review_in_direction(order_id, true)
            .await?
            .is_some();

        let already_reviewed = self
            .db_client
            .get_order_review_by_reviewer(order_id, user_id)
            .await?
            .is_some();

        Ok(review_eligibility(
            &order,
            user_id,
            client_review_exists,
            already_reviewed,
        ))
    }

    pub async fn submit_review(
        &self,
        reviewer_id: Uuid,
        dto: SubmitReviewDto,
    ) -> Result<ReviewSubmissionResult, ServiceError> {
        if dto.rating < 1 || dto.rating > 5 {
            return Err(ServiceError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        if dto.is_order_review {
            let order_id = dto.order_id.ok_or_else(|| {
                ServiceError::Validation("order_id is required for order reviews".to_string())
            })?;
            self.submit_order_review(order_id, reviewer_id, dto).await
        } else {
            let service_id = dto.service_id.ok_or_else(|| {
                ServiceError::Validation("service_id is required for service reviews".to_string())
            })?;
            self.submit_service_review(service_id, reviewer_id, dto)
                .await
        }
    }

    async fn submit_order_review(
        &self,
        order_id: Uuid,
        reviewer_id: Uuid,
        dto: SubmitReviewDto,
    ) -> Result<ReviewSubmissionResult, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        let reviewee_id = order
            .counterparty_of(reviewer_id)
            .ok_or(ServiceError::UnauthorizedOrderAccess(reviewer_id, order_id))?;

        if dto.reviewee_id != reviewee_id {
            return Err(ServiceError::Validation(
                "Reviewee must be the other party on the order".to_string(),
            ));
        }

        // Same checks as can_review, rerun at write time so the answer
        // cannot go stale between the read and the insert.
        let client_review_exists = self
            .db_client
            .get_order_review_in_direction(order_id, true)
            .await?
            .is_some();

        let already_reviewed = self
            .db_client
            .get_order_review_by_reviewer(order_id, reviewer_id)
            .await?
            .is_some();

        let eligibility =
            review_eligibility(&order, reviewer_id, client_review_exists, already_reviewed);

        if !eligibility.allowed {
            return Err(eligibility_error(order_id, reviewer_id, eligibility));
        }

        let is_client_review = reviewer_id == order.client_id;

        let review = match self
            .db_client
            .insert_order_review_tx(
                &mut tx,
                order_id,
                reviewer_id,
                reviewee_id,
                dto.rating,
                dto.comment,
                is_client_review,
            )
            .await
        {
            Ok(review) => review,
            Err(e) if is_unique_violation(&e, Some("reviews_order_reviewer_direction_key")) => {
                return Err(ServiceError::AlreadyReviewed(order_id));
            }
            Err(e) => return Err(e.into()),
        };

        let rating_summary = self
            .db_client
            .recompute_rating_summary_tx(&mut tx, reviewee_id)
            .await?;

        tx.commit().await?;

        if let Err(e) = self.notification_service.notify_review_submitted(&review).await {
            tracing::error!("Failed to send review.submitted notification: {:?}", e);
        }

        Ok(ReviewSubmissionResult {
            review,
            rating_summary,
        })
    }

    async fn submit_service_review(
        &self,
        service_id: Uuid,
        reviewer_id: Uuid,
        dto: SubmitReviewDto,
    ) -> Result<ReviewSubmissionResult, ServiceError> {
        let service = self
            .db_client
            .get_service(service_id)
            .await?
            .ok_or(ServiceError::ServiceListingNotFound(service_id))?;

        if service.owner_id == reviewer_id {
            return Err(ServiceError::Validation(
                "You cannot review your own service".to_string(),
            ));
        }

        if dto.reviewee_id != service.owner_id {
            return Err(ServiceError::Validation(
                "Reviewee must be the service owner".to_string(),
            ));
        }

        let mut tx = self.db_client.pool.begin().await?;

        let review = match self
            .db_client
            .insert_service_review_tx(
                &mut tx,
                service_id,
                reviewer_id,
                service.owner_id,
                dto.rating,
                dto.comment,
            )
            .await
        {
            Ok(review) => review,
            Err(e) if is_unique_violation(&e, Some("reviews_service_reviewer_key")) => {
                return Err(ServiceError::AlreadyReviewed(service_id));
            }
            Err(e) => return Err(e.into()),
        };

        let rating_summary = self
            .db_client
            .recompute_rating_summary_tx(&mut tx, service.owner_id)
            .await?;

        tx.commit().await?;

        if let Err(e) = self.notification_service.notify_review_submitted(&review).await {
            tracing::error!("Failed to send review.submitted notification: {:?}", e);
        }

        Ok(ReviewSubmissionResult {
            review,
            rating_summary,
        })
    }

    pub async fn get_reviews_for_order(&self, order_id: Uuid) -> Result<Vec<Review>, ServiceError> {
        Ok(self.db_client.get_reviews_for_order(order_id).await?)
    }

    pub async fn get_reviews_for_user(
        &self,
        reviewee_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, ServiceError> {
        Ok(self
            .db_client
            .get_reviews_for_user(reviewee_id, limit, offset)
            .await?)
    }

    pub async fn get_reviews_for_service(
        &self,
        service_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Review>, ServiceError> {
        Ok(self
            .db_client
            .get_reviews_for_service(service_id, limit, offset)
            .await?)
    }

    /// Aggregate rating for display. Users with no reviews yet read as an
    /// empty summary rather than a missing one.
    pub async fn get_rating_summary(&self, user_id: Uuid) -> Result<RatingSummary, ServiceError> {
        match self.db_client.get_rating_summary(user_id).await? {
            Some(summary) => Ok(summary),
            None => Ok(RatingSummary {
                user_id,
                average_rating: 0.0,
                review_count: 0,
                updated_at: chrono::Utc::now(),
            }),
        }
    }
}

/// The review-gate decision, separated from I/O so the ordering rules are
/// checkable in isolation.
pub fn review_eligibility(
    order: &Order,
    user_id: Uuid,
    client_review_exists: bool,
    already_reviewed: bool,
) -> ReviewEligibility {
    if !order.is_participant(user_id) {
        return ReviewEligibility::denied(REASON_NOT_PARTICIPANT);
    }

    if order.status != OrderStatus::Completed {
        return ReviewEligibility::denied(REASON_NOT_COMPLETED);
    }

    if already_reviewed {
        return ReviewEligibility::denied(REASON_ALREADY_REVIEWED);
    }

    if user_id == order.freelancer_id && !client_review_exists {
        return ReviewEligibility::denied(REASON_CLIENT_FIRST);
    }

    ReviewEligibility::allowed()
}

fn eligibility_error(
    order_id: Uuid,
    reviewer_id: Uuid,
    eligibility: ReviewEligibility,
) -> ServiceError {
    match eligibility.reason.as_deref() {
        Some(REASON_ALREADY_REVIEWED) => ServiceError::AlreadyReviewed(order_id),
        Some(REASON_NOT_PARTICIPANT) => {
            ServiceError::UnauthorizedOrderAccess(reviewer_id, order_id)
        }
        Some(reason) => ServiceError::Validation(reason.to_string()),
        None => ServiceError::Validation("Review is not allowed".to_string()),
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewSubmissionResult {
    pub review: Review,
    pub rating_summary: RatingSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::BigDecimal;

    fn sample_order(status: OrderStatus) -> Order {
        Order {
            id: Uuid::new_v4(),
            order_number: "ORD-2026-0042".to_string(),
            service_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            freelancer_id: Uuid::new_v4(),
            conversation_id: None,
            offer_id: Uuid::new_v4(),
            status,
            price: BigDecimal::from(100),
            currency: "USD".to_string(),
            delivery_time_days: 5,
            revisions_included: 1,
            revisions_used: 0,
            delivery_date: Utc::now(),
            completed_at: None,
            client_ip_address: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_outsiders_cannot_review() {
        let order = sample_order(OrderStatus::Completed);
        let result = review_eligibility(&order, Uuid::new_v4(), false, false);
        assert!(!result.allowed);
        assert_eq!(result.reason.as_deref(), Some(REASON_NOT_PARTICIPANT));
    }

    #[test]
    fn test_incomplete_orders_cannot_be_reviewed() {
        for status in [
            OrderStatus::InProgress,
            OrderStatus::Delivered,
            OrderStatus::RevisionRequested,
            OrderStatus::Disputed,
            OrderStatus::Cancelled,
        ] {
            let order = sample_order(status);
            let result = review_eligibility(&order, order.client_id, false, false);
            assert!(!result.allowed);
            assert_eq!(result.reason.as_deref(), Some(REASON_NOT_COMPLETED));
        }
    }

    #[test]
    fn test_client_reviews_first() {
        let order = sample_order(OrderStatus::Completed);

        let client = review_eligibility(&order, order.client_id, false, false);
        assert!(client.allowed);

        let freelancer = review_eligibility(&order, order.freelancer_id, false, false);
        assert!(!freelancer.allowed);
        assert_eq!(freelancer.reason.as_deref(), Some(REASON_CLIENT_FIRST));
    }

    #[test]
    fn test_freelancer_allowed_once_client_review_exists() {
        let order = sample_order(OrderStatus::Completed);
        let result = review_eligibility(&order, order.freelancer_id, true, false);
        assert!(result.allowed);
    }

    #[test]
    fn test_double_review_is_denied() {
        let order = sample_order(OrderStatus::Completed);
        let result = review_eligibility(&order, order.client_id, true, true);
        assert!(!result.allowed);
        assert_eq!(result.reason.as_deref(), Some(REASON_ALREADY_REVIEWED));
    }
}
