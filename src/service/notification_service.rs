use num_traits::ToPrimitive;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    models::{
        disputemodel::{Dispute, OrderAction},
        offermodel::Offer,
        ordermodel::{Order, OrderStatus},
        reviewmodel::Review,
    },
    service::error::ServiceError,
};

/// Emits the engine's downstream signals. Delivery (push/email/socket) is
/// someone else's job; this service records a notification row per
/// recipient and logs the signal. Callers invoke it after commit and treat
/// failures as log-and-continue.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn notify_offer_created(&self, offer: &Offer) -> Result<(), ServiceError> {
        tracing::info!(
            "offer.created: offer {} for service {} sent to client {}",
            offer.id,
            offer.service_id,
            offer.client_id
        );

        self.store_notification(
            offer.client_id,
            "offer.created",
            Some(serde_json::json!({
                "offer_id": offer.id,
                "service_title": offer.service_title,
                "price": offer.price.to_f64().unwrap_or(0.0),
            })),
            format!("You received an offer for: {}", offer.service_title),
        )
        .await
    }

    pub async fn notify_offer_accepted(
        &self,
        offer: &Offer,
        order: &Order,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "offer.accepted: offer {} became order {}",
            offer.id,
            order.order_number
        );

        self.store_notification(
            offer.freelancer_id,
            "offer.accepted",
            Some(serde_json::json!({
                "offer_id": offer.id,
                "order_id": order.id,
                "order_number": order.order_number,
            })),
            format!("Your offer was accepted: order {}", order.order_number),
        )
        .await
    }

    pub async fn notify_offer_rejected(&self, offer: &Offer) -> Result<(), ServiceError> {
        tracing::info!("offer.rejected: offer {}", offer.id);

        self.store_notification(
            offer.freelancer_id,
            "offer.rejected",
            Some(serde_json::json!({
                "offer_id": offer.id,
                "reason": offer.rejection_reason,
            })),
            format!("Your offer for {} was declined", offer.service_title),
        )
        .await
    }

    pub async fn notify_order_status_changed(
        &self,
        order: &Order,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "order.status_changed: order {} {} -> {}",
            order.order_number,
            from.to_str(),
            to.to_str()
        );

        let metadata = serde_json::json!({
            "order_id": order.id,
            "order_number": order.order_number,
            "from": from.to_str(),
            "to": to.to_str(),
        });

        // Both parties hear about every status change.
        self.store_notification(
            order.client_id,
            "order.status_changed",
            Some(metadata.clone()),
            format!("Order {} is now {}", order.order_number, to.to_str()),
        )
        .await?;

        self.store_notification(
            order.freelancer_id,
            "order.status_changed",
            Some(metadata),
            format!("Order {} is now {}", order.order_number, to.to_str()),
        )
        .await
    }

    pub async fn notify_dispute_opened(&self, dispute: &Dispute) -> Result<(), ServiceError> {
        tracing::info!(
            "dispute.opened: dispute {} on order {} raised by {}",
            dispute.id,
            dispute.order_id,
            dispute.raised_by
        );

        let other_party = if dispute.raised_by == dispute.client_id {
            dispute.freelancer_id
        } else {
            dispute.client_id
        };

        self.store_notification(
            other_party,
            "dispute.opened",
            Some(serde_json::json!({
                "dispute_id": dispute.id,
                "order_id": dispute.order_id,
                "reason": dispute.reason,
            })),
            "A dispute was opened on your order".to_string(),
        )
        .await
    }

    pub async fn notify_dispute_resolved(
        &self,
        dispute: &Dispute,
        order_action: OrderAction,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "dispute.resolved: dispute {} on order {} with action {}",
            dispute.id,
            dispute.order_id,
            order_action.to_str()
        );

        let metadata = serde_json::json!({
            "dispute_id": dispute.id,
            "order_id": dispute.order_id,
            "order_action": order_action.to_str(),
        });

        self.store_notification(
            dispute.client_id,
            "dispute.resolved",
            Some(metadata.clone()),
            "Your dispute has been resolved".to_string(),
        )
        .await?;

        self.store_notification(
            dispute.freelancer_id,
            "dispute.resolved",
            Some(metadata),
            "Your dispute has been resolved".to_string(),
        )
        .await
    }

    pub async fn notify_review_submitted(&self, review: &Review) -> Result<(), ServiceError> {
        tracing::info!(
            "review.submitted: review {} by {} about {}",
            review.id,
            review.reviewer_id,
            review.reviewee_id
        );

        self.store_notification(
            review.reviewee_id,
            "review.submitted",
            Some(serde_json::json!({
                "review_id": review.id,
                "rating": review.rating,
            })),
            format!("You received a {}-star review", review.rating),
        )
        .await
    }

    async fn store_notification(
        &self,
        user_id: Uuid,
        kind: &str,
        metadata: Option<serde_json::Value>,
        message: String,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, kind, metadata, message)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(metadata)
        .bind(message)
        .execute(&self.db_client.pool)
        .await?;

        Ok(())
    }
}
