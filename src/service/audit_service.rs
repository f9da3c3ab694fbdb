use num_traits::ToPrimitive;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::db::DBClient,
    models::{
        disputemodel::{Dispute, DisputeStatus, OrderAction},
        ordermodel::{Deliverable, Order, OrderEvent, OrderEventType},
    },
    service::error::ServiceError,
};

/// Writer for the append-only order event log. Every lifecycle-mutating
/// operation appends its event inside the owning transaction, so an event
/// exists iff the mutation committed. Rows are never updated or deleted.
#[derive(Debug, Clone)]
pub struct AuditService {
    db_client: Arc<DBClient>,
}

impl AuditService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn log_order_created_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor_id: Uuid,
        order: &Order,
    ) -> Result<(), ServiceError> {
        self.append_event_tx(
            tx,
            order.id,
            actor_id,
            OrderEventType::OrderCreated,
            format!("Order {} created from accepted offer", order.order_number),
            Some(serde_json::json!({
                "offer_id": order.offer_id,
                "order_number": order.order_number,
                "price": order.price.to_f64().unwrap_or(0.0),
            })),
        )
        .await
    }

    pub async fn log_delivery_submitted_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor_id: Uuid,
        order: &Order,
        deliverable: &Deliverable,
    ) -> Result<(), ServiceError> {
        let attachment_count = deliverable
            .attachment_urls
            .as_ref()
            .map_or(0, |urls| urls.len());

        self.append_event_tx(
            tx,
            order.id,
            actor_id,
            OrderEventType::DeliverySubmitted,
            "Work delivered for review".to_string(),
            Some(serde_json::json!({
                "deliverable_id": deliverable.id,
                "attachment_count": attachment_count,
            })),
        )
        .await
    }

    pub async fn log_revision_requested_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor_id: Uuid,
        order: &Order,
        note: &str,
    ) -> Result<(), ServiceError> {
        self.append_event_tx(
            tx,
            order.id,
            actor_id,
            OrderEventType::RevisionRequested,
            format!("Revision requested: {}", note),
            Some(serde_json::json!({
                "revisions_used": order.revisions_used,
                "revisions_included": order.revisions_included,
            })),
        )
        .await
    }

    pub async fn log_delivery_accepted_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor_id: Uuid,
        order: &Order,
    ) -> Result<(), ServiceError> {
        self.append_event_tx(
            tx,
            order.id,
            actor_id,
            OrderEventType::DeliveryAccepted,
            "Delivery accepted, order completed".to_string(),
            None,
        )
        .await
    }

    pub async fn log_order_cancelled_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor_id: Uuid,
        order: &Order,
        reason: &str,
    ) -> Result<(), ServiceError> {
        self.append_event_tx(
            tx,
            order.id,
            actor_id,
            OrderEventType::OrderCancelled,
            "Order cancelled".to_string(),
            Some(serde_json::json!({ "reason": reason })),
        )
        .await
    }

    pub async fn log_dispute_opened_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        actor_id: Uuid,
        dispute: &Dispute,
    ) -> Result<(), ServiceError> {
        self.append_event_tx(
            tx,
            dispute.order_id,
            actor_id,
            OrderEventType::DisputeOpened,
            format!("Dispute opened: {}", dispute.reason),
            Some(serde_json::json!({
                "dispute_id": dispute.id,
                "reason": dispute.reason,
            })),
        )
        .await
    }

    pub async fn log_dispute_resolved_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        admin_id: Uuid,
        dispute: &Dispute,
        new_status: DisputeStatus,
        order_action: OrderAction,
    ) -> Result<(), ServiceError> {
        self.append_event_tx(
            tx,
            dispute.order_id,
            admin_id,
            OrderEventType::DisputeResolved,
            format!("Dispute resolved with action {}", order_action.to_str()),
            Some(serde_json::json!({
                "dispute_id": dispute.id,
                "new_status": new_status.to_str(),
                "order_action": order_action.to_str(),
            })),
        )
        .await
    }

    /// Order timeline, oldest first.
    pub async fn get_events_for_order(
        &self,
        order_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderEvent>, ServiceError> {
        let events = sqlx::query_as::<_, OrderEvent>(
            r#"
            SELECT * FROM order_events
            WHERE order_id = $1
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(order_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db_client.pool)
        .await?;

        Ok(events)
    }

    async fn append_event_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        order_id: Uuid,
        user_id: Uuid,
        event_type: OrderEventType,
        description: String,
        metadata: Option<serde_json::Value>,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO order_events (order_id, user_id, event_type, description, metadata)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order_id)
        .bind(user_id)
        .bind(event_type)
        .bind(description)
        .bind(metadata)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
