use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, orderdb::OrderExt},
    dtos::orderdtos::{CancelOrderDto, RequestRevisionDto, SubmitDeliveryDto},
    models::ordermodel::{ContractStatus, Deliverable, Order, OrderEvent, OrderStatus},
    service::{
        audit_service::AuditService, error::ServiceError,
        notification_service::NotificationService,
    },
};

/// Owner of the order state machine. Every transition re-reads the order
/// inside a transaction, validates actor and status, then applies a
/// status-guarded update; a concurrent mutation that wins the race leaves
/// the guarded update empty and surfaces as Conflict instead of partial
/// state.
#[derive(Debug, Clone)]
pub struct OrderService {
    db_client: Arc<DBClient>,
    audit_service: Arc<AuditService>,
    notification_service: Arc<NotificationService>,
}

impl OrderService {
    pub fn new(
        db_client: Arc<DBClient>,
        audit_service: Arc<AuditService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            audit_service,
            notification_service,
        }
    }

    pub async fn submit_delivery(
        &self,
        order_id: Uuid,
        actor_id: Uuid,
        dto: SubmitDeliveryDto,
    ) -> Result<DeliverySubmissionResult, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        if order.freelancer_id != actor_id {
            return Err(ServiceError::UnauthorizedOrderAccess(actor_id, order_id));
        }

        if !matches!(
            order.status,
            OrderStatus::InProgress | OrderStatus::RevisionRequested
        ) {
            return Err(ServiceError::InvalidOrderStatus(order_id, order.status));
        }

        let previous_status = order.status;

        let updated_order = self
            .db_client
            .mark_delivered_tx(&mut tx, order_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict(format!("Order {} changed state concurrently", order_id))
            })?;

        let deliverable = self
            .db_client
            .insert_deliverable_tx(
                &mut tx,
                order_id,
                actor_id,
                dto.message,
                dto.attachment_urls,
            )
            .await?;

        self.audit_service
            .log_delivery_submitted_tx(&mut tx, actor_id, &updated_order, &deliverable)
            .await?;

        tx.commit().await?;

        self.emit_status_change(&updated_order, previous_status, OrderStatus::Delivered)
            .await;

        Ok(DeliverySubmissionResult {
            order: updated_order,
            deliverable,
        })
    }

    pub async fn request_revision(
        &self,
        order_id: Uuid,
        actor_id: Uuid,
        dto: RequestRevisionDto,
    ) -> Result<Order, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        if order.client_id != actor_id {
            return Err(ServiceError::UnauthorizedOrderAccess(actor_id, order_id));
        }

        if order.status != OrderStatus::Delivered {
            return Err(ServiceError::InvalidOrderStatus(order_id, order.status));
        }

        if order.revisions_used >= order.revisions_included {
            return Err(ServiceError::RevisionLimitExceeded {
                used: order.revisions_used,
                included: order.revisions_included,
            });
        }

        let updated_order = self
            .db_client
            .mark_revision_requested_tx(&mut tx, order_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict(format!("Order {} changed state concurrently", order_id))
            })?;

        self.audit_service
            .log_revision_requested_tx(&mut tx, actor_id, &updated_order, &dto.note)
            .await?;

        tx.commit().await?;

        self.emit_status_change(
            &updated_order,
            OrderStatus::Delivered,
            OrderStatus::RevisionRequested,
        )
        .await;

        Ok(updated_order)
    }

    /// The sole trigger that makes an order eligible for reviews.
    pub async fn accept_delivery(
        &self,
        order_id: Uuid,
        actor_id: Uuid,
    ) -> Result<Order, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        if order.client_id != actor_id {
            return Err(ServiceError::UnauthorizedOrderAccess(actor_id, order_id));
        }

        if order.status != OrderStatus::Delivered {
            return Err(ServiceError::InvalidOrderStatus(order_id, order.status));
        }

        let updated_order = self
            .db_client
            .mark_completed_tx(&mut tx, order_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict(format!("Order {} changed state concurrently", order_id))
            })?;

        self.db_client
            .set_contract_status_tx(&mut tx, order_id, ContractStatus::Completed)
            .await?
            .ok_or(ServiceError::ContractNotFound(order_id))?;

        self.audit_service
            .log_delivery_accepted_tx(&mut tx, actor_id, &updated_order)
            .await?;

        tx.commit().await?;

        self.emit_status_change(&updated_order, OrderStatus::Delivered, OrderStatus::Completed)
            .await;

        Ok(updated_order)
    }

    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        actor_id: Uuid,
        dto: CancelOrderDto,
    ) -> Result<Order, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        if !order.is_participant(actor_id) {
            return Err(ServiceError::UnauthorizedOrderAccess(actor_id, order_id));
        }

        if order.status.is_terminal() || order.status == OrderStatus::Disputed {
            return Err(ServiceError::InvalidOrderStatus(order_id, order.status));
        }

        let previous_status = order.status;
        let reason = dto.reason.unwrap_or_else(|| "No reason provided".to_string());

        let updated_order = self
            .db_client
            .mark_cancelled_tx(&mut tx, order_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict(format!("Order {} changed state concurrently", order_id))
            })?;

        self.db_client
            .set_contract_status_tx(&mut tx, order_id, ContractStatus::Cancelled)
            .await?
            .ok_or(ServiceError::ContractNotFound(order_id))?;

        self.audit_service
            .log_order_cancelled_tx(&mut tx, actor_id, &updated_order, &reason)
            .await?;

        tx.commit().await?;

        self.emit_status_change(&updated_order, previous_status, OrderStatus::Cancelled)
            .await;

        Ok(updated_order)
    }

    pub async fn get_order(&self, order_id: Uuid, user_id: Uuid) -> Result<Order, ServiceError> {
        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        if !order.is_participant(user_id) {
            return Err(ServiceError::UnauthorizedOrderAccess(user_id, order_id));
        }

        Ok(order)
    }

    pub async fn get_order_timeline(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderEvent>, ServiceError> {
        // Participant check rides on get_order.
        self.get_order(order_id, user_id).await?;

        self.audit_service
            .get_events_for_order(order_id, limit, offset)
            .await
    }

    pub async fn get_deliverables(
        &self,
        order_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Deliverable>, ServiceError> {
        self.get_order(order_id, user_id).await?;

        Ok(self.db_client.get_deliverables_for_order(order_id).await?)
    }

    pub async fn get_orders_for_client(
        &self,
        client_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, ServiceError> {
        Ok(self
            .db_client
            .get_orders_for_client(client_id, limit, offset)
            .await?)
    }

    pub async fn get_orders_for_freelancer(
        &self,
        freelancer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Order>, ServiceError> {
        Ok(self
            .db_client
            .get_orders_for_freelancer(freelancer_id, limit, offset)
            .await?)
    }

    async fn emit_status_change(&self, order: &Order, from: OrderStatus, to: OrderStatus) {
        if let Err(e) = self
            .notification_service
            .notify_order_status_changed(order, from, to)
            .await
        {
            tracing::error!("Failed to send order.status_changed notification: {:?}", e);
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeliverySubmissionResult {
    pub order: Order,
    pub deliverable: Deliverable,
}
