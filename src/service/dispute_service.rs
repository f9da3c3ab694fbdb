use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{db::DBClient, disputedb::DisputeExt, orderdb::OrderExt},
    dtos::disputedtos::{AddCommentDto, OpenDisputeDto, ResolveDisputeDto},
    models::{
        disputemodel::{Dispute, DisputeComment, DisputeStatus},
        ordermodel::{ContractStatus, Order, OrderStatus},
        usermodel::UserRole,
    },
    service::{
        audit_service::AuditService,
        error::{is_unique_violation, ServiceError},
        notification_service::NotificationService,
    },
};

/// Escalation path. Opening a dispute freezes the order at disputed;
/// resolution is the only way back out and always forces a terminal order
/// status (or leaves the freeze in place with OrderAction::None).
#[derive(Debug, Clone)]
pub struct DisputeService {
    db_client: Arc<DBClient>,
    audit_service: Arc<AuditService>,
    notification_service: Arc<NotificationService>,
}

impl DisputeService {
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

    pub async fn open_dispute(
        &self,
        order_id: Uuid,
        actor_id: Uuid,
        dto: OpenDisputeDto,
    ) -> Result<DisputeCreationResult, ServiceError> {
        let mut tx = self.db_client.pool.begin().await?;

        let order = self
            .db_client
            .get_order_by_id(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        if !order.is_participant(actor_id) {
            return Err(ServiceError::UnauthorizedOrderAccess(actor_id, order_id));
        }

        if !order.status.is_in_flight() {
            // Distinguish "someone already disputed this" from "the order
            // is simply not disputable" for the caller.
            if self
                .db_client
                .get_active_dispute_for_order(order_id)
                .await?
                .is_some()
            {
                return Err(ServiceError::DisputeAlreadyOpen(order_id));
            }
            return Err(ServiceError::InvalidOrderStatus(order_id, order.status));
        }

        let previous_status = order.status;

        let disputed_order = self
            .db_client
            .mark_disputed_tx(&mut tx, order_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Conflict(format!("Order {} changed state concurrently", order_id))
            })?;

        let dispute = match self
            .db_client
            .create_dispute_tx(
                &mut tx,
                &disputed_order,
                actor_id,
                dto.reason,
                dto.description,
                dto.attachment_urls,
            )
            .await
        {
            Ok(dispute) => dispute,
            Err(e) if is_unique_violation(&e, Some("disputes_one_active_per_order")) => {
                return Err(ServiceError::DisputeAlreadyOpen(order_id));
            }
            Err(e) => return Err(e.into()),
        };

        self.audit_service
            .log_dispute_opened_tx(&mut tx, actor_id, &dispute)
            .await?;

        tx.commit().await?;

        if let Err(e) = self.notification_service.notify_dispute_opened(&dispute).await {
            tracing::error!("Failed to send dispute.opened notification: {:?}", e);
        }
        if let Err(e) = self
            .notification_service
            .notify_order_status_changed(&disputed_order, previous_status, OrderStatus::Disputed)
            .await
        {
            tracing::error!("Failed to send order.status_changed notification: {:?}", e);
        }

        Ok(DisputeCreationResult {
            dispute,
            order: disputed_order,
        })
    }

    /// Admin resolution. RESOLVED and CLOSED require a resolution note and
    /// force the order out of the freeze according to the order action;
    /// IN_REVIEW only advances the dispute itself.
    pub async fn resolve_dispute(
        &self,
        dispute_id: Uuid,
        admin_id: Uuid,
        dto: ResolveDisputeDto,
    ) -> Result<DisputeResolutionResult, ServiceError> {
        let admin_resolution = validate_resolution(dto.new_status, dto.admin_resolution)?;

        let mut tx = self.db_client.pool.begin().await?;

        let dispute = self
            .db_client
            .get_dispute_by_id(dispute_id)
            .await?
            .ok_or(ServiceError::DisputeNotFound(dispute_id))?;

        if !dispute.status.is_active() {
            return Err(ServiceError::InvalidDisputeStatus(dispute_id, dispute.status));
        }

        if dto.new_status == DisputeStatus::InReview {
            let updated = self
                .db_client
                .mark_dispute_in_review_tx(&mut tx, dispute_id)
                .await?
                .ok_or(ServiceError::InvalidDisputeStatus(dispute_id, dispute.status))?;

            tx.commit().await?;

            let order = self
                .db_client
                .get_order_by_id(updated.order_id)
                .await?
                .ok_or(ServiceError::OrderNotFound(updated.order_id))?;

            return Ok(DisputeResolutionResult {
                dispute: updated,
                order,
            });
        }

        let resolved = self
            .db_client
            .resolve_dispute_tx(&mut tx, dispute_id, admin_id, dto.new_status, admin_resolution)
            .await?
            .ok_or(ServiceError::InvalidDisputeStatus(dispute_id, dispute.status))?;

        let order = match dto.order_action.terminal_order_status() {
            Some(terminal) => {
                let order = self
                    .db_client
                    .force_disputed_terminal_tx(&mut tx, resolved.order_id, terminal)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::Conflict(format!(
                            "Order {} is no longer disputed",
                            resolved.order_id
                        ))
                    })?;

                if let Some(contract_status) = ContractStatus::mirror_of(terminal) {
                    self.db_client
                        .set_contract_status_tx(&mut tx, resolved.order_id, contract_status)
                        .await?
                        .ok_or(ServiceError::ContractNotFound(resolved.order_id))?;
                }

                order
            }
            // No order action: the dispute record is settled but the order
            // stays frozen at disputed for a follow-up decision.
            None => self
                .db_client
                .get_order_by_id(resolved.order_id)
                .await?
                .ok_or(ServiceError::OrderNotFound(resolved.order_id))?,
        };

        self.audit_service
            .log_dispute_resolved_tx(&mut tx, admin_id, &resolved, dto.new_status, dto.order_action)
            .await?;

        tx.commit().await?;

        if let Err(e) = self
            .notification_service
            .notify_dispute_resolved(&resolved, dto.order_action)
            .await
        {
            tracing::error!("Failed to send dispute.resolved notification: {:?}", e);
        }
        if dto.order_action.terminal_order_status().is_some() {
            if let Err(e) = self
                .notification_service
                .notify_order_status_changed(&order, OrderStatus::Disputed, order.status)
                .await
            {
                tracing::error!("Failed to send order.status_changed notification: {:?}", e);
            }
        }

        Ok(DisputeResolutionResult {
            dispute: resolved,
            order,
        })
    }

    pub async fn add_comment(
        &self,
        dispute_id: Uuid,
        user_id: Uuid,
        role: UserRole,
        dto: AddCommentDto,
    ) -> Result<DisputeComment, ServiceError> {
        let dispute = self
            .db_client
            .get_dispute_by_id(dispute_id)
            .await?
            .ok_or(ServiceError::DisputeNotFound(dispute_id))?;

        if !dispute.is_participant(user_id) && role != UserRole::Admin {
            return Err(ServiceError::UnauthorizedDisputeAccess(user_id, dispute_id));
        }

        Ok(self
            .db_client
            .insert_dispute_comment(dispute_id, user_id, dto.body)
            .await?)
    }

    pub async fn get_dispute(
        &self,
        dispute_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<DisputeDetails, ServiceError> {
        let dispute = self
            .db_client
            .get_dispute_by_id(dispute_id)
            .await?
            .ok_or(ServiceError::DisputeNotFound(dispute_id))?;

        if !dispute.is_participant(user_id) && role != UserRole::Admin {
            return Err(ServiceError::UnauthorizedDisputeAccess(user_id, dispute_id));
        }

        let comments = self.db_client.get_dispute_comments(dispute_id).await?;

        Ok(DisputeDetails { dispute, comments })
    }

    pub async fn get_open_disputes(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Dispute>, ServiceError> {
        Ok(self
            .db_client
            .get_disputes_by_status(DisputeStatus::Open, limit, offset)
            .await?)
    }
}

/// RESOLVED and CLOSED must carry a non-empty resolution note; IN_REVIEW
/// needs none. OPEN is not a valid target at all.
fn validate_resolution(
    new_status: DisputeStatus,
    admin_resolution: Option<String>,
) -> Result<Option<String>, ServiceError> {
    if new_status == DisputeStatus::Open {
        return Err(ServiceError::Validation(
            "A dispute cannot be moved back to open".to_string(),
        ));
    }

    let admin_resolution = admin_resolution.filter(|r| !r.trim().is_empty());

    let resolution_required = matches!(new_status, DisputeStatus::Resolved | DisputeStatus::Closed);
    if resolution_required && admin_resolution.is_none() {
        return Err(ServiceError::ResolutionRequired);
    }

    Ok(admin_resolution)
}

#[derive(Debug, Serialize)]
pub struct DisputeCreationResult {
    pub dispute: Dispute,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct DisputeResolutionResult {
    pub dispute: Dispute,
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct DisputeDetails {
    pub dispute: Dispute,
    pub comments: Vec<DisputeComment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolving_requires_a_resolution_note() {
        assert!(matches!(
            validate_resolution(DisputeStatus::Resolved, None),
            Err(ServiceError::ResolutionRequired)
        ));
        assert!(matches!(
            validate_resolution(DisputeStatus::Closed, Some("   ".to_string())),
            Err(ServiceError::ResolutionRequired)
        ));
    }

    #[test]
    fn test_resolution_note_is_passed_through() {
        let note = validate_resolution(
            DisputeStatus::Resolved,
            Some("Refunded after review".to_string()),
        )
        .unwrap();
        assert_eq!(note, Some("Refunded after review".to_string()));
    }

    #[test]
    fn test_in_review_needs_no_note() {
        assert_eq!(validate_resolution(DisputeStatus::InReview, None).unwrap(), None);
    }

    #[test]
    fn test_reopening_is_rejected() {
        assert!(matches!(
            validate_resolution(DisputeStatus::Open, Some("note".to_string())),
            Err(ServiceError::Validation(_))
        ));
    }
}
